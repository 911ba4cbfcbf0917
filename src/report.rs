use std::io::{self, Stderr, Stdout, Write};

pub mod codes {
    pub const HEADER: &str = "\x1b[95m";
    pub const STEP: &str = "\x1b[94m";
    pub const HEADING: &str = "\x1b[96m";
    pub const SUCCESS: &str = "\x1b[92m";
    pub const WARNING: &str = "\x1b[93m";
    pub const FAIL: &str = "\x1b[91m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";
}

/// Whether status lines should carry ANSI colors.
///
/// `--no-color` or a non-empty `NO_COLOR` disable them, as does a Windows
/// console that is not an xterm.
pub fn should_colorize(no_color: bool) -> bool {
    if no_color {
        return false;
    }
    if std::env::var("NO_COLOR").is_ok_and(|value| !value.is_empty()) {
        return false;
    }
    if cfg!(windows) && std::env::var("TERM").ok().as_deref() != Some("xterm") {
        return false;
    }
    return true;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        return Self { enabled };
    }

    pub fn paint(&self, codes: &[&str], text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        return format!("{}{}{}", codes.concat(), text, codes::RESET);
    }
}

pub struct Reporter<O: Write, E: Write> {
    palette: Palette,
    out: O,
    err: E,
}

impl Reporter<Stdout, Stderr> {
    pub fn stdio(palette: Palette) -> Self {
        return Self::new(palette, io::stdout(), io::stderr());
    }
}

// Status output is best effort: a closed pipe must not abort a deployment.
impl<O: Write, E: Write> Reporter<O, E> {
    pub fn new(palette: Palette, out: O, err: E) -> Self {
        return Self { palette, out, err };
    }

    pub fn banner(&mut self, title: &str) {
        let rule = "=".repeat(60);
        let text = format!("{rule}\n  {title}\n{rule}");
        let painted = self.palette.paint(&[codes::HEADER, codes::BOLD], &text);
        let _ = writeln!(self.out, "{}", painted);
    }

    pub fn step(&mut self, message: &str) {
        let painted = self.palette.paint(&[codes::STEP], &format!("> {message}"));
        let _ = writeln!(self.out, "\n{}", painted);
    }

    pub fn success(&mut self, message: &str) {
        let painted = self.palette.paint(&[codes::SUCCESS], &format!("+ {message}"));
        let _ = writeln!(self.out, "{}", painted);
    }

    /// A bold success line set apart from the step output above it.
    pub fn done(&mut self, message: &str) {
        let painted = self
            .palette
            .paint(&[codes::SUCCESS, codes::BOLD], &format!("+ {message}"));
        let _ = writeln!(self.out, "\n{}", painted);
    }

    pub fn warning(&mut self, message: &str) {
        let painted = self.palette.paint(&[codes::WARNING], &format!("! {message}"));
        let _ = writeln!(self.out, "{}", painted);
    }

    pub fn error(&mut self, message: &str) {
        let painted = self.palette.paint(&[codes::FAIL], &format!("x {message}"));
        let _ = writeln!(self.err, "{}", painted);
    }

    pub fn heading(&mut self, message: &str) {
        let painted = self.palette.paint(&[codes::HEADING], message);
        let _ = writeln!(self.out, "\n{}", painted);
    }

    pub fn line(&mut self, message: &str) {
        let _ = writeln!(self.out, "{}", message);
    }

    pub fn error_line(&mut self, message: &str) {
        let _ = writeln!(self.err, "{}", message);
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (O, E) {
        return (self.out, self.err);
    }
}

#[cfg(test)]
pub fn captured() -> Reporter<Vec<u8>, Vec<u8>> {
    return Reporter::new(Palette::new(false), Vec::new(), Vec::new());
}

#[cfg(test)]
pub fn contents(reporter: Reporter<Vec<u8>, Vec<u8>>) -> (String, String) {
    let (out, err) = reporter.into_parts();
    return (
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    );
}
