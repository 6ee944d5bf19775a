// Entry points for each destination: caller buffer, caller stream, stdout, file path
// `try_*` forms return errors; the others report them on stderr and carry on

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use lll_template::{render_to_string, ParamTable, SystemContext};

use crate::LogError;

/// A template argument: a string, or `None` to print only the message
pub trait AsTemplate<'a> {
    fn as_template(self) -> Option<&'a str>;
}

impl<'a> AsTemplate<'a> for &'a str {
    fn as_template(self) -> Option<&'a str> {
        Some(self)
    }
}

impl<'a> AsTemplate<'a> for &'a String {
    fn as_template(self) -> Option<&'a str> {
        Some(self.as_str())
    }
}

impl<'a> AsTemplate<'a> for Option<&'a str> {
    fn as_template(self) -> Option<&'a str> {
        self
    }
}

/// Render a line, newline included, and hand it back
pub fn render<'t>(
    template: impl AsTemplate<'t>,
    params: &ParamTable<'_>,
    message: fmt::Arguments<'_>,
) -> String {
    render_to_string(template.as_template(), params, message, &SystemContext)
}

/// Render a line and write it to `stream` in a single write
pub fn try_fprint<'t, W: Write + ?Sized>(
    stream: &mut W,
    template: impl AsTemplate<'t>,
    params: &ParamTable<'_>,
    message: fmt::Arguments<'_>,
) -> Result<(), LogError> {
    let line = render(template, params, message);
    stream.write_all(line.as_bytes())?;
    Ok(())
}

pub fn fprint<'t, W: Write + ?Sized>(
    stream: &mut W,
    template: impl AsTemplate<'t>,
    params: &ParamTable<'_>,
    message: fmt::Arguments<'_>,
) {
    if let Err(e) = try_fprint(stream, template, params, message) {
        report(&e);
    }
}

/// `fprint` to standard output
pub fn print<'t>(template: impl AsTemplate<'t>, params: &ParamTable<'_>, message: fmt::Arguments<'_>) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    fprint(&mut handle, template, params, message);
}

/// Append a line to the file at `path`, opening and closing it within the call
pub fn try_pprint<'t, P: AsRef<Path>>(
    path: P,
    template: impl AsTemplate<'t>,
    params: &ParamTable<'_>,
    message: fmt::Arguments<'_>,
) -> Result<(), LogError> {
    let mut file = open_append(path.as_ref())?;
    try_fprint(&mut file, template, params, message)
}

pub fn pprint<'t, P: AsRef<Path>>(
    path: P,
    template: impl AsTemplate<'t>,
    params: &ParamTable<'_>,
    message: fmt::Arguments<'_>,
) {
    if let Err(e) = try_pprint(path, template, params, message) {
        report(&e);
    }
}

pub(crate) fn open_append(path: &Path) -> Result<File, LogError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError::Open {
            path: path.to_path_buf(),
            source,
        })
}

pub(crate) fn report(error: &LogError) {
    log::warn!("Log line lost: {}", error);
    eprintln!("{}", error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use lll_template::Value;

    #[test]
    fn test_render_with_and_without_template() {
        let params = ParamTable::from_pairs([("%d", Value::from(7))]);
        assert_eq!(render("#$0", &params, format_args!("x")), "#7 x\n");
        assert_eq!(render(None, &params, format_args!("x")), "x\n");

        let owned = String::from("[$0]");
        assert_eq!(render(&owned, &params, format_args!("y")), "[7] y\n");
    }

    #[test]
    fn test_fprint_writes_one_line() {
        let mut out = Vec::new();
        fprint(&mut out, "%m!", &ParamTable::new(), format_args!("done"));
        assert_eq!(out, b"done!\n");
    }
}
