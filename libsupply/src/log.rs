//! Staging output in the style of the Heroku and Cloud Foundry buildpacks.
//!
//! Cloud Foundry streams staging output to `cf push` line by line, prefixing each one. Styling is
//! therefore applied per line so that colours never leak into those prefixes.

use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// # Panics
///
/// Will panic if there was a problem setting the color settings, or all bytes could
/// not be written due to either I/O errors or EOF being reached.
pub fn log_error(header: impl AsRef<str>, body: impl AsRef<str>) {
    let mut stream = StandardStream::stderr(ColorChoice::Always);
    write_styled_message(
        &mut stream,
        format!("\n[Error: {}]", header.as_ref()),
        ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true),
    )
    .expect("Could not write error header to stderr");

    write_styled_message(&mut stream, body, ColorSpec::new().set_fg(Some(Color::Red)))
        .expect("Could not write error body to stderr");
    stream.flush().expect("Could not flush stderr");
}

/// # Panics
///
/// Will panic if there was a problem setting the color settings, or all bytes could
/// not be written due to either I/O errors or EOF being reached.
pub fn log_warning(header: impl AsRef<str>, body: impl AsRef<str>) {
    let mut stream = StandardStream::stderr(ColorChoice::Always);
    write_styled_message(
        &mut stream,
        format!("\n[Warning: {}]", header.as_ref()),
        ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true),
    )
    .expect("Could not write warning header to stderr");

    write_styled_message(
        &mut stream,
        body,
        ColorSpec::new().set_fg(Some(Color::Yellow)),
    )
    .expect("Could not write warning body to stderr");
    stream.flush().expect("Could not flush stderr");
}

/// # Panics
///
/// Will panic if there was a problem setting the color settings, or all bytes could
/// not be written due to either I/O errors or EOF being reached.
pub fn log_header(title: impl AsRef<str>) {
    let mut stream = StandardStream::stdout(ColorChoice::Always);
    write_styled_message(
        &mut stream,
        format!("-----> {}", title.as_ref()),
        ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true),
    )
    .expect("Could not write header to stdout");
    stream.flush().expect("Could not flush stdout");
}

/// # Panics
///
/// Will panic if all bytes could not be written due to I/O errors or EOF being reached.
pub fn log_info(message: impl AsRef<str>) {
    let mut stdout = io::stdout().lock();
    for line in message.as_ref().split('\n') {
        writeln!(stdout, "       {line}").expect("Could not write to stdout");
    }
    stdout.flush().expect("Could not flush stdout");
}

fn write_styled_message(
    stream: &mut StandardStream,
    message: impl AsRef<str>,
    spec: &ColorSpec,
) -> io::Result<()> {
    // Using `.split('\n')` rather than `.lines()` since the latter eats trailing newlines in
    // the passed message, which would prevent the caller from being able to add spacing at
    // the end of their message.
    for line in message.as_ref().split('\n') {
        stream.set_color(spec)?;
        write!(stream, "{line}")?;
        stream.reset()?;
        writeln!(stream)?;
    }
    Ok(())
}
