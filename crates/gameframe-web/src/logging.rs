#![forbid(unsafe_code)]

//! `tracing` output for the browser console.
//!
//! Each formatted event is buffered and emitted as one console call when the
//! writer is dropped, routed by level: ERROR to `console.error`, WARN to
//! `console.warn`, everything else to `console.log`. Off wasm32 the lines go
//! to stderr.

use std::io;
use std::str::FromStr;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Console method a log line is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleMethod {
    Error,
    Warn,
    Log,
}

impl ConsoleMethod {
    #[must_use]
    pub fn for_level(level: Level) -> Self {
        if level == Level::ERROR {
            Self::Error
        } else if level == Level::WARN {
            Self::Warn
        } else {
            Self::Log
        }
    }
}

/// Parse a level filter name; unknown names fall back to INFO.
#[must_use]
pub fn parse_level(name: &str) -> Level {
    Level::from_str(name.trim()).unwrap_or(Level::INFO)
}

/// [`MakeWriter`] producing one [`ConsoleWriter`] per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Buffers one formatted event.
#[derive(Debug)]
pub struct ConsoleWriter {
    method: ConsoleMethod,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self {
            method: ConsoleMethod::for_level(level),
            buf: Vec::new(),
        }
    }

    #[must_use]
    pub fn method(&self) -> ConsoleMethod {
        self.method
    }

    /// Buffered text without the trailing newline.
    #[must_use]
    pub fn line(&self) -> String {
        String::from_utf8_lossy(&self.buf).trim_end().to_string()
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if !self.buf.is_empty() {
            emit(self.method, &self.line());
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(method: ConsoleMethod, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match method {
        ConsoleMethod::Error => web_sys::console::error_1(&value),
        ConsoleMethod::Warn => web_sys::console::warn_1(&value),
        ConsoleMethod::Log => web_sys::console::log_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_method: ConsoleMethod, line: &str) {
    eprintln!("{line}");
}

/// Install the console subscriber as the global default.
///
/// Returns `false` if a global subscriber was already set; the existing one is
/// kept.
pub fn install_console_logging(level: &str) -> bool {
    tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_max_level(parse_level(level))
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write as _;

    #[test]
    fn levels_route_to_console_methods() {
        assert_eq!(ConsoleMethod::for_level(Level::ERROR), ConsoleMethod::Error);
        assert_eq!(ConsoleMethod::for_level(Level::WARN), ConsoleMethod::Warn);
        assert_eq!(ConsoleMethod::for_level(Level::INFO), ConsoleMethod::Log);
        assert_eq!(ConsoleMethod::for_level(Level::TRACE), ConsoleMethod::Log);
    }

    #[test]
    fn level_names_parse_with_fallback() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level(" WARN "), Level::WARN);
        assert_eq!(parse_level("chatty"), Level::INFO);
    }

    #[test]
    fn writer_buffers_a_single_line() {
        let mut writer = ConsoleWriter::new(Level::WARN);
        write!(writer, "failed to focus ").unwrap();
        writeln!(writer, "nested document").unwrap();
        assert_eq!(writer.method(), ConsoleMethod::Warn);
        assert_eq!(writer.line(), "failed to focus nested document");
    }

    #[test]
    fn second_install_keeps_first_subscriber() {
        let first = install_console_logging("info");
        assert!(!install_console_logging("debug") || !first);
    }
}
