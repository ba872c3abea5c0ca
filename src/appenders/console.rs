//! Console echo for accepted entries

use crate::core::{LogLevel, Result};
use std::io::{self, Write};

/// ANSI sequence that ends a colored line
pub const RESET_CODE: &str = "\x1b[0m";

/// Writes rendered lines to standard output, wrapped in the level's color
///
/// # Example
///
/// ```
/// use rotating_logger::appenders::ConsoleAppender;
/// use rotating_logger::LogLevel;
///
/// let mut console = ConsoleAppender::with_writer(Vec::new(), true);
/// console.write_line(LogLevel::Info, "[INFO] ready").unwrap();
/// ```
pub struct ConsoleAppender {
    use_colors: bool,
    writer: Box<dyn Write + Send>,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self::with_colors(true)
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            writer: Box::new(io::stdout()),
        }
    }

    /// Echo to an arbitrary writer instead of standard output
    pub fn with_writer<W: Write + Send + 'static>(writer: W, use_colors: bool) -> Self {
        Self {
            use_colors,
            writer: Box::new(writer),
        }
    }

    /// Escape sequence that starts a line at `level`
    pub fn color_prefix(level: LogLevel) -> String {
        format!("\x1b[{}m", level.color_code().to_fg_str())
    }

    pub fn write_line(&mut self, level: LogLevel, rendered: &str) -> Result<()> {
        if self.use_colors {
            writeln!(
                self.writer,
                "{}{}{}",
                Self::color_prefix(level),
                rendered,
                RESET_CODE
            )?;
        } else {
            writeln!(self.writer, "{}", rendered)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}
