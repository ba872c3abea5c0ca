//! Output destinations driven by the dispatcher

pub mod console;
pub mod rotating_file;

pub use console::ConsoleAppender;
pub use rotating_file::RotatingFile;
