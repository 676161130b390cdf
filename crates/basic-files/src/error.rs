//! Typed faults surfaced at the `basic-files` boundary, mapped by the
//! evaluator onto the matching `RuntimeErrorKind` (spec.md §7: codes 53,
//! 55, 62, 76). Host I/O errors that don't carry BASIC-specific meaning
//! stay wrapped as `anyhow::Error` at call sites instead.

use std::fmt;

#[derive(Debug)]
pub enum FilesError {
    /// `OPEN` target does not exist in a mode that requires it (code 53).
    FileNotFound(String),
    /// `OPEN` on a file number that is already bound (code 55).
    FileAlreadyOpen(u32),
    /// Operation on a file number with no open handle.
    NotOpen(u32),
    /// `INPUT #`/`LINE INPUT #`/`GET` read past end of file (code 62).
    InputPastEnd(u32),
    /// Directory component of a path does not exist (code 76).
    PathNotFound(String),
    /// Any other host I/O failure.
    Io(std::io::Error),
}

impl fmt::Display for FilesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilesError::FileNotFound(p) => write!(f, "file not found: {p}"),
            FilesError::FileAlreadyOpen(n) => write!(f, "file already open: #{n}"),
            FilesError::NotOpen(n) => write!(f, "file not open: #{n}"),
            FilesError::InputPastEnd(n) => write!(f, "input past end: #{n}"),
            FilesError::PathNotFound(p) => write!(f, "path not found: {p}"),
            FilesError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for FilesError {}

impl From<std::io::Error> for FilesError {
    fn from(e: std::io::Error) -> Self {
        FilesError::Io(e)
    }
}
