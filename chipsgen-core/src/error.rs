/*
    Copyright (C) 2024-2026  CHIPSGEN developers

    This file is part of CHIPSGEN, a fixture compiler for emulator test suites.

    For the full copyright notice, see the lib.rs file.
*/
use core::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// A result type of the generator operations.
pub type Result<T> = core::result::Result<T, Error>;

/// The error type of reading fixtures and emitting generated files.
///
/// Malformed fixture content is never reported through this type, only the failures
/// that must stop a build.
#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// A file could not be read, written or inspected.
    Io {
        path: PathBuf,
        err: io::Error
    },
    /// A fixture line does not follow the fixed layout required in strict mode.
    Layout {
        /// 1-based line number.
        line: usize,
        reason: &'static str
    },
    /// A job function was given a different number of paths than it was planned with.
    Paths {
        inputs: usize,
        outputs: usize
    }
}

impl Error {
    /// Wraps an [io::Error] together with the path of the file it concerns.
    pub fn io<P: AsRef<Path>>(path: P, err: io::Error) -> Self {
        Error::Io { path: path.as_ref().to_path_buf(), err }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { err, .. } => Some(err),
            _ => None
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, err } => write!(f, "{}: {}", path.display(), err),
            Error::Layout { line, reason } => write!(f, "line {}: {}", line, reason),
            Error::Paths { inputs, outputs } => {
                write!(f, "unexpected number of paths: {} input(s), {} output(s)", inputs, outputs)
            }
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io { err, .. } => err,
            e => io::Error::new(io::ErrorKind::InvalidData, e)
        }
    }
}

/// Extends [io::Result] with a conversion into [Result] that remembers the file path.
pub trait IoResultExt<T> {
    fn with_path<P: AsRef<Path>>(self, path: P) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path<P: AsRef<Path>>(self, path: P) -> Result<T> {
        self.map_err(|err| Error::io(path, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_works() {
        let err = Error::io("out/fuse.h", io::Error::new(io::ErrorKind::NotFound, "not found"));
        assert_eq!("out/fuse.h: not found", format!("{}", err));
        let err = Error::Layout { line: 7, reason: "line too short" };
        assert_eq!("line 7: line too short", err.to_string());
        let ioerr: io::Error = err.into();
        assert_eq!(io::ErrorKind::InvalidData, ioerr.kind());
    }
}
