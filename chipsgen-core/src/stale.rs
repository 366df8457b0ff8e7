/*
    Copyright (C) 2024-2026  CHIPSGEN developers

    This file is part of CHIPSGEN, a fixture compiler for emulator test suites.

    For the full copyright notice, see the lib.rs file.
*/
//! The staleness gate and the emission driver of generated files.
//!
//! Generated files are rebuilt only when one of their inputs has been modified after
//! the generated file was written, or when the generated file is missing or empty.
//! New content always replaces the old one in a single rename, so a reader never
//! observes a partially written file.
use core::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};

use crate::error::{Error, IoResultExt, Result};

/// The outcome of [regenerate].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emission {
    /// The output was newer than all of its inputs and has been left untouched.
    UpToDate,
    /// The output has been written with the given number of bytes.
    Written { bytes: usize }
}

impl Emission {
    pub fn is_written(self) -> bool {
        matches!(self, Emission::Written {..})
    }
}

impl fmt::Display for Emission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emission::UpToDate => f.write_str("up to date"),
            Emission::Written { bytes } => write!(f, "written {} bytes", bytes)
        }
    }
}

fn modified<P: AsRef<Path>>(path: P) -> Result<SystemTime> {
    let path = path.as_ref();
    fs::metadata(path).and_then(|meta| meta.modified()).with_path(path)
}

/// Returns `true` if any of the `outputs` needs to be regenerated from `inputs`.
///
/// This is the case when any output is missing or has zero length, when there are
/// no outputs at all, or when the most recently modified input is newer than the
/// least recently modified output.
///
/// Returns an error if any input can't be inspected.
pub fn is_dirty<I, O>(inputs: I, outputs: O) -> Result<bool>
    where I: IntoIterator, I::Item: AsRef<Path>,
          O: IntoIterator, O::Item: AsRef<Path>
{
    let mut newest_input: Option<SystemTime> = None;
    for input in inputs {
        newest_input = newest_input.max(Some(modified(input)?));
    }

    let mut oldest_output: Option<SystemTime> = None;
    for output in outputs {
        let path = output.as_ref();
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                trace!("{}: missing", path.display());
                return Ok(true)
            }
            Err(e) => return Err(Error::io(path, e))
        };
        if meta.len() == 0 {
            trace!("{}: empty", path.display());
            return Ok(true)
        }
        let mtime = meta.modified().with_path(path)?;
        oldest_output = Some(oldest_output.map_or(mtime, |t| t.min(mtime)));
    }

    Ok(match (newest_input, oldest_output) {
        (_, None) => true,
        (None, Some(_)) => false,
        (Some(input), Some(output)) => input > output
    })
}

/// Creates the parent directory of `path` together with all of its missing ancestors.
pub fn ensure_parent_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    match path.as_ref().parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).with_path(dir)
        }
        _ => Ok(())
    }
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| Error::io(path,
        io::Error::new(io::ErrorKind::InvalidInput, "not a file path")
    ))?;
    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(name);
    temp_name.push(".tmp");
    Ok(path.with_file_name(temp_name))
}

/// Replaces the whole content of the file at `path` with `contents`.
///
/// The data is first written to a temporary file in the same directory which is then
/// renamed over `path`. On failure the previous file, if any, is left intact.
pub fn write_whole<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
    let path = path.as_ref();
    let temp = temp_path(path)?;
    let written = File::create(&temp).and_then(|mut file| {
        file.write_all(contents.as_ref())?;
        file.sync_all()
    });
    if let Err(err) = written {
        let _ = fs::remove_file(&temp);
        return Err(Error::io(&temp, err))
    }
    fs::rename(&temp, path).map_err(|err| {
        let _ = fs::remove_file(&temp);
        Error::io(path, err)
    })
}

/// Regenerates `output` from `inputs` if it is stale.
///
/// When [is_dirty] reports the `output` as up to date, nothing else happens and
/// `render` is not called. Otherwise the output directory is created, `render`
/// produces the new content and [write_whole] stores it.
pub fn regenerate<I, F, T>(inputs: I, output: &Path, render: F) -> Result<Emission>
    where I: IntoIterator, I::Item: AsRef<Path>,
          F: FnOnce() -> Result<T>,
          T: AsRef<[u8]>
{
    if !is_dirty(inputs, Some(output))? {
        debug!("{}: up to date", output.display());
        return Ok(Emission::UpToDate)
    }
    ensure_parent_dir(output)?;
    let contents = render()?;
    let bytes = contents.as_ref().len();
    write_whole(output, contents)?;
    Ok(Emission::Written { bytes })
}
