/*
    Copyright (C) 2024-2026  CHIPSGEN developers

    This file is part of CHIPSGEN, a fixture compiler for emulator test suites.

    For the full copyright notice, see the lib.rs file.
*/
//! Sequential line consumption and whitespace tokenizing of fixture text.
use core::str::SplitWhitespace;
use std::fs;
use std::path::Path;

use arrayvec::ArrayVec;
#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};

use crate::error::{IoResultExt, Result};

/// Reads the whole fixture file at `path` as text.
///
/// Invalid UTF-8 sequences are replaced with `U+FFFD` instead of failing the read.
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_path(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            warn!("{}: invalid UTF-8 replaced", path.display());
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    })
}

/// Splits `line` on runs of whitespace, ignoring leading and trailing whitespace.
///
/// Empty fragments are never yielded.
#[inline]
pub fn tokenize(line: &str) -> SplitWhitespace<'_> {
    line.split_whitespace()
}

/// Returns the tokens of `line` only if there are exactly `N` of them.
///
/// ```
/// use chipsgen_core::cursor::tokens_exact;
/// assert_eq!(Some(["00", "ff", "1"]), tokens_exact::<3>(" 00  ff 1 "));
/// assert_eq!(None, tokens_exact::<3>("00 ff"));
/// assert_eq!(None, tokens_exact::<3>("00 ff 1 2"));
/// ```
pub fn tokens_exact<const N: usize>(line: &str) -> Option<[&str; N]> {
    let mut tokens = ArrayVec::<&str, N>::new();
    for token in tokenize(line) {
        tokens.try_push(token).ok()?;
    }
    tokens.into_inner().ok()
}

/// Returns an iterator over the lines of `text`.
///
/// Lines are separated by `\n`, an optional `\r` preceding it is stripped. Unlike
/// [str::lines] a trailing line terminator yields a final empty line.
pub fn lines(text: &str) -> impl Iterator<Item=&str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// A forward-only cursor over the lines of fixture text.
///
/// Once a line has been consumed it can't be read again from the cursor.
#[derive(Clone, Debug)]
pub struct LineCursor<'a> {
    lines: Vec<&'a str>,
    index: usize
}

impl<'a> LineCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        LineCursor { lines: lines(text).collect(), index: 0 }
    }
    /// Returns the next line, or an empty string once all lines have been consumed.
    ///
    /// An exhausted cursor can't be told apart from an empty line by the returned value,
    /// check [LineCursor::is_exhausted] for that.
    pub fn next_line(&mut self) -> &'a str {
        match self.lines.get(self.index) {
            Some(line) => {
                self.index += 1;
                line
            }
            None => ""
        }
    }
    /// Returns `true` if there are no more lines to consume.
    pub fn is_exhausted(&self) -> bool {
        self.index >= self.lines.len()
    }
    /// The 0-based index of the line that will be returned next.
    pub fn index(&self) -> usize {
        self.index
    }
    /// The total number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }
    /// Returns `true` if the cursor holds no lines at all.
    ///
    /// Text always splits into at least one (possibly empty) line, so this is never
    /// `true` for a cursor created with [LineCursor::new].
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
