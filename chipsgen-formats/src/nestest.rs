/*
    Copyright (C) 2024-2026  CHIPSGEN developers

    This file is part of CHIPSGEN, a fixture compiler for emulator test suites.

    For the full copyright notice, see the lib.rs file of chipsgen-core.
*/
//! **nestest** 6502 CPU trace log parser. See: [nestest.log](http://www.qmtpro.com/~nes/misc/nestest.log).
//!
//! Every line of the log has the same fixed column layout:
//!
//! ```text
//! C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD PPU:  0, 21 CYC:7
//! ^PC             ^description (32 columns)       ^A   ^X   ^Y   ^P   ^SP
//! ```
//!
//! Fields are taken from their columns without looking for delimiters. Columns count
//! characters, not bytes, so a non-ASCII character in the description doesn't shift
//! the register columns.
use core::ops::Range;

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};

use nom::bytes::complete::{tag, take_while_m_n};
use nom::sequence::{preceded, tuple};
use nom::IResult;

use chipsgen_core::cursor::lines;
use chipsgen_core::{Error, Result};

use crate::field::Field;

/// Columns of the program counter.
pub const PC_COLUMNS:   Range<usize> = 0..4;
/// Columns of the instruction bytes and disassembly.
pub const DESC_COLUMNS: Range<usize> = 16..48;
/// Columns of the accumulator.
pub const A_COLUMNS:    Range<usize> = 50..52;
/// Columns of the X index register.
pub const X_COLUMNS:    Range<usize> = 55..57;
/// Columns of the Y index register.
pub const Y_COLUMNS:    Range<usize> = 60..62;
/// Columns of the processor status register.
pub const P_COLUMNS:    Range<usize> = 65..67;
/// Columns of the stack pointer.
pub const S_COLUMNS:    Range<usize> = 71..73;
/// Where the register labels start: `A:00 X:00 Y:00 P:24 SP:FD`.
pub const REGS_START:   usize = 48;
/// The minimal length of a line conforming to the layout, in characters.
pub const MIN_LINE_LEN: usize = S_COLUMNS.end;

/// How strictly lines are checked against the column layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Layout {
    /// Columns are sliced as they are, short lines give truncated or empty fields.
    #[default]
    Lenient,
    /// Each line must be long enough and carry the register labels in their columns.
    Strict,
}

/// The CPU state of a single log line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct NesTestRecord<'a> {
    pub desc: Field<'a>,
    pub pc: Field<'a>,
    pub a: Field<'a>,
    pub x: Field<'a>,
    pub y: Field<'a>,
    pub p: Field<'a>,
    pub s: Field<'a>,
}

/// The byte offset of the character at `column`, or the line length past its end.
fn char_offset(line: &str, column: usize) -> usize {
    line.char_indices().nth(column).map_or(line.len(), |(offset, _)| offset)
}

/// Returns the part of `line` within the character `columns`, clipped to the line length.
fn column(line: &str, columns: Range<usize>) -> Field<'_> {
    let start = char_offset(line, columns.start);
    let end = char_offset(line, columns.end).max(start);
    Field(&line[start..end])
}

fn hex_digits<'a>(count: usize) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    take_while_m_n(count, count, |c: char| c.is_ascii_hexdigit())
}

fn registers_layout(input: &str) -> IResult<&str, ()> {
    let (input, _) = tuple((
        preceded(tag("A:"), hex_digits(2)),
        preceded(tag(" X:"), hex_digits(2)),
        preceded(tag(" Y:"), hex_digits(2)),
        preceded(tag(" P:"), hex_digits(2)),
        preceded(tag(" SP:"), hex_digits(2)),
    ))(input)?;
    Ok((input, ()))
}

fn check_layout(line: &str) -> core::result::Result<(), &'static str> {
    if line.chars().count() < MIN_LINE_LEN {
        return Err("line is shorter than the register columns")
    }
    if hex_digits(PC_COLUMNS.len())(line).is_err() {
        return Err("no program counter in columns 0..4")
    }
    if registers_layout(&line[char_offset(line, REGS_START)..]).is_ok() {
        Ok(())
    }
    else {
        Err("registers are not in the A:/X:/Y:/P:/SP: columns")
    }
}

impl<'a> NesTestRecord<'a> {
    /// Slices the fields of a log line.
    pub fn from_line(line: &'a str) -> Self {
        NesTestRecord {
            desc: column(line, DESC_COLUMNS),
            pc:   column(line, PC_COLUMNS),
            a:    column(line, A_COLUMNS),
            x:    column(line, X_COLUMNS),
            y:    column(line, Y_COLUMNS),
            p:    column(line, P_COLUMNS),
            s:    column(line, S_COLUMNS),
        }
    }
    /// Slices the fields of a log line after checking it against the column layout.
    ///
    /// `line_no` is the 1-based line number reported in a [Error::Layout].
    pub fn from_line_strict(line: &'a str, line_no: usize) -> Result<Self> {
        check_layout(line).map_err(|reason| Error::Layout { line: line_no, reason })?;
        Ok(Self::from_line(line))
    }
}

/// Parses all non-blank lines of a nestest log.
///
/// With [Layout::Lenient] this never fails.
pub fn parse_nestest(text: &str, layout: Layout) -> Result<Vec<NesTestRecord<'_>>> {
    let mut records = Vec::new();
    for (index, line) in lines(text).enumerate() {
        if line.trim().is_empty() {
            continue
        }
        let record = match layout {
            Layout::Lenient => NesTestRecord::from_line(line),
            Layout::Strict => NesTestRecord::from_line_strict(line, index + 1)?
        };
        records.push(record);
    }
    debug!("nestest: {} records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD PPU:  0, 21 CYC:7
C5F5  A2 00     LDX #$00                        A:00 X:00 Y:00 P:24 SP:FD PPU:  0, 30 CYC:10

C5F7  86 00     STX $00 = 00                    A:00 X:00 Y:00 P:26 SP:FD PPU:  0, 36 CYC:12
";

    #[test]
    fn column_slicing_works() {
        let rec = NesTestRecord::from_line(LOG.lines().next().unwrap());
        assert_eq!("C000", rec.pc.as_str());
        assert_eq!(Some(0xC000), rec.pc.hex_u16());
        assert_eq!("JMP $C5F5                       ", rec.desc.as_str());
        assert_eq!(32, rec.desc.len());
        assert_eq!("00", rec.a.as_str());
        assert_eq!("00", rec.x.as_str());
        assert_eq!("00", rec.y.as_str());
        assert_eq!(Some(0x24), rec.p.hex_u8());
        assert_eq!(Some(0xFD), rec.s.hex_u8());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let records = parse_nestest(LOG, Layout::Lenient).unwrap();
        assert_eq!(3, records.len());
        assert_eq!("C5F7", records[2].pc.as_str());
        assert_eq!("26", records[2].p.as_str());
        let records = parse_nestest("  \r\n\t\n", Layout::Lenient).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn short_lines_are_truncated() {
        let rec = NesTestRecord::from_line("C000  4C F5 C5  JMP $C5F5   A:0");
        assert_eq!("C000", rec.pc.as_str());
        assert_eq!("JMP $C5F5   A:0", rec.desc.as_str());
        assert_eq!("", rec.a.as_str());
        assert_eq!("", rec.s.as_str());
        let rec = NesTestRecord::from_line("C0");
        assert_eq!("C0", rec.pc.as_str());
        assert_eq!("", rec.desc.as_str());
    }

    #[test]
    fn strict_layout_accepts_conforming_lines() {
        let lenient = parse_nestest(LOG, Layout::Lenient).unwrap();
        let strict = parse_nestest(LOG, Layout::Strict).unwrap();
        assert_eq!(lenient, strict);
    }

    #[test]
    fn strict_layout_rejects_short_lines() {
        let text = format!("{}C000  4C F5 C5  JMP\n", LOG);
        match parse_nestest(&text, Layout::Strict) {
            Err(Error::Layout { line: 5, reason }) => {
                assert_eq!("line is shorter than the register columns", reason);
            }
            res => panic!("unexpected result: {:?}", res)
        }
        assert_eq!(4, parse_nestest(&text, Layout::Lenient).unwrap().len());
    }

    #[test]
    fn strict_layout_rejects_shifted_columns() {
        let line = " C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD";
        assert!(matches!(NesTestRecord::from_line_strict(line, 1),
                         Err(Error::Layout { line: 1, .. })));
        let line = "C000  4C F5 C5  JMP $C5F5                        A:00 X:00 Y:00 P:24 SP:FD";
        assert!(matches!(NesTestRecord::from_line_strict(line, 2),
                         Err(Error::Layout { line: 2, .. })));
        let line = "C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD";
        assert!(NesTestRecord::from_line_strict(line, 3).is_ok());
    }

    #[test]
    fn columns_count_characters() {
        let line = "C000  4C F5 C5  JMP $C5F5 ; d\u{e9}j\u{e0} vu             A:00 X:01 Y:02 P:24 SP:FD CYC:0";
        let rec = NesTestRecord::from_line(line);
        assert_eq!("JMP $C5F5 ; d\u{e9}j\u{e0} vu             ", rec.desc.as_str());
        assert_eq!(32, rec.desc.as_str().chars().count());
        assert_eq!("00", rec.a.as_str());
        assert_eq!("01", rec.x.as_str());
        assert_eq!("02", rec.y.as_str());
        assert_eq!("24", rec.p.as_str());
        assert_eq!("FD", rec.s.as_str());
        assert_eq!(rec, NesTestRecord::from_line_strict(line, 1).unwrap());
    }

    #[test]
    fn short_non_ascii_lines_are_truncated() {
        let rec = NesTestRecord::from_line("C\u{e9}00  4C F5 C5  \u{fffd}");
        assert_eq!("C\u{e9}00", rec.pc.as_str());
        assert_eq!("\u{fffd}", rec.desc.as_str());
        assert_eq!("", rec.a.as_str());
        let rec = NesTestRecord::from_line("\u{e9}\u{e9}");
        assert_eq!("\u{e9}\u{e9}", rec.pc.as_str());
        assert_eq!("", rec.desc.as_str());
    }
}
