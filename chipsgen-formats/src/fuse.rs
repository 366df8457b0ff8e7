/*
    Copyright (C) 2024-2026  CHIPSGEN developers

    This file is part of CHIPSGEN, a fixture compiler for emulator test suites.

    For the full copyright notice, see the lib.rs file of chipsgen-core.
*/
//! **Fuse** Z80 test files parser. See: [Fuse](https://sourceforge.net/projects/fuse-emulator/).
//!
//! Both `tests.in` and `tests.expected` are read with the same grammar. A test block is:
//!
//! ```text
//! <description>
//!     <tick> <type> <address> <data>             optional bus events, space indented
//! <af> <bc> <de> <hl> <af'> <bc'> <de'> <hl'> <ix> <iy> <sp> <pc>
//! <i> <r> <iff1> <iff2> <im> <halted> <ticks>
//! <address> <byte> <byte> ... -1                  optional memory chunks
//! -1
//! ```
//!
//! Blocks are separated by empty lines. Malformed lines are never an error: event lines
//! without exactly 4 tokens are skipped, register lines without exactly 12 (or 7) tokens
//! leave the corresponding state unpopulated.
use core::str::FromStr;

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};

use bitflags::bitflags;
use chipsgen_core::cursor::{LineCursor, tokenize, tokens_exact};

use crate::field::Field;

/// The in-band token terminating memory chunk lists.
pub const SENTINEL: &str = "-1";
/// The number of tokens of a bus event line.
pub const EVENT_TOKENS: usize = 4;
/// The number of tokens of a 16-bit register line.
pub const REGISTER_TOKENS: usize = 12;
/// The number of tokens of an additional registers and flags line.
pub const EXTRA_TOKENS: usize = 7;

bitflags! {
    /// Sections found in the source block of a [FuseTest].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "json", derive(serde::Serialize))]
    #[cfg_attr(feature = "json", serde(transparent))]
    pub struct Sections: u8 {
        /// Space indented event lines followed the description, even if none was valid.
        const EVENTS    = 0b0001;
        /// The register line had exactly 12 tokens.
        const REGISTERS = 0b0010;
        /// The additional registers line had exactly 7 tokens.
        const EXTRA     = 0b0100;
        /// The line after the additional registers had more than 1 token.
        const CHUNKS    = 0b1000;
    }
}

/// The type of a bus event, e.g.: `MR` in `"10 MR 0002 9c"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    /// MR
    MemRead,
    /// MW
    MemWrite,
    /// MC
    MemContend,
    /// PR
    PortRead,
    /// PW
    PortWrite,
    /// PC
    PortContend,
}

impl FromStr for EventType {
    type Err = &'static str;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        use EventType::*;
        Ok(match name {
            "MR" => MemRead,
            "MW" => MemWrite,
            "MC" => MemContend,
            "PR" => PortRead,
            "PW" => PortWrite,
            "PC" => PortContend,
            _ => return Err("unknown event type")
        })
    }
}

/// A single bus event: `<tick> <type> <address> <data>`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct BusEvent<'a> {
    pub tick: Field<'a>,
    #[cfg_attr(feature = "json", serde(rename = "type"))]
    pub kind: Field<'a>,
    pub addr: Field<'a>,
    pub data: Field<'a>,
}

impl<'a> BusEvent<'a> {
    /// Returns the decoded event type if it is one of the known kinds.
    pub fn event_type(&self) -> Option<EventType> {
        self.kind.parse().ok()
    }
}

impl<'a> From<[&'a str; EVENT_TOKENS]> for BusEvent<'a> {
    fn from([tick, kind, addr, data]: [&'a str; EVENT_TOKENS]) -> Self {
        BusEvent { tick: Field(tick), kind: Field(kind), addr: Field(addr), data: Field(data) }
    }
}

/// The 16-bit registers of a test case state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Registers<'a> {
    pub af: Field<'a>,
    pub bc: Field<'a>,
    pub de: Field<'a>,
    pub hl: Field<'a>,
    pub af_: Field<'a>,
    pub bc_: Field<'a>,
    pub de_: Field<'a>,
    pub hl_: Field<'a>,
    pub ix: Field<'a>,
    pub iy: Field<'a>,
    pub sp: Field<'a>,
    pub pc: Field<'a>,
}

impl<'a> From<[&'a str; REGISTER_TOKENS]> for Registers<'a> {
    fn from(t: [&'a str; REGISTER_TOKENS]) -> Self {
        let [af, bc, de, hl, af_, bc_, de_, hl_, ix, iy, sp, pc] = t.map(Field);
        Registers { af, bc, de, hl, af_, bc_, de_, hl_, ix, iy, sp, pc }
    }
}

/// The 8-bit registers, interrupt flags and the T-state count of a test case state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ExtraState<'a> {
    pub i: Field<'a>,
    pub r: Field<'a>,
    pub iff1: Field<'a>,
    pub iff2: Field<'a>,
    pub im: Field<'a>,
    pub halted: Field<'a>,
    pub ticks: Field<'a>,
}

impl<'a> From<[&'a str; EXTRA_TOKENS]> for ExtraState<'a> {
    fn from(t: [&'a str; EXTRA_TOKENS]) -> Self {
        let [i, r, iff1, iff2, im, halted, ticks] = t.map(Field);
        ExtraState { i, r, iff1, iff2, im, halted, ticks }
    }
}

/// A contiguous block of memory starting at `addr`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct MemoryChunk<'a> {
    pub addr: Field<'a>,
    pub bytes: Vec<Field<'a>>,
}

impl MemoryChunk<'_> {
    pub fn num_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// A single parsed test case block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct FuseTest<'a> {
    /// The whole first line of the block.
    pub desc: &'a str,
    pub events: Vec<BusEvent<'a>>,
    pub registers: Option<Registers<'a>>,
    pub extra: Option<ExtraState<'a>>,
    pub chunks: Vec<MemoryChunk<'a>>,
    pub sections: Sections,
}

impl FuseTest<'_> {
    pub fn num_events(&self) -> usize {
        self.events.len()
    }

    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn has_event_section(&self) -> bool {
        self.sections.contains(Sections::EVENTS)
    }

    pub fn has_chunk_section(&self) -> bool {
        self.sections.contains(Sections::CHUNKS)
    }
}

/// A named list of test cases parsed from a single fixture file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct FuseTable<'a> {
    /// The C identifier of the generated array.
    pub name: &'a str,
    pub tests: Vec<FuseTest<'a>>,
}

impl<'a> FuseTable<'a> {
    /// Parses all test cases of `text` into a table named `name`.
    pub fn parse(name: &'a str, text: &'a str) -> Self {
        let tests: Vec<_> = FuseParser::new(text).collect();
        debug!("{}: {} tests", name, tests.len());
        FuseTable { name, tests }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParseState {
    AwaitDescription,
    AwaitEventsOrState,
    AwaitExtra,
    AwaitChunksOrNext,
}

/// An iterator of [FuseTest] blocks read from fixture text.
#[derive(Clone, Debug)]
pub struct FuseParser<'a> {
    cursor: LineCursor<'a>
}

impl<'a> FuseParser<'a> {
    pub fn new(text: &'a str) -> Self {
        FuseParser { cursor: LineCursor::new(text) }
    }

    fn read_chunks(&mut self, mut line: &'a str, chunks: &mut Vec<MemoryChunk<'a>>) {
        loop {
            let mut tokens = tokenize(line);
            match tokens.next() {
                None | Some(SENTINEL) => break,
                Some(addr) => {
                    let bytes = tokens.take_while(|&t| t != SENTINEL)
                                      .map(Field)
                                      .collect();
                    chunks.push(MemoryChunk { addr: Field(addr), bytes });
                }
            }
            line = self.cursor.next_line();
        }
    }
}

impl<'a> Iterator for FuseParser<'a> {
    type Item = FuseTest<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        use ParseState::*;
        let mut test = FuseTest::default();
        let mut state = AwaitDescription;
        let mut line = "";
        loop {
            state = match state {
                AwaitDescription => {
                    if self.cursor.is_exhausted() {
                        return None
                    }
                    let desc = self.cursor.next_line();
                    if desc.is_empty() {
                        continue
                    }
                    test.desc = desc;
                    line = self.cursor.next_line();
                    AwaitEventsOrState
                }
                AwaitEventsOrState => {
                    if line.starts_with(' ') {
                        test.sections |= Sections::EVENTS;
                        while line.starts_with(' ') {
                            match tokens_exact::<EVENT_TOKENS>(line) {
                                Some(tokens) => test.events.push(tokens.into()),
                                None => trace!("{}: skipping event line {}: {:?}",
                                               test.desc, self.cursor.index(), line)
                            }
                            line = self.cursor.next_line();
                        }
                    }
                    match tokens_exact::<REGISTER_TOKENS>(line) {
                        Some(tokens) => {
                            test.registers = Some(tokens.into());
                            test.sections |= Sections::REGISTERS;
                        }
                        None => trace!("{}: no registers at line {}", test.desc, self.cursor.index())
                    }
                    AwaitExtra
                }
                AwaitExtra => {
                    match tokens_exact::<EXTRA_TOKENS>(self.cursor.next_line()) {
                        Some(tokens) => {
                            test.extra = Some(tokens.into());
                            test.sections |= Sections::EXTRA;
                        }
                        None => trace!("{}: no extra state at line {}", test.desc, self.cursor.index())
                    }
                    AwaitChunksOrNext
                }
                AwaitChunksOrNext => {
                    line = self.cursor.next_line();
                    if tokenize(line).nth(1).is_some() {
                        test.sections |= Sections::CHUNKS;
                        let mut chunks = Vec::new();
                        self.read_chunks(line, &mut chunks);
                        test.chunks = chunks;
                    }
                    return Some(test)
                }
            }
        }
    }
}

/// Parses all test case blocks of `text`.
pub fn parse_fuse(text: &str) -> Vec<FuseTest<'_>> {
    FuseParser::new(text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZEROS: &str = "0000 0000 0000 0000 0000 0000 0000 0000 0000 0000 0000 0000";

    #[test]
    fn parse_minimal_record() {
        let text = format!("ld a,b\n{}\n00 00 0 0 0 0 0\n-1\n", ZEROS);
        let tests = parse_fuse(&text);
        assert_eq!(1, tests.len());
        let test = &tests[0];
        assert_eq!("ld a,b", test.desc);
        assert_eq!(0, test.num_events());
        assert_eq!(0, test.num_chunks());
        assert_eq!(Sections::REGISTERS|Sections::EXTRA, test.sections);
        let regs = test.registers.unwrap();
        assert_eq!(Some(0), regs.af.hex_u16());
        assert_eq!(Some(0), regs.pc.hex_u16());
        let extra = test.extra.unwrap();
        assert_eq!("00", extra.i.as_str());
        assert_eq!(Some(0), extra.ticks.dec_u32());
    }

    #[test]
    fn parse_input_blocks() {
        let text = "\
00
0000 0000 0000 0000 0000 0000 0000 0000 0000 0000 0000 0000
00 00 0 0 0 0 1
0000 00 -1
-1

01
0000 0000 0000 0000 0000 0000 0000 0000 0000 0000 0000 0000
00 00 0 0 0 0 10
0000 01 12 34 -1
-1
";
        let tests = parse_fuse(text);
        assert_eq!(2, tests.len());
        assert_eq!("00", tests[0].desc);
        assert_eq!(1, tests[0].num_chunks());
        assert_eq!(vec![Field("00")], tests[0].chunks[0].bytes);
        assert_eq!("01", tests[1].desc);
        assert!(tests[1].has_chunk_section());
        let chunk = &tests[1].chunks[0];
        assert_eq!(Some(0), chunk.addr.hex_u16());
        assert_eq!(3, chunk.num_bytes());
        assert_eq!(Some(0x34), chunk.bytes[2].hex_u8());
    }

    #[test]
    fn parse_expected_blocks() {
        let text = "\
00
    0 MC 0000
    0 MR 0000 00
    1 XX
0001 0000 0000 0000 0000 0000 0000 0000 0000 0000 0000 0001
00 01 0 0 0 0 4

01
    0 MC 0000
    4 MR 0000 01
4000 0001 0000 0000 0000 0000 0000 0000 0000 0000 0000 0003
00 02 0 0 0 0 10
0001 34 12
0003 aa -1
";
        let tests = parse_fuse(text);
        assert_eq!(2, tests.len());
        let first = &tests[0];
        assert!(first.has_event_section());
        assert_eq!(1, first.num_events());
        assert_eq!(Some(EventType::MemRead), first.events[0].event_type());
        assert_eq!(Some(0), first.events[0].data.hex_u8());
        assert!(!first.has_chunk_section());
        assert_eq!(Some(1), first.registers.unwrap().pc.hex_u16());

        let second = &tests[1];
        assert_eq!(1, second.num_events());
        assert_eq!(Some(4), second.events[0].tick.dec_u32());
        assert_eq!(2, second.num_chunks());
        assert_eq!(vec![Field("34"), Field("12")], second.chunks[0].bytes);
        assert_eq!(vec![Field("aa")], second.chunks[1].bytes);
    }

    #[test]
    fn event_lines_with_wrong_token_count_are_not_counted() {
        let text = format!("ed 4f\n 1 MC\n 4 MR 0000 ed extra\n 7 MW 0001 00\n{}\n00 00 0 0 0 0 8\n", ZEROS);
        let tests = parse_fuse(&text);
        assert_eq!(1, tests.len());
        assert!(tests[0].has_event_section());
        assert_eq!(1, tests[0].num_events());
        assert_eq!("MW", tests[0].events[0].kind.as_str());
    }

    #[test]
    fn event_section_may_be_empty() {
        let text = format!("ed 4f\n bogus\n{}\n00 00 0 0 0 0 8\n", ZEROS);
        let tests = parse_fuse(&text);
        assert!(tests[0].has_event_section());
        assert_eq!(0, tests[0].num_events());
    }

    #[test]
    fn malformed_register_lines_leave_state_unpopulated() {
        let text = "\
short
0000 0000 0000
00 00 0 0 0
-1

long
0000 0000 0000 0000 0000 0000 0000 0000 0000 0000 0000 0000 0000
00 00 0 0 0 0 4 9
-1
";
        let tests = parse_fuse(text);
        assert_eq!(2, tests.len());
        for test in tests.iter() {
            assert_eq!(None, test.registers);
            assert_eq!(None, test.extra);
            assert_eq!(Sections::empty(), test.sections);
        }
        assert_eq!("long", tests[1].desc);
    }

    #[test]
    fn sentinel_terminates_bytes_and_chunks() {
        let text = format!("chunks\n{}\n00 00 0 0 0 0 0\n8000 10 20 30 -1 40\n-1\n9000 50 -1\n", ZEROS);
        let tests = parse_fuse(&text);
        assert_eq!(2, tests.len());
        let test = &tests[0];
        assert_eq!(1, test.num_chunks());
        assert_eq!(3, test.chunks[0].num_bytes());
        assert!(test.chunks[0].bytes.iter().all(|b| b.as_str() != SENTINEL));
        // what follows the terminator is another block
        assert_eq!("9000 50 -1", tests[1].desc);
    }

    #[test]
    fn missing_byte_sentinel_ends_at_line_end() {
        let text = format!("chunks\n{}\n00 00 0 0 0 0 0\n8000 10 20\n", ZEROS);
        let tests = parse_fuse(&text);
        assert_eq!(1, tests.len());
        assert_eq!(vec![Field("10"), Field("20")], tests[0].chunks[0].bytes);
    }

    #[test]
    fn truncated_input_never_panics() {
        for text in &["desc", "desc\n", "desc\n    1 MC 0000", "desc\n\n\n", "\n\n", ""] {
            let tests = parse_fuse(text);
            assert!(tests.len() <= 1);
            for test in tests {
                assert_eq!("desc", test.desc);
                assert_eq!(None, test.registers);
            }
        }
    }

    #[test]
    fn table_parse_works() {
        let text = format!("a\n{0}\n00 00 0 0 0 0 0\n-1\n\nb\n{0}\n00 00 0 0 0 0 0\n-1\n", ZEROS);
        let table = FuseTable::parse("fuse_input", &text);
        assert_eq!("fuse_input", table.name);
        assert_eq!(vec!["a", "b"], table.tests.iter().map(|t| t.desc).collect::<Vec<_>>());
    }

    #[test]
    fn event_type_works() {
        assert_eq!(Ok(EventType::PortContend), "PC".parse());
        assert_eq!(Ok(EventType::MemContend), "MC".parse());
        assert!("XX".parse::<EventType>().is_err());
    }
}
