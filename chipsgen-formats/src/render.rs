/*
    Copyright (C) 2024-2026  CHIPSGEN developers

    This file is part of CHIPSGEN, a fixture compiler for emulator test suites.

    For the full copyright notice, see the lib.rs file of chipsgen-core.
*/
//! Renderers of parsed fixture tables.
//!
//! [CHeader] produces the C aggregate literals compiled into the emulator test programs.
//! With the `json` feature enabled [Json] dumps the same records for inspection.
use core::fmt;
use std::io;

use crate::fuse::{FuseTable, FuseTest};
use crate::nestest::NesTestRecord;

/// The first line of every generated header.
pub const GENERATED_NOTICE: &str = "// machine generated, do not edit!\n";

/// A format of the rendered fixture tables.
pub trait TableFormat {
    /// Writes all `tables` of parsed **Fuse** test cases.
    fn write_fuse(&self, out: &mut dyn io::Write, tables: &[FuseTable<'_>]) -> io::Result<()>;
    /// Writes all `records` of a parsed **nestest** log.
    fn write_nestest(&self, out: &mut dyn io::Write, records: &[NesTestRecord<'_>]) -> io::Result<()>;
}

/// Renders tables as C header source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CHeader;

/// Renders tables as pretty printed JSON.
#[cfg(feature = "json")]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Json;

/// Displays **Fuse** tables as a C header.
#[derive(Clone, Copy, Debug)]
pub struct FuseHeader<'r, 'a>(pub &'r [FuseTable<'a>]);

/// Displays **nestest** records as a C header.
#[derive(Clone, Copy, Debug)]
pub struct NestestHeader<'r, 'a>(pub &'r [NesTestRecord<'a>]);

impl TableFormat for CHeader {
    fn write_fuse(&self, out: &mut dyn io::Write, tables: &[FuseTable<'_>]) -> io::Result<()> {
        write!(out, "{}", FuseHeader(tables))
    }

    fn write_nestest(&self, out: &mut dyn io::Write, records: &[NesTestRecord<'_>]) -> io::Result<()> {
        write!(out, "{}", NestestHeader(records))
    }
}

#[cfg(feature = "json")]
impl TableFormat for Json {
    fn write_fuse(&self, out: &mut dyn io::Write, tables: &[FuseTable<'_>]) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, tables)?;
        out.write_all(b"\n")
    }

    fn write_nestest(&self, out: &mut dyn io::Write, records: &[NesTestRecord<'_>]) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, records)?;
        out.write_all(b"\n")
    }
}

fn fmt_fuse_test(f: &mut fmt::Formatter<'_>, test: &FuseTest<'_>) -> fmt::Result {
    f.write_str("  {\n")?;
    writeln!(f, "    .desc = \"{}\",", test.desc)?;
    if test.has_event_section() {
        f.write_str("    .events = {\n")?;
        for ev in test.events.iter() {
            writeln!(f, "      {{ .tick={}, .type=EVENT_{}, .addr=0x{}, .data=0x{} }},",
                     ev.tick, ev.kind, ev.addr, ev.data)?;
        }
        f.write_str("    },\n")?;
        writeln!(f, "    .num_events = {},", test.num_events())?;
    }
    f.write_str("    .state = {\n")?;
    if let Some(r) = test.registers.as_ref() {
        writeln!(f, "      .af=0x{}, .bc=0x{}, .de=0x{}, .hl=0x{},", r.af, r.bc, r.de, r.hl)?;
        writeln!(f, "      .af_=0x{}, .bc_=0x{}, .de_=0x{}, .hl_=0x{},", r.af_, r.bc_, r.de_, r.hl_)?;
        writeln!(f, "      .ix=0x{}, .iy=0x{}, .sp=0x{}, .pc=0x{},", r.ix, r.iy, r.sp, r.pc)?;
    }
    if let Some(x) = test.extra.as_ref() {
        writeln!(f, "      .i=0x{}, .r=0x{}, .iff1={}, .iff2={}, .im={}, .halted={}, .ticks={}",
                 x.i, x.r, x.iff1, x.iff2, x.im, x.halted, x.ticks)?;
    }
    f.write_str("    },\n")?;
    if test.has_chunk_section() {
        f.write_str("    .chunks = {\n")?;
        for chunk in test.chunks.iter() {
            write!(f, "      {{ .addr=0x{}, .bytes = {{ ", chunk.addr)?;
            for byte in chunk.bytes.iter() {
                write!(f, "0x{},", byte)?;
            }
            writeln!(f, "}}, .num_bytes={}, }},", chunk.num_bytes())?;
        }
        f.write_str("    },\n")?;
    }
    writeln!(f, "    .num_chunks = {},", test.num_chunks())?;
    f.write_str("  },\n")
}

impl fmt::Display for FuseHeader<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(GENERATED_NOTICE)?;
        for table in self.0.iter() {
            writeln!(f, "fuse_test_t {}[] = {{", table.name)?;
            for test in table.tests.iter() {
                fmt_fuse_test(f, test)?;
            }
            f.write_str("};\n")?;
            writeln!(f, "const int {}_num = {};", table.name, table.tests.len())?;
        }
        Ok(())
    }
}

impl fmt::Display for NestestHeader<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(GENERATED_NOTICE)?;
        f.write_str("\
#include <stdint.h>
typedef struct {
    const char* desc;
    uint16_t PC;
    uint8_t A,X,Y,P,S;
} cpu_state;
cpu_state state_table[] = {
")?;
        for rec in self.0.iter() {
            writeln!(f, "  {{ \"{}\", 0x{}, 0x{}, 0x{}, 0x{}, 0x{}, 0x{} }},",
                     rec.desc, rec.pc, rec.a, rec.x, rec.y, rec.p, rec.s)?;
        }
        f.write_str("};\n")
    }
}
