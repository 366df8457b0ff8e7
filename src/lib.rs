/*
    Copyright (C) 2024-2026  CHIPSGEN developers

    This file is part of CHIPSGEN, a fixture compiler for emulator test suites.

    CHIPSGEN is free software: you can redistribute it and/or modify it under
    the terms of the GNU Lesser General Public License (LGPL) as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    CHIPSGEN is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Lesser General Public License for more details.

    You should have received a copy of the GNU Lesser General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.

    Author contact information: see Cargo.toml file, section [package.authors].
*/
//! CHIPSGEN compiles CPU test-suite fixtures into C headers and runs emulator test programs.
//!
//! * [job] has the generator jobs: `fuse` for the **Fuse** Z80 tests and `nestestlog` for
//!   the **nestest** 6502 log.
//! * [project] loads the `chipsgen.json` manifest and runs the jobs of its targets.
//! * [command] runs the C64 and VIC-20 test programs with the project's emulators.
//!
//! The fixture parsers and renderers live in [formats], the staleness gate in [stale].
pub mod args;
pub mod command;
pub mod job;
pub mod project;

pub use chipsgen_core::{cursor, stale, Error, Result};
pub use chipsgen_formats as formats;

pub use job::{Job, JobPlan};
pub use project::{Project, ProjectError};
