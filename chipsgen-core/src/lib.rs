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
//! The core components of CHIPSGEN.
//!
//! * [cursor] splits fixture text into lines and whitespace separated tokens.
//! * [stale] decides whether generated files are out of date and replaces them whole.
pub mod cursor;
pub mod error;
pub mod stale;

pub use error::{Error, Result};
