/*
    Copyright (C) 2024-2026  CHIPSGEN developers

    This file is part of CHIPSGEN, a fixture compiler for emulator test suites.

    For the full copyright notice, see the lib.rs file of chipsgen-core.
*/
//! CPU test-suite fixture parsers and table renderers.
//!
//! The parsers turn fixture text into records that borrow from it. The records are then
//! rendered by one of the [render::TableFormat] implementations.
pub mod field;
pub mod fuse;
pub mod nestest;
pub mod render;

pub use field::Field;
pub use fuse::{FuseTable, FuseTest};
pub use nestest::{Layout, NesTestRecord};
pub use render::{CHeader, TableFormat};
#[cfg(feature = "json")]
pub use render::Json;
