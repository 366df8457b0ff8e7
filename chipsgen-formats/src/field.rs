/*
    Copyright (C) 2024-2026  CHIPSGEN developers

    This file is part of CHIPSGEN, a fixture compiler for emulator test suites.

    For the full copyright notice, see the lib.rs file of chipsgen-core.
*/
use core::fmt;
use core::ops::Deref;

/// A verbatim token of fixture text.
///
/// Generated tables reproduce the token exactly as written in the fixture, so a field
/// keeps the original text. The numeric accessors decode it on demand and return `None`
/// when the text is not a valid number, they never fail otherwise.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(transparent))]
pub struct Field<'a>(pub &'a str);

impl<'a> Field<'a> {
    #[inline]
    pub fn as_str(&self) -> &'a str {
        self.0
    }
    /// Decodes the field as a hexadecimal 8-bit value.
    pub fn hex_u8(&self) -> Option<u8> {
        u8::from_str_radix(self.0, 16).ok()
    }
    /// Decodes the field as a hexadecimal 16-bit value.
    pub fn hex_u16(&self) -> Option<u16> {
        u16::from_str_radix(self.0, 16).ok()
    }
    /// Decodes the field as a decimal unsigned value.
    pub fn dec_u32(&self) -> Option<u32> {
        self.0.parse().ok()
    }
}

impl Deref for Field<'_> {
    type Target = str;
    fn deref(&self) -> &str {
        self.0
    }
}

impl<'a> From<&'a str> for Field<'a> {
    fn from(s: &'a str) -> Self {
        Field(s)
    }
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({:?})", self.0)
    }
}
