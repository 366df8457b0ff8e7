/*
    Copyright (C) 2024-2026  CHIPSGEN developers

    This file is part of CHIPSGEN, a fixture compiler for emulator test suites.

    For the full copyright notice, see the lib.rs file.
*/
//! Argument schemas of generator jobs.
//!
//! Job arguments come from the project manifest as untyped JSON. They are checked
//! against the job's schema before being deserialized into the job's own argument type.
use core::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// The type of a job argument value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArgKind {
    String,
    Bool,
}

impl ArgKind {
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ArgKind::String => value.is_string(),
            ArgKind::Bool => value.is_boolean()
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArgKind::String => "string",
            ArgKind::Bool => "bool"
        })
    }
}

/// A declaration of a single job argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub optional: bool,
    pub desc: &'static str,
}

impl ArgSpec {
    pub const fn required(name: &'static str, kind: ArgKind, desc: &'static str) -> Self {
        ArgSpec { name, kind, optional: false, desc }
    }

    pub const fn optional(name: &'static str, kind: ArgKind, desc: &'static str) -> Self {
        ArgSpec { name, kind, optional: true, desc }
    }
}

/// The reason of the [ArgsError].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgsErrorKind {
    /// The arguments are not a JSON object.
    NotAnObject,
    /// A required argument is absent.
    Missing,
    /// The argument value has a type other than declared.
    WrongType(ArgKind),
    /// The argument is not declared by the job.
    Unknown,
    /// The arguments passed validation but can't be deserialized.
    Malformed(String),
}

/// The error returned when job arguments don't conform to the job's schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgsError {
    pub job: String,
    /// The name of the offending argument, empty for [ArgsErrorKind::NotAnObject].
    pub field: String,
    pub kind: ArgsErrorKind,
}

impl ArgsError {
    pub fn new<J: Into<String>, F: Into<String>>(job: J, field: F, kind: ArgsErrorKind) -> Self {
        ArgsError { job: job.into(), field: field.into(), kind }
    }
}

impl std::error::Error for ArgsError {}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ArgsError { job, field, kind } = self;
        match kind {
            ArgsErrorKind::NotAnObject => write!(f, "job '{}': arguments must be an object", job),
            ArgsErrorKind::Missing => write!(f, "job '{}': missing required arg '{}'", job, field),
            ArgsErrorKind::WrongType(kind) => {
                write!(f, "job '{}': arg '{}' must be of type {}", job, field, kind)
            }
            ArgsErrorKind::Unknown => write!(f, "job '{}': unknown arg '{}'", job, field),
            ArgsErrorKind::Malformed(reason) => {
                write!(f, "job '{}': malformed args: {}", job, reason)
            }
        }
    }
}

/// Checks `args` of the `job` against its `schema`.
///
/// Declared arguments are checked in the schema order, then undeclared ones are reported.
pub fn validate(job: &str, args: &Value, schema: &[ArgSpec]) -> Result<(), ArgsError> {
    let map = args.as_object().ok_or_else(|| {
        ArgsError::new(job, "", ArgsErrorKind::NotAnObject)
    })?;
    for spec in schema.iter() {
        match map.get(spec.name) {
            None if spec.optional => {}
            None => return Err(ArgsError::new(job, spec.name, ArgsErrorKind::Missing)),
            Some(value) if spec.kind.matches(value) => {}
            Some(_) => return Err(ArgsError::new(job, spec.name, ArgsErrorKind::WrongType(spec.kind)))
        }
    }
    match map.keys().find(|key| !schema.iter().any(|spec| spec.name == key.as_str())) {
        Some(key) => Err(ArgsError::new(job, key.as_str(), ArgsErrorKind::Unknown)),
        None => Ok(())
    }
}

/// Validates `args` and deserializes them into the job's argument type.
pub fn parse<T: DeserializeOwned>(job: &str, args: &Value, schema: &[ArgSpec]) -> Result<T, ArgsError> {
    validate(job, args, schema)?;
    serde_json::from_value(args.clone()).map_err(|err| {
        ArgsError::new(job, "", ArgsErrorKind::Malformed(err.to_string()))
    })
}

/// Displays the help text of a job.
#[derive(Clone, Copy, Debug)]
pub struct JobHelp<'a> {
    pub name: &'a str,
    pub about: &'a str,
    pub schema: &'a [ArgSpec],
}

impl fmt::Display for JobHelp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", self.name, self.about)?;
        for spec in self.schema.iter() {
            writeln!(f, "  {}: {}{} - {}", spec.name, spec.kind,
                        if spec.optional { " (optional)" } else { "" },
                        spec.desc)?;
        }
        Ok(())
    }
}
