/*
    Copyright (C) 2024-2026  CHIPSGEN developers

    This file is part of CHIPSGEN, a fixture compiler for emulator test suites.

    For the full copyright notice, see the lib.rs file.
*/
//! The contract between generator jobs and the project orchestrator.
//!
//! A [Job] validates its arguments and builds a [JobPlan] for a target. The plan
//! declares the absolute input and output paths and carries the function producing the
//! outputs. The function decides itself, with [regenerate][chipsgen_core::stale::regenerate],
//! whether anything needs to be written.
use core::convert::TryFrom;
use core::fmt;
use std::path::PathBuf;

use serde_json::Value;

use chipsgen_core::stale::Emission;
use chipsgen_core::{Error, Result};

use crate::args::{self, ArgSpec, ArgsError, JobHelp};
use crate::project::{Config, Project, Target};

pub mod fuse;
pub mod nestestlog;

pub use self::fuse::FuseJob;
pub use self::nestestlog::NestestLogJob;

/// The function of a planned job: `func(inputs, outputs)`.
pub type JobFunc = Box<dyn Fn(&[PathBuf], &[PathBuf]) -> Result<Emission>>;

/// A job bound to the paths of a single target.
pub struct JobPlan {
    pub name: &'static str,
    pub inputs: Vec<PathBuf>,
    pub outputs: Vec<PathBuf>,
    /// Job arguments with defaults resolved.
    pub args: Value,
    /// Whether generated files should be appended to the target's sources.
    pub add_outputs_to_target_sources: bool,
    pub func: JobFunc,
}

impl JobPlan {
    /// Calls the job function with the planned paths.
    pub fn run(&self) -> Result<Emission> {
        (self.func)(&self.inputs, &self.outputs)
    }
}

impl fmt::Debug for JobPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobPlan")
         .field("name", &self.name)
         .field("inputs", &self.inputs)
         .field("outputs", &self.outputs)
         .field("args", &self.args)
         .field("add_outputs_to_target_sources", &self.add_outputs_to_target_sources)
         .finish()
    }
}

/// A code generator job.
pub trait Job {
    /// The name by which the job is referenced from the project manifest.
    fn name(&self) -> &'static str;
    /// A single line description.
    fn about(&self) -> &'static str;
    /// The declarations of the accepted arguments.
    fn schema(&self) -> &'static [ArgSpec];
    /// Builds a plan for the `target`.
    ///
    /// Relative paths are resolved against the `dir` argument if given, or the target directory.
    fn build(&self, project: &Project, config: &Config, target: &Target, args: &Value) -> core::result::Result<JobPlan, ArgsError>;

    fn help(&self) -> JobHelp<'static> {
        JobHelp { name: self.name(), about: self.about(), schema: self.schema() }
    }

    fn validate(&self, args: &Value) -> core::result::Result<(), ArgsError> {
        args::validate(self.name(), args, self.schema())
    }
}

/// Returns all available jobs.
pub fn jobs() -> [&'static dyn Job; 2] {
    [&FuseJob, &NestestLogJob]
}

/// Returns the job with the given `name`.
pub fn find(name: &str) -> Option<&'static dyn Job> {
    jobs().iter().copied().find(|job| job.name() == name)
}

/// Returns the directory against which the job's relative paths are resolved.
pub fn base_dir(project: &Project, target: &Target, dir: Option<&str>) -> PathBuf {
    match dir {
        Some(dir) => project.dir().join(dir),
        None => project.target_dir(target)
    }
}

/// Borrows exactly `I` inputs and `O` outputs of a job function.
pub fn expect_paths<'a, const I: usize, const O: usize>(
        inputs: &'a [PathBuf],
        outputs: &'a [PathBuf]
    ) -> Result<(&'a [PathBuf; I], &'a [PathBuf; O])>
{
    match (<&[PathBuf; I]>::try_from(inputs), <&[PathBuf; O]>::try_from(outputs)) {
        (Ok(inputs), Ok(outputs)) => Ok((inputs, outputs)),
        _ => Err(Error::Paths { inputs: inputs.len(), outputs: outputs.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn find_works() {
        assert_eq!(Some("fuse"), find("fuse").map(|job| job.name()));
        assert_eq!(Some("nestestlog"), find("nestestlog").map(|job| job.name()));
        assert!(find("embedfiles").is_none());
        let names: Vec<_> = jobs().iter().map(|job| job.name()).collect();
        assert_eq!(vec!["fuse", "nestestlog"], names);
    }

    #[test]
    fn expect_paths_works() {
        let inputs = vec![PathBuf::from("a"), PathBuf::from("b")];
        let outputs = vec![PathBuf::from("c")];
        let ([a, b], [c]) = expect_paths::<2, 1>(&inputs, &outputs).unwrap();
        assert_eq!((Path::new("a"), Path::new("b"), Path::new("c")),
                   (a.as_path(), b.as_path(), c.as_path()));
        match expect_paths::<1, 1>(&inputs, &outputs) {
            Err(Error::Paths { inputs: 2, outputs: 1 }) => {}
            res => panic!("unexpected result: {:?}", res)
        }
    }

    #[test]
    fn help_works() {
        let help = FuseJob.help().to_string();
        assert!(help.starts_with("fuse: generate C header from fuse test files\n"));
        assert!(help.contains("  outHeader: string - path of generated header file\n"));
    }
}
