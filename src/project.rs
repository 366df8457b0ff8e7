/*
    Copyright (C) 2024-2026  CHIPSGEN developers

    This file is part of CHIPSGEN, a fixture compiler for emulator test suites.

    For the full copyright notice, see the lib.rs file.
*/
//! The project manifest and the orchestration of generator jobs.
//!
//! A project is described by the `chipsgen.json` manifest in its root directory:
//!
//! ```json
//! {
//!   "configs": [{ "name": "linux-make-debug", "buildDir": "build/linux-make-debug" }],
//!   "targets": [{
//!     "name": "z80-fuse",
//!     "dir": "tests",
//!     "sources": ["z80-fuse.c"],
//!     "jobs": [{
//!       "job": "fuse",
//!       "args": {
//!         "fuse_input_file": "fuse/tests.in",
//!         "fuse_expected_file": "fuse/tests.expected",
//!         "outHeader": "fuse/fuse.h"
//!       }
//!     }]
//!   }]
//! }
//! ```
use core::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};
use serde::Deserialize;
use serde_json::Value;

use chipsgen_core::error::IoResultExt;
use chipsgen_core::stale::Emission;

use crate::args::ArgsError;
use crate::job::{self, JobPlan};

/// The file name of the project manifest.
pub const MANIFEST_FILE: &str = "chipsgen.json";
/// The suffix of executable files on the host platform.
pub const EXE_SUFFIX: &str = std::env::consts::EXE_SUFFIX;

/// A build configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub name: String,
    /// Where the target executables are built, relative to the project directory.
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build")
}

impl Default for Config {
    fn default() -> Self {
        Config { name: "default".into(), build_dir: default_build_dir() }
    }
}

/// A job invocation of a target.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct JobSpec {
    pub job: String,
    #[serde(default = "empty_args")]
    pub args: Value,
}

fn empty_args() -> Value {
    Value::Object(Default::default())
}

/// A build target.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Target {
    pub name: String,
    /// The source directory, relative to the project directory.
    #[serde(default)]
    pub dir: PathBuf,
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    #[serde(default)]
    pub jobs: Vec<JobSpec>,
}

/// The content of the project manifest.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub configs: Vec<Config>,
    #[serde(default)]
    pub targets: Vec<Target>,
}

/// The result of a single job run by [Project::build_target].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobOutcome {
    pub job: &'static str,
    pub outputs: Vec<PathBuf>,
    pub emission: Emission,
}

/// The error type of the project operations.
#[non_exhaustive]
#[derive(Debug)]
pub enum ProjectError {
    /// The manifest file could not be read.
    Io(chipsgen_core::Error),
    /// The manifest file is not a valid manifest.
    Manifest {
        path: PathBuf,
        err: serde_json::Error
    },
    UnknownConfig(String),
    UnknownTarget(String),
    UnknownJob {
        target: String,
        job: String
    },
    /// The arguments of a target's job are invalid.
    Args {
        target: String,
        err: ArgsError
    },
    /// A job has failed.
    Job {
        target: String,
        job: &'static str,
        err: chipsgen_core::Error
    },
    /// An executable could not be started.
    Spawn {
        exe: PathBuf,
        err: io::Error
    },
    /// An executable has finished unsuccessfully, `code` is `None` if it was terminated by a signal.
    Exit {
        exe: PathBuf,
        code: Option<i32>
    },
}

impl std::error::Error for ProjectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProjectError::Io(err) => Some(err),
            ProjectError::Manifest { err, .. } => Some(err),
            ProjectError::Args { err, .. } => Some(err),
            ProjectError::Job { err, .. } => Some(err),
            ProjectError::Spawn { err, .. } => Some(err),
            _ => None
        }
    }
}

impl fmt::Display for ProjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ProjectError::*;
        match self {
            Io(err) => write!(f, "{}", err),
            Manifest { path, err } => write!(f, "{}: {}", path.display(), err),
            UnknownConfig(name) => write!(f, "unknown config: {}", name),
            UnknownTarget(name) => write!(f, "unknown target: {}", name),
            UnknownJob { target, job } => write!(f, "target '{}': unknown job '{}'", target, job),
            Args { target, err } => write!(f, "target '{}': {}", target, err),
            Job { target, job, err } => write!(f, "target '{}': job '{}' failed: {}", target, job, err),
            Spawn { exe, err } => write!(f, "{}: failed to run: {}", exe.display(), err),
            Exit { exe, code: Some(code) } => write!(f, "{}: exited with status {}", exe.display(), code),
            Exit { exe, code: None } => write!(f, "{}: terminated by a signal", exe.display()),
        }
    }
}

impl From<chipsgen_core::Error> for ProjectError {
    fn from(err: chipsgen_core::Error) -> Self {
        ProjectError::Io(err)
    }
}

/// A loaded project.
#[derive(Clone, Debug)]
pub struct Project {
    dir: PathBuf,
    configs: Vec<Config>,
    targets: Vec<Target>,
    active: usize,
}

impl Project {
    /// Creates a project rooted at `dir`.
    ///
    /// A manifest without configs gets a single default config building into `build`.
    pub fn new<P: Into<PathBuf>>(dir: P, manifest: Manifest) -> Self {
        let Manifest { mut configs, targets } = manifest;
        if configs.is_empty() {
            configs.push(Config::default());
        }
        Project { dir: dir.into(), configs, targets, active: 0 }
    }
    /// Parses the manifest `json` of a project rooted at `dir`.
    pub fn from_json<P: Into<PathBuf>>(dir: P, json: &str) -> Result<Self, ProjectError> {
        let dir = dir.into();
        let manifest = serde_json::from_str(json).map_err(|err| {
            ProjectError::Manifest { path: dir.join(MANIFEST_FILE), err }
        })?;
        Ok(Project::new(dir, manifest))
    }
    /// Loads the project manifest found in `dir`.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, ProjectError> {
        let dir = dir.as_ref();
        let path = dir.join(MANIFEST_FILE);
        let json = fs::read_to_string(&path).with_path(&path)?;
        debug!("loaded {}", path.display());
        Project::from_json(dir, &json)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn configs(&self) -> &[Config] {
        &self.configs
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn active_config(&self) -> &Config {
        &self.configs[self.active]
    }
    /// Makes the config with the given `name` the active one.
    pub fn select_config(&mut self, name: &str) -> Result<(), ProjectError> {
        match self.configs.iter().position(|config| config.name == name) {
            Some(index) => {
                self.active = index;
                Ok(())
            }
            None => Err(ProjectError::UnknownConfig(name.into()))
        }
    }

    pub fn target(&self, name: &str) -> Result<&Target, ProjectError> {
        self.targets.iter().find(|target| target.name == name)
                           .ok_or_else(|| ProjectError::UnknownTarget(name.into()))
    }

    fn target_mut(&mut self, name: &str) -> Result<&mut Target, ProjectError> {
        self.targets.iter_mut().find(|target| target.name == name)
                               .ok_or_else(|| ProjectError::UnknownTarget(name.into()))
    }
    /// Returns the absolute source directory of the `target`.
    pub fn target_dir(&self, target: &Target) -> PathBuf {
        self.dir.join(&target.dir)
    }
    /// Returns the absolute build directory of the active config.
    pub fn build_dir(&self) -> PathBuf {
        self.dir.join(&self.active_config().build_dir)
    }
    /// Returns the path of the executable built from the target with the given `name`.
    pub fn exe_path(&self, name: &str) -> Result<PathBuf, ProjectError> {
        let target = self.target(name)?;
        Ok(self.build_dir().join(format!("{}{}", target.name, EXE_SUFFIX)))
    }
    /// Validates the jobs of the target with the given `name` and builds their plans.
    pub fn plan_target(&self, name: &str) -> Result<Vec<JobPlan>, ProjectError> {
        let target = self.target(name)?;
        let config = self.active_config();
        target.jobs.iter().map(|spec| {
            let job = job::find(&spec.job).ok_or_else(|| ProjectError::UnknownJob {
                target: target.name.clone(), job: spec.job.clone()
            })?;
            job.validate(&spec.args)
               .and_then(|_| job.build(self, config, target, &spec.args))
               .map_err(|err| ProjectError::Args { target: target.name.clone(), err })
        })
        .collect()
    }
    /// Runs all jobs of the target with the given `name`.
    ///
    /// Outputs of jobs that request it are appended to the target's sources, unless already there.
    pub fn build_target(&mut self, name: &str) -> Result<Vec<JobOutcome>, ProjectError> {
        let plans = self.plan_target(name)?;
        let mut outcomes = Vec::with_capacity(plans.len());
        for plan in plans {
            let emission = plan.run().map_err(|err| ProjectError::Job {
                target: name.into(), job: plan.name, err
            })?;
            match emission {
                Emission::UpToDate => debug!("{}: {} up to date", name, plan.name),
                Emission::Written {..} => info!("{}: {} {}", name, plan.name, emission)
            }
            if plan.add_outputs_to_target_sources {
                let target = self.target_mut(name)?;
                for output in plan.outputs.iter() {
                    if !target.sources.contains(output) {
                        target.sources.push(output.clone());
                    }
                }
            }
            outcomes.push(JobOutcome { job: plan.name, outputs: plan.outputs, emission });
        }
        Ok(outcomes)
    }
    /// Runs all jobs of the targets with the given `names`, or of all targets if `names` is empty.
    pub fn build(&mut self, names: &[&str]) -> Result<Vec<JobOutcome>, ProjectError> {
        let names: Vec<String> = if names.is_empty() {
            self.targets.iter().map(|target| target.name.clone()).collect()
        }
        else {
            names.iter().map(|&name| name.into()).collect()
        };
        let mut outcomes = Vec::new();
        for name in names.iter() {
            outcomes.extend(self.build_target(name)?);
        }
        Ok(outcomes)
    }
}
