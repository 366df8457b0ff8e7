/*
    Copyright (C) 2024-2026  CHIPSGEN developers

    This file is part of CHIPSGEN, a fixture compiler for emulator test suites.

    For the full copyright notice, see the lib.rs file.
*/
//! The `nestestlog` job compiles a **nestest** 6502 CPU trace log into a C header.
use std::path::{Path, PathBuf};

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};
use serde::Deserialize;
use serde_json::{json, Value};

use chipsgen_core::cursor::read_text;
use chipsgen_core::error::IoResultExt;
use chipsgen_core::stale::{regenerate, Emission};
use chipsgen_core::Result;
use chipsgen_formats::nestest::parse_nestest;
use chipsgen_formats::{CHeader, Layout, TableFormat};

use crate::args::{self, ArgKind, ArgSpec, ArgsError};
use crate::project::{Config, Project, Target};
use super::{base_dir, expect_paths, Job, JobPlan};

const SCHEMA: &[ArgSpec] = &[
    ArgSpec::optional("dir", ArgKind::String, "base dir of files to embed (default: target source dir)"),
    ArgSpec::required("input", ArgKind::String, "the input nestestlog.txt file"),
    ArgSpec::required("outHeader", ArgKind::String, "path of generated header file"),
    ArgSpec::optional("strict", ArgKind::Bool, "reject lines not matching the log column layout"),
];

#[derive(Clone, Debug, Deserialize)]
struct NestestLogArgs {
    dir: Option<String>,
    input: String,
    #[serde(rename = "outHeader")]
    out_header: String,
    #[serde(default)]
    strict: bool,
}

/// Generates the `state_table` of CPU states.
#[derive(Clone, Copy, Debug, Default)]
pub struct NestestLogJob;

impl Job for NestestLogJob {
    fn name(&self) -> &'static str {
        "nestestlog"
    }

    fn about(&self) -> &'static str {
        "generate C header from nestest log file"
    }

    fn schema(&self) -> &'static [ArgSpec] {
        SCHEMA
    }

    fn build(&self, project: &Project, _config: &Config, target: &Target, args: &Value) -> core::result::Result<JobPlan, ArgsError> {
        let NestestLogArgs { dir, input, out_header, strict } = args::parse(self.name(), args, SCHEMA)?;
        let dir = base_dir(project, target, dir.as_deref());
        let layout = if strict { Layout::Strict } else { Layout::Lenient };
        Ok(JobPlan {
            name: self.name(),
            inputs: vec![dir.join(&input)],
            outputs: vec![dir.join(&out_header)],
            args: json!({
                "dir": dir.to_string_lossy(),
                "input": input,
                "outHeader": out_header,
                "strict": strict,
            }),
            add_outputs_to_target_sources: true,
            func: Box::new(move |inputs: &[PathBuf], outputs: &[PathBuf]| {
                generate(inputs, outputs, layout)
            })
        })
    }
}

/// Parses the log file and renders its records with the given `format`.
pub fn compile_with<F: TableFormat + ?Sized>(format: &F, input: &Path, layout: Layout) -> Result<Vec<u8>> {
    let text = read_text(input)?;
    let records = parse_nestest(&text, layout).map_err(|err| {
        error!("{}: {}", input.display(), err);
        err
    })?;
    let mut out = Vec::new();
    format.write_nestest(&mut out, &records).with_path(input)?;
    Ok(out)
}

/// Compiles the log file into the C header text.
pub fn compile(input: &Path, layout: Layout) -> Result<Vec<u8>> {
    compile_with(&CHeader, input, layout)
}

/// The job function: regenerates `outputs[0]` from `inputs[0]` if stale.
pub fn generate(inputs: &[PathBuf], outputs: &[PathBuf], layout: Layout) -> Result<Emission> {
    let ([input], [header]) = expect_paths::<1, 1>(inputs, outputs)?;
    regenerate(inputs, header, || {
        info!("# nestestlog {} => {}", input.display(), header.display());
        compile(input, layout)
    })
}
