/*
    Copyright (C) 2024-2026  CHIPSGEN developers

    This file is part of CHIPSGEN, a fixture compiler for emulator test suites.

    For the full copyright notice, see the lib.rs file.
*/
//! The `fuse` job compiles the **Fuse** Z80 `tests.in` and `tests.expected` files into a C header.
use std::path::{Path, PathBuf};

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};
use serde::Deserialize;
use serde_json::{json, Value};

use chipsgen_core::cursor::read_text;
use chipsgen_core::error::IoResultExt;
use chipsgen_core::stale::{regenerate, Emission};
use chipsgen_core::Result;
use chipsgen_formats::{CHeader, FuseTable, TableFormat};

use crate::args::{self, ArgKind, ArgSpec, ArgsError};
use crate::project::{Config, Project, Target};
use super::{base_dir, expect_paths, Job, JobPlan};

/// The C identifier of the table compiled from `tests.in`.
pub const INPUT_TABLE: &str = "fuse_input";
/// The C identifier of the table compiled from `tests.expected`.
pub const EXPECTED_TABLE: &str = "fuse_expected";

const SCHEMA: &[ArgSpec] = &[
    ArgSpec::optional("dir", ArgKind::String, "base dir of files to embed (default: target source dir)"),
    ArgSpec::required("fuse_input_file", ArgKind::String, "the fuse tests.in file path"),
    ArgSpec::required("fuse_expected_file", ArgKind::String, "the fuse tests.expected file path"),
    ArgSpec::required("outHeader", ArgKind::String, "path of generated header file"),
];

#[derive(Clone, Debug, Deserialize)]
struct FuseArgs {
    dir: Option<String>,
    fuse_input_file: String,
    fuse_expected_file: String,
    #[serde(rename = "outHeader")]
    out_header: String,
}

/// Generates the `fuse_input` and `fuse_expected` tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct FuseJob;

impl Job for FuseJob {
    fn name(&self) -> &'static str {
        "fuse"
    }

    fn about(&self) -> &'static str {
        "generate C header from fuse test files"
    }

    fn schema(&self) -> &'static [ArgSpec] {
        SCHEMA
    }

    fn build(&self, project: &Project, _config: &Config, target: &Target, args: &Value) -> core::result::Result<JobPlan, ArgsError> {
        let FuseArgs { dir, fuse_input_file, fuse_expected_file, out_header } = args::parse(self.name(), args, SCHEMA)?;
        let dir = base_dir(project, target, dir.as_deref());
        Ok(JobPlan {
            name: self.name(),
            inputs: vec![dir.join(&fuse_input_file), dir.join(&fuse_expected_file)],
            outputs: vec![dir.join(&out_header)],
            args: json!({
                "dir": dir.to_string_lossy(),
                "fuse_input_file": fuse_input_file,
                "fuse_expected_file": fuse_expected_file,
                "outHeader": out_header,
            }),
            add_outputs_to_target_sources: true,
            func: Box::new(generate)
        })
    }
}

/// Parses both fixture files and renders them with the given `format`, `fuse_input` first.
pub fn compile_with<F: TableFormat + ?Sized>(format: &F, input: &Path, expected: &Path) -> Result<Vec<u8>> {
    let input_text = read_text(input)?;
    let expected_text = read_text(expected)?;
    let tables = [FuseTable::parse(INPUT_TABLE, &input_text),
                  FuseTable::parse(EXPECTED_TABLE, &expected_text)];
    let mut out = Vec::new();
    format.write_fuse(&mut out, &tables).with_path(expected)?;
    Ok(out)
}

/// Compiles both fixture files into the C header text.
pub fn compile(input: &Path, expected: &Path) -> Result<Vec<u8>> {
    compile_with(&CHeader, input, expected)
}

/// The job function: regenerates `outputs[0]` from `inputs[0]` and `inputs[1]` if stale.
pub fn generate(inputs: &[PathBuf], outputs: &[PathBuf]) -> Result<Emission> {
    let ([input, expected], [header]) = expect_paths::<2, 1>(inputs, outputs)?;
    regenerate(inputs, header, || {
        for file in inputs.iter() {
            info!("# fuse {} => {}", file.display(), header.display());
        }
        compile(input, expected)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use chipsgen_formats::render::GENERATED_NOTICE;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
                  .join(format!("chipsgen-fuse-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    const TESTS_IN: &str = "\
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

    const TESTS_EXPECTED: &str = "\
00
    0 MC 0000
    0 MR 0000 00
0001 0000 0000 0000 0000 0000 0000 0000 0000 0000 0000 0001
00 01 0 0 0 0 4

01
    0 MC 0000
    4 MR 0000 01
4000 0001 0000 0000 0000 0000 0000 0000 0000 0000 0000 0003
00 02 0 0 0 0 10

";

    #[test]
    fn generate_works() {
        let dir = scratch_dir("generate");
        let inputs = vec![dir.join("tests.in"), dir.join("tests.expected")];
        let outputs = vec![dir.join("gen/fuse.h")];
        fs::write(&inputs[0], TESTS_IN).unwrap();
        fs::write(&inputs[1], TESTS_EXPECTED).unwrap();

        let res = generate(&inputs, &outputs).unwrap();
        assert!(res.is_written());
        let header = fs::read_to_string(&outputs[0]).unwrap();
        assert!(header.starts_with(GENERATED_NOTICE));
        assert!(header.contains("const int fuse_input_num = 2;\n"));
        assert!(header.contains("const int fuse_expected_num = 2;\n"));
        assert!(header.contains("      { .addr=0x0000, .bytes = { 0x01,0x12,0x34,}, .num_bytes=3, },\n"));
        assert!(header.contains("      { .tick=4, .type=EVENT_MR, .addr=0x0000, .data=0x01 },\n"));
        assert_eq!(Emission::Written { bytes: header.len() }, res);

        assert_eq!(Emission::UpToDate, generate(&inputs, &outputs).unwrap());
    }

    #[test]
    fn missing_input_fails() {
        let dir = scratch_dir("missing");
        let inputs = vec![dir.join("tests.in"), dir.join("tests.expected")];
        let outputs = vec![dir.join("fuse.h")];
        fs::write(&inputs[0], TESTS_IN).unwrap();
        assert!(generate(&inputs, &outputs).is_err());
        assert!(!outputs[0].exists());
        assert!(generate(&inputs[..1], &outputs).is_err());
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let dir = scratch_dir("latin1");
        let input = dir.join("tests.in");
        let expected = dir.join("tests.expected");
        let mut text = b"ld a,\xe9\n".to_vec();
        text.extend_from_slice(TESTS_IN.splitn(2, '\n').nth(1).unwrap().as_bytes());
        fs::write(&input, text).unwrap();
        fs::write(&expected, TESTS_EXPECTED).unwrap();
        let header = String::from_utf8(compile(&input, &expected).unwrap()).unwrap();
        assert!(header.contains("    .desc = \"ld a,\u{fffd}\",\n"));
        assert!(header.contains("const int fuse_input_num = 2;\n"));
    }
}
