/*
    Copyright (C) 2024-2026  CHIPSGEN developers

    This file is part of CHIPSGEN, a fixture compiler for emulator test suites.

    For the full copyright notice, see the lib.rs file.
*/
//! Commands running emulator test programs.
//!
//! Each [TestSuite] starts an emulator executable of the project once per selected test
//! program, passing the program path on the emulator's command line.
use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process;

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};

use crate::project::{Project, ProjectError};

/// Starts executables.
pub trait Runner {
    /// Runs `exe` with `args` until it exits and returns its exit code.
    ///
    /// Returns `Ok(None)` if the process was terminated by a signal.
    fn run(&mut self, exe: &Path, args: &[String]) -> io::Result<Option<i32>>;
}

/// Runs executables as child processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

impl Runner for ProcessRunner {
    fn run(&mut self, exe: &Path, args: &[String]) -> io::Result<Option<i32>> {
        let status = process::Command::new(exe).args(args).status()?;
        Ok(status.code())
    }
}

/// A fixed list of test programs run by an emulator target.
#[derive(Clone, Copy)]
pub struct TestSuite {
    /// The command name.
    pub name: &'static str,
    pub about: &'static str,
    /// The emulator target.
    pub target: &'static str,
    /// The directory of test programs, relative to the project directory.
    pub dir: &'static str,
    pub tests: &'static [&'static str],
    select_key: fn(&'static str) -> &'static str,
    emulator_args: fn(&Path) -> Vec<String>,
}

/// The Wolfgang Lorenz C64 test suite 2.15 programs.
pub static C64_WLSPECIAL_TESTS: TestSuite = TestSuite {
    name: "c64-wlspecial-tests",
    about: "run all or selected C64 tests",
    target: "c64-ui",
    dir: "tests/testsuite-2.15/bin",
    tests: &[
        "branchwrap", "cia1pb6", "cia1pb7", "cia1tab", "cia1tb123", "cia2pb6", "cia2pb7",
        "cia2tb123", "cntdef", "cnto2", "cpuport", "cputiming", "flipos", "icr01", "imr",
        "irq", "loadth", "mmu", "mmufetch", "nmi", "oneshot",
        "trap1", "trap2", "trap3", "trap4", "trap5", "trap6", "trap7", "trap8", "trap9",
        "trap10", "trap11", "trap12", "trap13", "trap14", "trap15", "trap16", "trap17",
    ],
    select_key: test_name,
    emulator_args: c64_args,
};

/// The VICE VIC-20 VIA test programs.
pub static VIC20_VIA_TESTS: TestSuite = TestSuite {
    name: "vic20-via-tests",
    about: "run vic20 via tests",
    target: "vic20-ui",
    dir: "tests/vice-tests/VIC20",
    tests: &[
        "viavarious/via1.prg", "viavarious/via2.prg", "viavarious/via3.prg",
        "viavarious/via3a.prg", "viavarious/via4.prg", "viavarious/via4a.prg",
        "viavarious/via5.prg", "viavarious/via5a.prg", "viavarious/via9.prg",
        "viavarious/via10.prg", "viavarious/via11.prg", "viavarious/via12.prg",
        "viavarious/via13.prg",
    ],
    select_key: file_stem,
    emulator_args: vic20_args,
};

fn test_name(test: &'static str) -> &'static str {
    test
}

fn file_stem(test: &'static str) -> &'static str {
    Path::new(test).file_stem().and_then(OsStr::to_str).unwrap_or(test)
}

fn c64_args(program: &Path) -> Vec<String> {
    vec![format!("file={}", program.display()), "input=RUN\r".into()]
}

fn vic20_args(program: &Path) -> Vec<String> {
    vec!["exp=ram8k".into(), format!("file={}", program.display())]
}

/// Returns all test suite commands.
pub fn suites() -> [&'static TestSuite; 2] {
    [&C64_WLSPECIAL_TESTS, &VIC20_VIA_TESTS]
}

/// Returns the test suite command with the given `name`.
pub fn find(name: &str) -> Option<&'static TestSuite> {
    suites().iter().copied().find(|suite| suite.name == name)
}

impl TestSuite {
    /// The name by which the test is selected.
    pub fn select_key(&self, test: &'static str) -> &'static str {
        (self.select_key)(test)
    }
    /// The emulator arguments running the test `program`.
    pub fn emulator_args(&self, program: &Path) -> Vec<String> {
        (self.emulator_args)(program)
    }
    /// Returns the tests selected by `names` in the order of the list, or all tests if `names` is empty.
    ///
    /// Unknown names are ignored with a warning.
    pub fn select(&self, names: &[&str]) -> Vec<&'static str> {
        if names.is_empty() {
            return self.tests.to_vec()
        }
        for name in names.iter() {
            if !self.tests.iter().any(|&test| self.select_key(test) == *name) {
                warn!("{}: unknown test: {}", self.name, name);
            }
        }
        self.tests.iter().copied()
                  .filter(|&test| names.contains(&self.select_key(test)))
                  .collect()
    }
    /// Runs the tests selected by `names` one after another and returns the number of tests run.
    ///
    /// Stops at the first test whose emulator could not be started or exited unsuccessfully.
    pub fn run(&self, project: &Project, runner: &mut dyn Runner, names: &[&str]) -> Result<usize, ProjectError> {
        let tests = self.select(names);
        let exe = project.exe_path(self.target)?;
        let test_dir = project.dir().join(self.dir);
        info!("# running tests {}", tests.join(" "));
        for test in tests.iter() {
            let args = self.emulator_args(&test_dir.join(test));
            debug!("{} {:?}", exe.display(), args);
            match runner.run(&exe, &args) {
                Ok(Some(0)) => {}
                Ok(code) => return Err(ProjectError::Exit { exe, code }),
                Err(err) => return Err(ProjectError::Spawn { exe, err })
            }
        }
        Ok(tests.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use crate::project::EXE_SUFFIX;

    #[derive(Default)]
    struct Recorder {
        runs: Vec<(PathBuf, Vec<String>)>,
        fail_at: Option<usize>,
    }

    impl Runner for Recorder {
        fn run(&mut self, exe: &Path, args: &[String]) -> io::Result<Option<i32>> {
            self.runs.push((exe.to_path_buf(), args.to_vec()));
            Ok(if self.fail_at == Some(self.runs.len()) { Some(1) } else { Some(0) })
        }
    }

    fn project() -> Project {
        Project::from_json("/chips", r#"{
            "configs": [{ "name": "debug", "buildDir": "build/debug" }],
            "targets": [{ "name": "c64-ui" }, { "name": "vic20-ui" }]
        }"#).unwrap()
    }

    #[test]
    fn suites_work() {
        assert_eq!(38, C64_WLSPECIAL_TESTS.tests.len());
        assert_eq!(13, VIC20_VIA_TESTS.tests.len());
        assert_eq!(Some("vic20-via-tests"), find("vic20-via-tests").map(|s| s.name));
        assert!(find("zx-tests").is_none());
        assert_eq!("via3a", VIC20_VIA_TESTS.select_key("viavarious/via3a.prg"));
        assert_eq!("trap1", C64_WLSPECIAL_TESTS.select_key("trap1"));
    }

    #[test]
    fn select_works() {
        assert_eq!(C64_WLSPECIAL_TESTS.tests, &C64_WLSPECIAL_TESTS.select(&[])[..]);
        assert_eq!(vec!["imr", "trap17"], C64_WLSPECIAL_TESTS.select(&["trap17", "nosuch", "imr"]));
        assert_eq!(vec!["viavarious/via1.prg", "viavarious/via10.prg"],
                   VIC20_VIA_TESTS.select(&["via10", "via1"]));
        assert!(VIC20_VIA_TESTS.select(&["via1.prg"]).is_empty());
    }

    #[test]
    fn c64_run_works() {
        let mut runner = Recorder::default();
        let count = C64_WLSPECIAL_TESTS.run(&project(), &mut runner, &["irq", "imr"]).unwrap();
        assert_eq!(2, count);
        let exe = PathBuf::from(format!("/chips/build/debug/c64-ui{}", EXE_SUFFIX));
        let program = Path::new("/chips/tests/testsuite-2.15/bin/imr");
        assert_eq!((exe, vec![format!("file={}", program.display()), "input=RUN\r".to_string()]),
                   runner.runs[0]);
        assert!(runner.runs[1].1[0].ends_with("irq"));
    }

    #[test]
    fn vic20_run_works() {
        let mut runner = Recorder::default();
        assert_eq!(13, VIC20_VIA_TESTS.run(&project(), &mut runner, &[]).unwrap());
        let program = Path::new("/chips/tests/vice-tests/VIC20/viavarious/via1.prg");
        assert_eq!(vec!["exp=ram8k".to_string(), format!("file={}", program.display())],
                   runner.runs[0].1);
    }

    #[test]
    fn failing_test_stops_the_run() {
        let mut runner = Recorder { fail_at: Some(2), ..Default::default() };
        match VIC20_VIA_TESTS.run(&project(), &mut runner, &[]) {
            Err(ProjectError::Exit { code: Some(1), .. }) => {}
            res => panic!("unexpected result: {:?}", res)
        }
        assert_eq!(2, runner.runs.len());
    }

    #[test]
    fn unknown_target_fails() {
        let project = Project::from_json("/chips", r#"{ "targets": [] }"#).unwrap();
        let mut runner = Recorder::default();
        assert!(matches!(C64_WLSPECIAL_TESTS.run(&project, &mut runner, &[]),
                         Err(ProjectError::UnknownTarget(..))));
        assert!(runner.runs.is_empty());
    }
}
