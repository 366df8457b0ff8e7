/*
    Copyright (C) 2024-2026  CHIPSGEN developers

    This file is part of CHIPSGEN, a fixture compiler for emulator test suites.

    CHIPSGEN is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    CHIPSGEN is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
use std::error::Error;
use std::io::{self, Write};
use std::path::Path;

use clap::{clap_app, App, Arg, ArgMatches, SubCommand};
#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};

use chipsgen::command::{self, ProcessRunner, TestSuite};
use chipsgen::job::{self, fuse, nestestlog};
use chipsgen::stale::regenerate;
use chipsgen::Project;
use chipsgen_formats::{CHeader, Json, Layout, TableFormat};

type Result<T> = core::result::Result<T, Box<dyn Error>>;

fn main() -> Result<()> {
    let suites = command::suites();
    let matches = clap_app!(chipsgen =>
        (version: env!("CARGO_PKG_VERSION"))
        (about: "Compiles CPU test-suite fixtures into C headers and runs emulator test programs")
        (@setting SubcommandRequiredElseHelp)
        (@arg verbose: -v --verbose +multiple "Increases logging verbosity, may be repeated")
        (@arg project: -C --project +takes_value "The project directory (default: current directory)")
        (@arg config: -c --config +takes_value "Selects the build config of the project")
        (@subcommand fuse =>
            (about: "generate C header from fuse test files")
            (@arg format: -f --format +takes_value "Output format: c or json (default: c)")
            (@arg output: -o --output +takes_value "Writes to a file unless it is newer than the inputs")
            (@arg INPUT: +required "the fuse tests.in file path")
            (@arg EXPECTED: +required "the fuse tests.expected file path")
        )
        (@subcommand nestestlog =>
            (about: "generate C header from nestest log file")
            (@arg format: -f --format +takes_value "Output format: c or json (default: c)")
            (@arg output: -o --output +takes_value "Writes to a file unless it is newer than the input")
            (@arg strict: --strict "Rejects lines not matching the log column layout")
            (@arg INPUT: +required "the input nestestlog.txt file")
        )
        (@subcommand build =>
            (about: "run generator jobs of the project targets")
            (@arg TARGETS: ... "Target names (default: all targets)")
        )
        (@subcommand jobs =>
            (about: "list generator jobs and their arguments")
        )
    )
    .subcommands(suites.iter().map(|suite| suite_command(suite)))
    .get_matches();

    init_logger(matches.occurrences_of("verbose"));

    match matches.subcommand() {
        ("fuse", Some(sub)) => compile_fuse(sub),
        ("nestestlog", Some(sub)) => compile_nestest(sub),
        ("build", Some(sub)) => build(&matches, sub),
        ("jobs", Some(_)) => list_jobs(),
        (name, Some(sub)) => match command::find(name) {
            Some(suite) => run_suite(&matches, suite, sub),
            None => Err(format!("unknown command: {}", name).into())
        },
        _ => Ok(())
    }
}

fn suite_command(suite: &TestSuite) -> App<'static, 'static> {
    SubCommand::with_name(suite.name)
        .about(suite.about)
        .arg(Arg::with_name("TESTS").multiple(true).help("Test names (default: all tests)"))
}

fn init_logger(verbosity: u64) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches.value_of(name).ok_or_else(|| format!("missing argument: {}", name).into())
}

fn table_format(matches: &ArgMatches) -> Result<&'static dyn TableFormat> {
    match matches.value_of("format").unwrap_or("c") {
        "c" => Ok(&CHeader),
        "json" => Ok(&Json),
        other => Err(format!("unknown format: {}", other).into())
    }
}

/// Writes the rendered content either to stdout or, if stale, to the `output` file.
fn emit<F>(output: Option<&str>, inputs: &[&Path], render: F) -> Result<()>
    where F: FnOnce() -> chipsgen::Result<Vec<u8>>
{
    match output {
        Some(path) => {
            let emission = regenerate(inputs, Path::new(path), render)?;
            info!("{}: {}", path, emission);
        }
        None => {
            let out = render()?;
            io::stdout().lock().write_all(&out)?;
        }
    }
    Ok(())
}

fn compile_fuse(matches: &ArgMatches) -> Result<()> {
    let format = table_format(matches)?;
    let input = Path::new(required(matches, "INPUT")?);
    let expected = Path::new(required(matches, "EXPECTED")?);
    emit(matches.value_of("output"), &[input, expected], || {
        fuse::compile_with(format, input, expected)
    })
}

fn compile_nestest(matches: &ArgMatches) -> Result<()> {
    let format = table_format(matches)?;
    let input = Path::new(required(matches, "INPUT")?);
    let layout = if matches.is_present("strict") { Layout::Strict } else { Layout::Lenient };
    emit(matches.value_of("output"), &[input], || {
        nestestlog::compile_with(format, input, layout)
    })
}

fn load_project(matches: &ArgMatches) -> Result<Project> {
    let dir = std::env::current_dir()?.join(matches.value_of("project").unwrap_or("."));
    let mut project = Project::load(dir)?;
    if let Some(config) = matches.value_of("config") {
        project.select_config(config)?;
    }
    debug!("config: {}", project.active_config().name);
    Ok(project)
}

fn build(matches: &ArgMatches, sub: &ArgMatches) -> Result<()> {
    let mut project = load_project(matches)?;
    let names: Vec<&str> = sub.values_of("TARGETS").map(|v| v.collect()).unwrap_or_default();
    let outcomes = project.build(&names)?;
    let written = outcomes.iter().filter(|outcome| outcome.emission.is_written()).count();
    info!("{} job(s) run, {} file(s) written", outcomes.len(), written);
    Ok(())
}

fn list_jobs() -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for job in job::jobs().iter() {
        writeln!(out, "{}", job.help())?;
    }
    writeln!(out, "commands:")?;
    for suite in command::suites().iter() {
        writeln!(out, "  {} [TESTS...]: {} with {}", suite.name, suite.about, suite.target)?;
    }
    Ok(())
}

fn run_suite(matches: &ArgMatches, suite: &TestSuite, sub: &ArgMatches) -> Result<()> {
    let project = load_project(matches)?;
    let names: Vec<&str> = sub.values_of("TESTS").map(|v| v.collect()).unwrap_or_default();
    let count = suite.run(&project, &mut ProcessRunner, &names)?;
    info!("{}: {} test(s) finished", suite.name, count);
    Ok(())
}
