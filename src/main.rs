use std::{
	env,
	ffi::OsString,
	path::{Path, PathBuf}, //
	process::{Command, ExitCode},
};

use anyhow::Context;
use clap::Parser;

use mgen::{
	config::Config, //
	external::Git,
	DIRECTIVE_FILE,
};

/// Generates build.ninja from `_m` directive files, then runs ninja.
#[derive(Parser, Debug)]
#[command(about, disable_help_flag = true, disable_version_flag = true)]
struct Cli {
	/// An optional top directory containing a `_m` file, followed by
	/// arguments passed through to the build executor.
	#[arg(trailing_var_arg = true, allow_hyphen_values = true)]
	args: Vec<String>,
}

/// Executable `program` on `paths`, a PATH-style list.
fn locate(program: &str, paths: Option<OsString>) -> anyhow::Result<PathBuf> {
	let cwd = env::current_dir()?;
	which::which_in(program, paths, cwd).with_context(|| format!("{} not found on PATH", program))
}

fn run(mut args: Vec<String>) -> anyhow::Result<ExitCode> {
	let alternate = args.first().is_some_and(|first| Path::new(first).join(DIRECTIVE_FILE).is_file());
	let (topdir, builddir) = if alternate {
		(PathBuf::from(args.remove(0)), ".")
	} else {
		(PathBuf::from("."), "build")
	};
	log::debug!("topdir: {}, builddir: {}", topdir.display(), builddir);

	let config = Config::load(&topdir)?;
	let (registry, project, diagnostics) = mgen::parse_project(&topdir, builddir, DIRECTIVE_FILE)?;
	if !diagnostics.is_empty() {
		log::info!("{} directive(s) ignored", diagnostics.len());
	}

	let git = Git::new(&config.git);
	mgen::generate_project(&project, &registry, &config, &git, Path::new(&config.build_file))?;

	let executor = locate(&config.executor, env::var_os("PATH"))?;
	log::debug!("{} {}", executor.display(), args.join(" "));
	let status = Command::new(&executor)
		.args(&args)
		.status()
		.with_context(|| format!("Error executing {}", executor.display()))?;
	Ok(match status.code() {
		Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
		None => ExitCode::FAILURE,
	})
}

fn main() -> ExitCode {
	env_logger::Builder::from_env(env_logger::Env::default().filter_or("M_LOG", "warn"))
		.format_timestamp(None)
		.init();

	let cli = Cli::parse();
	match run(cli.args) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("m: {:#}", e);
			ExitCode::FAILURE
		}
	}
}
