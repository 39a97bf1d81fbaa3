mod binary;
pub mod builder;
pub mod config;
pub mod error;
pub mod external;
pub mod generator;
pub mod lexer;
pub mod library;
pub mod link_type;
pub mod loader;
mod misc;
pub mod object;
pub mod project;
pub mod registry;

use std::path::Path;

pub use binary::Binary;
pub use error::Error;
pub use loader::Diagnostic;

use config::Config;
use external::Vcs;
use loader::Loader;
use project::Project;
use registry::Registry;

/// Reserved name of a directive file.
pub const DIRECTIVE_FILE: &str = "_m";

/// Loads `file` (relative to `topdir`) and everything it pulls in.
pub fn parse_project(topdir: &Path, builddir: &str, file: &str) -> Result<(Registry, Project, Vec<Diagnostic>), Error> {
	let mut registry = Registry::new();
	let mut loader = Loader::new(topdir, builddir);
	let state = match loader.load_file(&mut registry, file, None)? {
		Some(x) => x,
		None => return Err(Error::EmptyProject(topdir.join(file).display().to_string())),
	};
	let project = state.finish(&mut registry);
	Ok((registry, project, loader.into_diagnostics()))
}

/// Generates the build description and writes it to `build_file`.
pub fn generate_project(
	project: &Project,
	registry: &Registry,
	config: &Config,
	vcs: &dyn Vcs,
	build_file: &Path,
) -> Result<(), Error> {
	let contents = generator::generate(project, registry, config, vcs)?;
	generator::write_build_file(build_file, &contents)
}
