use std::{
	fs,
	io, //
	path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::Error;

pub const PROJECT_CONFIG: &str = "m.toml";
const USER_CONFIG_DIR: &str = "m";
const USER_CONFIG: &str = "config.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
	toolchain: Option<ToolchainFile>,
	paths: Option<PathsFile>,
	programs: Option<ProgramsFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ToolchainFile {
	c_compiler: Option<Vec<String>>,
	cpp_compiler: Option<Vec<String>>,
	static_linker: Option<Vec<String>>,
	exe_linker: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PathsFile {
	build_file: Option<String>,
	externals: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProgramsFile {
	executor: Option<String>,
	git: Option<String>,
}

/// Commands bound to the `cc`, `cxx`, `ar` and `link` variables of the
/// generated rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
	pub c_compiler: Vec<String>,
	pub cpp_compiler: Vec<String>,
	pub static_linker: Vec<String>,
	pub exe_linker: Vec<String>,
}

impl Default for Toolchain {
	fn default() -> Self {
		Toolchain {
			c_compiler: vec!["cc".to_owned()],
			cpp_compiler: vec!["c++".to_owned()],
			static_linker: vec!["ar".to_owned()],
			exe_linker: vec!["c++".to_owned()],
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	pub toolchain: Toolchain,
	/// Generated file, relative to the invocation directory.
	pub build_file: String,
	/// Clone root for pinned externals, relative to the top directory.
	pub externals: String,
	pub executor: String,
	pub git: String,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			toolchain: Toolchain::default(),
			build_file: "build.ninja".to_owned(),
			externals: ".externals".to_owned(),
			executor: "ninja".to_owned(),
			git: "git".to_owned(),
		}
	}
}

fn set_command(slot: &mut Vec<String>, value: Option<Vec<String>>, key: &str, path: &Path) -> Result<(), Error> {
	if let Some(cmd) = value {
		if cmd.is_empty() {
			return Err(Error::Config { path: path.to_owned(), message: format!("{} command is empty", key) });
		}
		*slot = cmd;
	}
	Ok(())
}

impl Config {
	/// Defaults, then the user config, then `<topdir>/m.toml`.
	pub fn load(topdir: &Path) -> Result<Config, Error> {
		let mut config = Config::default();
		if let Some(dir) = dirs::config_dir() {
			config.merge_file(&dir.join(USER_CONFIG_DIR).join(USER_CONFIG))?;
		}
		config.merge_file(&topdir.join(PROJECT_CONFIG))?;
		Ok(config)
	}

	/// Layers a config file over `self`. A missing file is not an error.
	pub fn merge_file(&mut self, path: &Path) -> Result<(), Error> {
		let text = match fs::read_to_string(path) {
			Ok(x) => x,
			Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
			Err(e) => return Err(Error::io(path, e)),
		};
		log::debug!("reading config {}", path.display());
		self.merge_str(&text, path)
	}

	pub fn merge_str(&mut self, text: &str, path: &Path) -> Result<(), Error> {
		let file = match toml::from_str::<ConfigFile>(text) {
			Ok(x) => x,
			Err(e) => return Err(Error::Config { path: PathBuf::from(path), message: e.to_string() }),
		};
		if let Some(toolchain) = file.toolchain {
			set_command(&mut self.toolchain.c_compiler, toolchain.c_compiler, "c_compiler", path)?;
			set_command(&mut self.toolchain.cpp_compiler, toolchain.cpp_compiler, "cpp_compiler", path)?;
			set_command(&mut self.toolchain.static_linker, toolchain.static_linker, "static_linker", path)?;
			set_command(&mut self.toolchain.exe_linker, toolchain.exe_linker, "exe_linker", path)?;
		}
		if let Some(paths) = file.paths {
			if let Some(build_file) = paths.build_file {
				self.build_file = build_file;
			}
			if let Some(externals) = paths.externals {
				self.externals = externals;
			}
		}
		if let Some(programs) = file.programs {
			if let Some(executor) = programs.executor {
				self.executor = executor;
			}
			if let Some(git) = programs.git {
				self.git = git;
			}
		}
		Ok(())
	}
}
