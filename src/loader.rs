use core::fmt;
use std::{
	collections::BTreeSet,
	fs::File,
	io::BufReader, //
	path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::{
	builder::{Outcome, State},
	error::Error,
	lexer::{Lexer, LogicalLine},
	misc::parent_dir,
	project::Project,
	registry::Registry,
	DIRECTIVE_FILE,
};

/// A line that matched no directive. Reported, then skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
	pub file: String,
	pub line: usize,
	pub tokens: Vec<String>,
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: illegal directive line {}: {}", self.file, self.line, self.tokens.join(" "))
	}
}

enum Directive<'a> {
	Project(&'a str),
	Ccflags(&'a [&'a str]),
	Ldflags(&'a [&'a str]),
	Incs(&'a str),
	Libs(&'a str),
	Srcs(&'a str),
	Ext(&'a str),
	Url(&'a str, &'a str),
	Lib(&'a str),
	Template(&'a str, &'a str),
	Bin(&'a str),
	AddSrc(&'a str),
	AddDef(&'a str),
	AddLib(&'a str),
	AddLibFrom(&'a str, &'a str),
	Load(&'a str),
	Subdirs(&'a str),
}

fn parse<'a>(tokens: &'a [&'a str]) -> Option<Directive<'a>> {
	let directive = match tokens {
		["project", name] => Directive::Project(name),
		["ccflags", flags @ ..] => Directive::Ccflags(flags),
		["ldflags", flags @ ..] => Directive::Ldflags(flags),
		["incs", path] => Directive::Incs(path),
		["libs", path] => Directive::Libs(path),
		["srcs", path] => Directive::Srcs(path),
		["ext", ext] => Directive::Ext(ext),
		["url", url, revision] => Directive::Url(url, revision),
		["lib", name] => Directive::Lib(name),
		["lib", name, pattern] => Directive::Template(name, pattern),
		["bin", name] => Directive::Bin(name),
		["add", "src", file] => Directive::AddSrc(file),
		["add", "def", def] => Directive::AddDef(def),
		["add", "lib", name] => Directive::AddLib(name),
		["add", "lib", parent, name] => Directive::AddLibFrom(parent, name),
		["load", file] => Directive::Load(file),
		["subdirs", dir] => Directive::Subdirs(dir),
		_ => return None,
	};
	Some(directive)
}

/// Feeds one directive to the current builder.
fn apply(registry: &mut Registry, state: &mut State, directive: Directive) -> Outcome {
	match directive {
		Directive::Ccflags(flags) => {
			for &flag in flags {
				state.apply(registry, |b, ws| b.ccflag(ws, flag))?;
			}
			Ok(())
		}
		Directive::Ldflags(flags) => {
			for &flag in flags {
				state.apply(registry, |b, ws| b.ldflag(ws, flag))?;
			}
			Ok(())
		}
		Directive::Incs(path) => state.apply(registry, |b, ws| b.incs(ws, path)),
		Directive::Libs(path) => state.apply(registry, |b, ws| b.libs(ws, path)),
		Directive::Srcs(path) => state.apply(registry, |b, ws| b.srcs(ws, path)),
		Directive::Ext(ext) => state.apply(registry, |b, ws| b.ext(ws, ext)),
		Directive::Url(url, revision) => state.apply(registry, |b, ws| b.url(ws, url, revision)),
		Directive::AddSrc(file) => state.apply(registry, |b, ws| b.add_src(ws, file)),
		Directive::AddDef(def) => state.apply(registry, |b, ws| b.add_def(ws, def)),
		Directive::AddLib(name) => state.apply(registry, |b, ws| b.add_lib(ws, name)),
		Directive::AddLibFrom(parent, name) => state.apply(registry, |b, ws| b.add_lib_from(ws, parent, name)),
		Directive::Lib(name) => {
			state.lib(registry, name);
			Ok(())
		}
		Directive::Template(name, pattern) => {
			state.template(registry, name, pattern);
			Ok(())
		}
		Directive::Bin(name) => {
			state.bin(registry, name);
			Ok(())
		}
		// handled by the loader itself
		Directive::Project(_) | Directive::Load(_) | Directive::Subdirs(_) => Ok(()),
	}
}

/// Reads directive files relative to a top directory and drives the builder
/// state through them.
pub struct Loader {
	topdir: PathBuf,
	builddir: String,
	diagnostics: Vec<Diagnostic>,
}

impl Loader {
	pub fn new(topdir: &Path, builddir: &str) -> Self {
		Loader { topdir: topdir.to_owned(), builddir: builddir.to_owned(), diagnostics: Vec::new() }
	}

	pub fn into_diagnostics(self) -> Vec<Diagnostic> {
		self.diagnostics
	}

	/// Processes `file` (relative to the top directory) with `state` current,
	/// and returns whatever state it leaves behind.
	pub fn load_file(&mut self, registry: &mut Registry, file: &str, mut state: Option<State>) -> Result<Option<State>, Error> {
		let path = self.topdir.join(file);
		log::debug!("loading {}", path.display());
		let reader = match File::open(&path) {
			Ok(x) => BufReader::new(x),
			Err(e) => return Err(Error::io(path, e)),
		};
		if let Some(state) = state.as_mut() {
			state.project_mut().srcs(&parent_dir(file));
		}
		for line in Lexer::new(reader) {
			let line = match line {
				Ok(x) => x,
				Err(e) => return Err(Error::io(path, e)),
			};
			state = self.directive(registry, file, &line, state)?;
		}
		Ok(state)
	}

	fn directive(
		&mut self,
		registry: &mut Registry,
		file: &str,
		line: &LogicalLine,
		state: Option<State>,
	) -> Result<Option<State>, Error> {
		let tokens = line.tokens();
		let directive = match parse(&tokens) {
			Some(x) => x,
			None => {
				let diagnostic = Diagnostic {
					file: file.to_owned(),
					line: line.number,
					tokens: tokens.iter().map(|t| t.to_string()).collect(),
				};
				log::warn!("{}", diagnostic);
				self.diagnostics.push(diagnostic);
				return Ok(state);
			}
		};
		log::debug!("{}:{}: {}", file, line.number, line.text);

		match directive {
			Directive::Project(name) => {
				if let Some(previous) = state {
					let previous = previous.finish(registry);
					log::warn!("{}:{}: project {} replaces project {}", file, line.number, name, previous.name);
				}
				let topdir = self.topdir.to_string_lossy();
				Ok(Some(State::new(Project::new(name, &topdir, &self.builddir))))
			}
			Directive::Load(nested) => self.load_file(registry, nested, state),
			Directive::Subdirs(dir) => {
				let mut state = state;
				for nested in self.find_directive_files(dir) {
					state = self.load_file(registry, &nested, state)?;
				}
				Ok(state)
			}
			directive => {
				let mut state = match state {
					Some(x) => x,
					None => {
						return Err(Error::NoProject { file: file.to_owned(), line: line.number, directive: line.text.clone() })
					}
				};
				if let Err(unsupported) = apply(registry, &mut state, directive) {
					return Err(Error::Unsupported {
						unsupported,
						file: file.to_owned(),
						line: line.number,
						directive: line.text.clone(),
					});
				}
				Ok(Some(state))
			}
		}
	}

	/// Every directive file under `dir`, relative to the top directory, in
	/// lexicographic order.
	fn find_directive_files(&self, dir: &str) -> BTreeSet<String> {
		let root = self.topdir.join(dir);
		WalkDir::new(&root)
			.into_iter()
			.filter_map(|entry| match entry {
				Ok(x) => Some(x),
				Err(e) => {
					log::warn!("subdirs {}: {}", dir, e);
					None
				}
			})
			.filter(|entry| entry.file_type().is_file() && entry.file_name() == DIRECTIVE_FILE)
			.filter_map(|entry| {
				let relative = entry.path().strip_prefix(&self.topdir).ok()?;
				Some(relative.to_string_lossy().replace('\\', "/"))
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use std::fs;

	use super::*;
	use crate::error::Capability;

	fn write(dir: &Path, file: &str, contents: &str) {
		let path = dir.join(file);
		fs::create_dir_all(path.parent().unwrap()).unwrap();
		fs::write(path, contents).unwrap();
	}

	fn load(dir: &Path) -> Result<(Registry, Project, Vec<Diagnostic>), Error> {
		let mut registry = Registry::new();
		let mut loader = Loader::new(dir, "build");
		let state = loader.load_file(&mut registry, DIRECTIVE_FILE, None)?.unwrap();
		let project = state.finish(&mut registry);
		Ok((registry, project, loader.into_diagnostics()))
	}

	#[test]
	fn parse_checks_arity() {
		assert!(parse(&["project", "p"]).is_some());
		assert!(parse(&["project"]).is_none());
		assert!(parse(&["project", "p", "q"]).is_none());
		assert!(parse(&["ccflags"]).is_some());
		assert!(matches!(parse(&["lib", "boost", "boost_%"]), Some(Directive::Template("boost", "boost_%"))));
		assert!(matches!(parse(&["add", "lib", "boost", "system"]), Some(Directive::AddLibFrom("boost", "system"))));
		assert!(parse(&["add", "obj", "x"]).is_none());
		assert!(parse(&["url", "https://x"]).is_none());
	}

	#[test]
	fn malformed_lines_are_reported_and_skipped() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "_m", "project p\nlib\nbogus 1 2\nlib z\nadd src \\\n  a b\nadd src inflate\n");
		let (registry, project, diagnostics) = load(dir.path()).unwrap();
		assert_eq!(diagnostics.len(), 3);
		assert_eq!(diagnostics[0].to_string(), "_m: illegal directive line 2: lib");
		assert_eq!(diagnostics[1].tokens, vec!["bogus", "1", "2"]);
		assert_eq!(diagnostics[2].line, 5);
		assert_eq!(project.libraries.len(), 1);
		let z = registry.libraries.get("z").unwrap();
		assert_eq!(registry.libraries[z].object.sources, vec!["inflate"]);
	}

	#[test]
	fn multi_token_flags_are_appended_in_order() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "_m", "project p\nccflags -O2 -g\nccflags -Wall\nldflags -pthread\n");
		let (_, project, _) = load(dir.path()).unwrap();
		assert_eq!(project.ccflags, vec!["-O2", "-g", "-Wall"]);
		assert_eq!(project.ldflags, vec!["-pthread"]);
	}

	#[test]
	fn unsupported_capability_is_fatal_and_located() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "_m", "project p\nbin b\n\nurl https://example.com/b.git 1234\nadd src main\n");
		let err = load(dir.path()).unwrap_err();
		match err {
			Error::Unsupported { unsupported, file, line, directive } => {
				assert_eq!(unsupported.capability, Capability::Url);
				assert_eq!(unsupported.target, "binary");
				assert_eq!(file, "_m");
				assert_eq!(line, 4);
				assert_eq!(directive, "url https://example.com/b.git 1234");
			}
			other => panic!("unexpected error: {}", other),
		}
	}

	#[test]
	fn directive_before_project_is_fatal() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "_m", "lib z\n");
		let err = load(dir.path()).unwrap_err();
		assert!(matches!(err, Error::NoProject { line: 1, .. }));
	}

	#[test]
	fn load_continues_with_the_nested_cursor() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "_m", "project p\nload lib/z/_m\nadd src extra\n");
		write(dir.path(), "lib/z/_m", "lib z\nadd src inflate\n");
		let (registry, project, _) = load(dir.path()).unwrap();
		assert_eq!(project.source_path, "lib/z");
		let z = registry.libraries.get("z").unwrap();
		let obj = &registry.libraries[z].object;
		assert_eq!(obj.source_path, "lib/z");
		assert_eq!(obj.sources, vec!["inflate", "extra"]);
	}

	#[test]
	fn missing_load_target_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "_m", "project p\nload nowhere/_m\n");
		let err = load(dir.path()).unwrap_err();
		assert!(matches!(err, Error::Io { .. }));
	}

	#[test]
	fn subdirs_visits_files_in_path_order() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "_m", "project p\nsubdirs src\n");
		write(dir.path(), "src/b/_m", "lib b\n");
		write(dir.path(), "src/a/_m", "lib a\n");
		write(dir.path(), "src/a/nested/_m", "lib a_nested\n");
		write(dir.path(), "src/c/not_m", "lib never\n");
		let (registry, project, _) = load(dir.path()).unwrap();
		let names: Vec<&str> = project.libraries.iter().map(|&l| registry.library(l).name()).collect();
		assert_eq!(names, vec!["a", "a_nested", "b"]);
		assert_eq!(project.source_path, "src/b");
	}

	#[test]
	fn unreadable_subdirs_are_skipped() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "_m", "project p\nsubdirs nowhere\nsubdirs src\n");
		write(dir.path(), "src/a/_m", "lib a\n");
		let (registry, project, diagnostics) = load(dir.path()).unwrap();
		assert!(diagnostics.is_empty());
		let names: Vec<&str> = project.libraries.iter().map(|&l| registry.library(l).name()).collect();
		assert_eq!(names, vec!["a"]);
	}

	#[test]
	fn second_project_starts_over() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "_m", "project first\nlib a\nproject second\nbin b\n");
		let (_, project, _) = load(dir.path()).unwrap();
		assert_eq!(project.name, "second");
		assert!(project.libraries.is_empty());
		assert_eq!(project.binaries.len(), 1);
	}
}
