use std::path::Path;

use crate::{
	binary::Binary,
	config::{Config, Toolchain},
	error::Error,
	external::{self, Vcs},
	library::Library,
	misc::UniqueVec,
	object::Object,
	project::Project,
	registry::Registry,
};

pub const COMPILE_C: &str = "COMPILE.c";
pub const COMPILE_CPP: &str = "COMPILE.cc";
pub const ARCHIVE: &str = "ARCHIVE";
pub const LINK: &str = "LINK.cc";
const PHONY: &str = "phony";

const PREAMBLE_HEAD: &str = "# Generated from _m directive files. Do not edit.\nninja_required_version = 1.3";

/// Compile rule for a source extension.
pub fn compile_rule(ext: &str) -> Result<&'static str, Error> {
	match ext {
		".c" => Ok(COMPILE_C),
		".cc" | ".cpp" | ".cxx" | ".C" => Ok(COMPILE_CPP),
		_ => Err(Error::UnknownExtension(ext.to_owned())),
	}
}

/// Escapes text spliced into the path list of a build line.
fn escape_path(s: &str) -> String {
	s.replace('$', "$$").replace(':', "$:").replace(' ', "$ ")
}

pub fn archive_path(name: &str) -> String {
	format!("$builddir/lib/lib{}.a", escape_path(name))
}

pub fn binary_path(name: &str) -> String {
	format!("$builddir/bin/{}", escape_path(name))
}

pub fn object_path(target: &str, src: &str) -> String {
	format!("$builddir/obj/{}/{}.o", escape_path(target), escape_path(src))
}

fn include_flag(path: &str) -> String {
	if path.starts_with('/') {
		format!("-I{}", path)
	} else {
		format!("-I$topdir/{}", path)
	}
}

fn transform_defines(defines: &[String]) -> Vec<String> {
	defines
		.iter()
		.map(|x| {
			let x = x.strip_prefix("-D").unwrap_or(x.as_str());
			let def = match x.split_once('=') {
				Some((def_name, def_value)) if def_value.contains('"') => {
					def_name.to_owned() + "=" + &def_value.replace('"', r#"\""#) // MY_DEFINE=\"abc\"
				}
				_ => x.to_owned(),
			};
			"-D".to_string() + &def
		})
		.collect()
}

struct NinjaRule {
	name: &'static str,
	command: Vec<&'static str>,
	depfile: Option<&'static str>,
	deps: Option<&'static str>,
	description: &'static str,
}

impl NinjaRule {
	fn as_string(&self) -> String {
		let mut ret = format!(
			r#"rule {}
  command = {}"#,
			self.name,
			self.command.join(" ")
		);
		if let Some(depfile) = self.depfile {
			ret += "\n  depfile = ";
			ret += depfile;
		}
		if let Some(deps) = self.deps {
			ret += "\n  deps = ";
			ret += deps;
		}
		ret += "\n  description = ";
		ret += self.description;
		ret += "\n";
		ret
	}
}

fn rules() -> [NinjaRule; 4] {
	[
		NinjaRule {
			name: COMPILE_C,
			command: vec!["$cc", "-MMD", "-MF", "$out.d", "$ccflags", "${-D}", "$incs", "${-I}", "-c", "$in", "-o", "$out"],
			depfile: Some("$out.d"),
			deps: Some("gcc"),
			description: "CC $out",
		},
		NinjaRule {
			name: COMPILE_CPP,
			command: vec!["$cxx", "-MMD", "-MF", "$out.d", "$ccflags", "${-D}", "$incs", "${-I}", "-c", "$in", "-o", "$out"],
			depfile: Some("$out.d"),
			deps: Some("gcc"),
			description: "CXX $out",
		},
		NinjaRule {
			name: ARCHIVE,
			command: vec!["rm", "-f", "$out", "&&", "$ar", "crs", "$out", "$in"],
			depfile: None,
			deps: None,
			description: "AR $out",
		},
		NinjaRule {
			name: LINK,
			command: vec!["$link", "-o", "$out", "$in", "$ldflags", "${-L}", "${-l}"],
			depfile: None,
			deps: None,
			description: "LINK $out",
		},
	]
}

/// Toolchain bindings followed by the fixed rules.
fn preamble_rules(toolchain: &Toolchain) -> String {
	let mut ret = String::new();
	ret += &format!("cc = {}\n", toolchain.c_compiler.join(" "));
	ret += &format!("cxx = {}\n", toolchain.cpp_compiler.join(" "));
	ret += &format!("ar = {}\n", toolchain.static_linker.join(" "));
	ret += &format!("link = {}\n", toolchain.exe_linker.join(" "));
	for rule in rules() {
		ret += "\n";
		ret += &rule.as_string();
	}
	ret
}

/// `prefix` followed by ` item` for every item, on one line. Nothing for an
/// empty list.
fn binding_line(prefix: &str, items: &[String]) -> String {
	if items.is_empty() {
		return String::new();
	}
	let mut ret = prefix.to_owned();
	for item in items {
		ret += " ";
		ret += item;
	}
	ret += "\n";
	ret
}

struct NinjaBuild {
	output: String,
	rule: &'static str,
	inputs: Vec<String>,
	implicit: Vec<String>,
	keyval_set: Vec<(&'static str, Vec<String>)>,
}

impl NinjaBuild {
	fn phony(alias: String, target: String) -> Self {
		NinjaBuild { output: alias, rule: PHONY, inputs: vec![target], implicit: Vec::new(), keyval_set: Vec::new() }
	}

	fn as_string(&self) -> String {
		let mut ret = format!("build {}: {}", self.output, self.rule);
		for input in &self.inputs {
			ret += " ";
			ret += input;
		}
		if !self.implicit.is_empty() {
			ret += " |";
			for dep in &self.implicit {
				ret += " ";
				ret += dep;
			}
		}
		ret += "\n";
		for (key, values) in &self.keyval_set {
			ret += &binding_line(&format!(" {} =", key), values);
		}
		ret
	}
}

pub struct Ninja<'a> {
	registry: &'a Registry,
	config: &'a Config,
	vcs: &'a dyn Vcs,
}

impl<'a> Ninja<'a> {
	pub fn new(registry: &'a Registry, config: &'a Config, vcs: &'a dyn Vcs) -> Self {
		Ninja { registry, config, vcs }
	}

	pub fn generate(&self, project: &Project) -> Result<String, Error> {
		let mut out = String::new();
		out += PREAMBLE_HEAD;
		out += "\n\n";
		out += &format!("topdir = {}\n", project.topdir);
		out += &format!("builddir = {}\n", project.builddir);
		out += &binding_line("ccflags =", &project.ccflags);
		out += &binding_line("ldflags =", &project.ldflags);
		let incs: Vec<String> = project.include_path.iter().map(|x| include_flag(x)).collect();
		out += &binding_line("incs =", &incs);
		out += "\n";
		out += &preamble_rules(&self.config.toolchain);
		out += "\n";

		for &link in &project.libraries {
			out += &self.library(project, self.registry.library(link))?;
		}
		for &bin in &project.binaries {
			out += &self.binary(project, &self.registry.binaries[bin])?;
		}
		Ok(out)
	}

	fn sync(&self, project: &Project, lib: &Library) -> Result<(), Error> {
		if let Some(ext) = &lib.external {
			let location = Path::new(&project.topdir).join(&self.config.externals).join(lib.name());
			external::sync(self.vcs, &location, ext)?;
		}
		Ok(())
	}

	/// Own includes plus those of each direct dependency.
	fn includes(&self, obj: &Object) -> UniqueVec {
		let mut includes = UniqueVec::new();
		includes.extend(&obj.include_path);
		for &dep in &obj.libraries {
			includes.extend(&self.registry.library(dep).object.include_path);
		}
		includes
	}

	fn compile_edges(&self, project: &Project, obj: &Object, includes: &UniqueVec) -> Result<Vec<NinjaBuild>, Error> {
		let mut defines = UniqueVec::new();
		defines.extend(&obj.defines);
		let defines = transform_defines(defines.as_slice());
		let includes: Vec<String> = includes.as_slice().iter().map(|x| include_flag(x)).collect();

		let ext = obj.extension(project);
		let mut src_root = obj.source_path.clone();
		if !src_root.is_empty() {
			src_root.push('/');
		}
		let mut edges = Vec::with_capacity(obj.sources.len());
		for src in &obj.sources {
			edges.push(NinjaBuild {
				output: object_path(&obj.name, src),
				rule: compile_rule(ext)?,
				inputs: vec![format!("$topdir/{}{}{}", escape_path(&src_root), escape_path(src), escape_path(ext))],
				implicit: Vec::new(),
				keyval_set: vec![
					("ccflags", obj.ccflags.clone()),
					("-D", defines.clone()),
					("-I", includes.clone()),
				],
			});
		}
		Ok(edges)
	}

	fn library(&self, project: &Project, lib: &Library) -> Result<String, Error> {
		self.sync(project, lib)?;
		let obj = &lib.object;
		if obj.sources.is_empty() {
			log::debug!("lib {}: no sources, nothing to build", obj.name);
			return Ok(String::new());
		}
		log::debug!("lib {}: {} sources", obj.name, obj.sources.len());

		let mut out = format!("\n# lib: {}\n", obj.name);
		for edge in self.compile_edges(project, obj, &self.includes(obj))? {
			out += &edge.as_string();
		}
		let archive = archive_path(&obj.name);
		out += &NinjaBuild::phony(format!("lib{}.a", escape_path(&obj.name)), archive.clone()).as_string();
		out += &NinjaBuild {
			output: archive,
			rule: ARCHIVE,
			inputs: obj.sources.iter().map(|src| object_path(&obj.name, src)).collect(),
			implicit: Vec::new(),
			keyval_set: Vec::new(),
		}
		.as_string();
		Ok(out)
	}

	fn binary(&self, project: &Project, bin: &Binary) -> Result<String, Error> {
		log::debug!("{}", bin);
		let obj = &bin.object;
		let mut link_libs = UniqueVec::new();
		let mut archives = UniqueVec::new();
		let mut search_path = UniqueVec::new();
		search_path.extend(&obj.library_path);
		for &dep in &obj.libraries {
			let dep = &self.registry.library(dep).object;
			if !dep.header_only {
				link_libs.push(&dep.name);
				if dep.compiled {
					archives.push(&archive_path(&dep.name));
				}
			}
			search_path.extend(&dep.library_path);
		}

		let mut out = format!("\n# bin: {}\n", obj.name);
		for edge in self.compile_edges(project, obj, &self.includes(obj))? {
			out += &edge.as_string();
		}
		let output = binary_path(&obj.name);
		out += &NinjaBuild::phony(escape_path(&obj.name), output.clone()).as_string();
		out += &NinjaBuild {
			output,
			rule: LINK,
			inputs: obj.sources.iter().map(|src| object_path(&obj.name, src)).collect(),
			implicit: archives.as_slice().to_vec(),
			keyval_set: vec![
				("ldflags", obj.ldflags.clone()),
				("-L", search_path.as_slice().iter().map(|x| format!("-L{}", x)).collect()),
				("-l", link_libs.as_slice().iter().map(|x| format!("-l{}", x)).collect()),
			],
		}
		.as_string();
		Ok(out)
	}
}
