use crate::{
	link_type::LibRef, //
	project::Project,
};

/// State shared by libraries and binaries.
#[derive(Debug, Clone)]
pub struct Object {
	pub name: String,
	pub ccflags: Vec<String>,
	pub ldflags: Vec<String>,
	pub source_path: String,
	pub extension: Option<String>,
	pub defines: Vec<String>,
	pub include_path: Vec<String>,
	pub library_path: Vec<String>,
	pub sources: Vec<String>,
	pub libraries: Vec<LibRef>,
	/// Cleared by the first library search path or source.
	pub header_only: bool,
	/// Set once a source is attached.
	pub compiled: bool,
}

impl Object {
	pub fn new(name: &str) -> Self {
		Object {
			name: name.to_owned(),
			ccflags: Vec::new(),
			ldflags: Vec::new(),
			source_path: String::new(),
			extension: None,
			defines: Vec::new(),
			include_path: Vec::new(),
			library_path: Vec::new(),
			sources: Vec::new(),
			libraries: Vec::new(),
			header_only: true,
			compiled: false,
		}
	}

	pub fn ccflag(&mut self, flag: &str) {
		self.ccflags.push(flag.to_owned());
	}

	pub fn ldflag(&mut self, flag: &str) {
		self.ldflags.push(flag.to_owned());
	}

	pub fn incs(&mut self, include: &str) {
		self.include_path.push(include.to_owned());
	}

	pub fn libs(&mut self, path: &str) {
		self.library_path.push(path.to_owned());
		self.header_only = false;
	}

	pub fn srcs(&mut self, source_path: &str) {
		self.source_path = source_path.to_owned();
	}

	pub fn ext(&mut self, extension: &str) {
		self.extension = Some(extension.to_owned());
	}

	pub fn add_def(&mut self, def: &str) {
		self.defines.push(def.to_owned());
	}

	pub fn add_src(&mut self, source: &str) {
		self.sources.push(source.to_owned());
		self.header_only = false;
		self.compiled = true;
	}

	pub fn add_lib(&mut self, lib: LibRef) {
		self.libraries.push(lib);
	}

	/// Own extension override, else the project default.
	pub fn extension<'a>(&'a self, project: &'a Project) -> &'a str {
		match &self.extension {
			Some(ext) => ext,
			None => project.extension(),
		}
	}
}
