use crate::{
	binary::Binary, //
	link_type::LibRef,
	registry::Handle,
};

pub const DEFAULT_EXTENSION: &str = ".cc";

#[derive(Debug)]
pub struct Project {
	pub name: String,
	pub topdir: String,
	pub builddir: String,
	pub ccflags: Vec<String>,
	pub ldflags: Vec<String>,
	pub source_path: String,
	pub extension: Option<String>,
	pub include_path: Vec<String>,
	pub library_path: Vec<String>,
	/// Emission order.
	pub binaries: Vec<Handle<Binary>>,
	/// Emission order.
	pub libraries: Vec<LibRef>,
}

impl Project {
	pub fn new(name: &str, topdir: &str, builddir: &str) -> Self {
		Project {
			name: name.to_owned(),
			topdir: topdir.to_owned(),
			builddir: builddir.to_owned(),
			ccflags: Vec::new(),
			ldflags: Vec::new(),
			source_path: String::new(),
			extension: None,
			include_path: Vec::new(),
			library_path: Vec::new(),
			binaries: Vec::new(),
			libraries: Vec::new(),
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
	}

	pub fn srcs(&mut self, source_path: &str) {
		self.source_path = source_path.to_owned();
	}

	pub fn ext(&mut self, extension: &str) {
		self.extension = Some(extension.to_owned());
	}

	pub fn extension(&self) -> &str {
		self.extension.as_deref().unwrap_or(DEFAULT_EXTENSION)
	}

	// Re-opening an entity registers it once.
	pub fn add_library(&mut self, lib: LibRef) {
		if !self.libraries.contains(&lib) {
			self.libraries.push(lib);
		}
	}

	pub fn add_binary(&mut self, bin: Handle<Binary>) {
		if !self.binaries.contains(&bin) {
			self.binaries.push(bin);
		}
	}
}
