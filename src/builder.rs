//! Cursor objects that directives are applied to.
//!
//! Exactly one builder is current while a directive stream is processed. Each
//! builder accepts the full set of directive capabilities but implements only
//! those meaningful for its target; the rest return [`Unsupported`].
//! Switching to a new library, template or binary closes the current one,
//! which registers its entity with the project.

use crate::{
	binary::Binary,
	error::{Capability, Unsupported},
	library::{Library, Template},
	link_type::LibRef,
	object::Object,
	project::Project,
	registry::{Handle, Registry},
};

/// Library path every compiled library adds so consumers find its archive.
pub const BUILD_LIB_DIR: &str = "$builddir/lib";

pub type Outcome = Result<(), Unsupported>;

pub struct Workspace<'a> {
	pub registry: &'a mut Registry,
	pub project: &'a mut Project,
}

pub trait Builder {
	fn target(&self) -> &'static str;

	fn unsupported(&self, capability: Capability) -> Outcome {
		Err(Unsupported { capability, target: self.target() })
	}

	fn ccflag(&self, _ws: &mut Workspace, _flag: &str) -> Outcome {
		self.unsupported(Capability::Ccflags)
	}
	fn ldflag(&self, _ws: &mut Workspace, _flag: &str) -> Outcome {
		self.unsupported(Capability::Ldflags)
	}
	fn incs(&self, _ws: &mut Workspace, _path: &str) -> Outcome {
		self.unsupported(Capability::Incs)
	}
	fn libs(&self, _ws: &mut Workspace, _path: &str) -> Outcome {
		self.unsupported(Capability::Libs)
	}
	fn srcs(&self, _ws: &mut Workspace, _path: &str) -> Outcome {
		self.unsupported(Capability::Srcs)
	}
	fn ext(&self, _ws: &mut Workspace, _ext: &str) -> Outcome {
		self.unsupported(Capability::Ext)
	}
	fn url(&self, _ws: &mut Workspace, _url: &str, _revision: &str) -> Outcome {
		self.unsupported(Capability::Url)
	}
	fn add_src(&self, _ws: &mut Workspace, _src: &str) -> Outcome {
		self.unsupported(Capability::AddSrc)
	}
	fn add_def(&self, _ws: &mut Workspace, _def: &str) -> Outcome {
		self.unsupported(Capability::AddDef)
	}
	fn add_lib(&self, _ws: &mut Workspace, _name: &str) -> Outcome {
		self.unsupported(Capability::AddLib)
	}
	fn add_lib_from(&self, _ws: &mut Workspace, _parent: &str, _name: &str) -> Outcome {
		self.unsupported(Capability::AddLib)
	}

	/// Registers the entity with the project.
	fn close(&self, _ws: &mut Workspace) {}
}

fn find_dependency(registry: &Registry, name: &str) -> Option<LibRef> {
	let found = registry.resolve(name);
	if found.is_none() {
		log::warn!("add lib {}: no such library", name);
	}
	found
}

// A parent that is not a template makes this a no-op.
fn instantiate_dependency(registry: &mut Registry, parent: &str, name: &str) -> Option<LibRef> {
	match registry.templates.get(parent) {
		Some(t) => Some(LibRef::Library(registry.instantiate(t, name))),
		None => {
			log::debug!("add lib {} {}: {} is not a template", parent, name, parent);
			None
		}
	}
}

pub struct ProjectBuilder;

impl Builder for ProjectBuilder {
	fn target(&self) -> &'static str {
		"project"
	}
	fn ccflag(&self, ws: &mut Workspace, flag: &str) -> Outcome {
		ws.project.ccflag(flag);
		Ok(())
	}
	fn ldflag(&self, ws: &mut Workspace, flag: &str) -> Outcome {
		ws.project.ldflag(flag);
		Ok(())
	}
	fn incs(&self, ws: &mut Workspace, path: &str) -> Outcome {
		ws.project.incs(path);
		Ok(())
	}
	fn libs(&self, ws: &mut Workspace, path: &str) -> Outcome {
		ws.project.libs(path);
		Ok(())
	}
	fn srcs(&self, ws: &mut Workspace, path: &str) -> Outcome {
		ws.project.srcs(path);
		Ok(())
	}
	fn ext(&self, ws: &mut Workspace, ext: &str) -> Outcome {
		ws.project.ext(ext);
		Ok(())
	}
}

pub struct LibraryBuilder {
	library: Handle<Library>,
}

impl LibraryBuilder {
	pub fn open(ws: &mut Workspace, name: &str) -> Self {
		let library = ws.registry.libraries.create(name, Library::new);
		ws.registry.libraries[library].object.srcs(&ws.project.source_path);
		LibraryBuilder { library }
	}

	fn object<'a>(&self, ws: &'a mut Workspace) -> &'a mut Object {
		&mut ws.registry.libraries[self.library].object
	}
}

impl Builder for LibraryBuilder {
	fn target(&self) -> &'static str {
		"library"
	}
	fn ccflag(&self, ws: &mut Workspace, flag: &str) -> Outcome {
		self.object(ws).ccflag(flag);
		Ok(())
	}
	fn ldflag(&self, ws: &mut Workspace, flag: &str) -> Outcome {
		self.object(ws).ldflag(flag);
		Ok(())
	}
	fn incs(&self, ws: &mut Workspace, path: &str) -> Outcome {
		self.object(ws).incs(path);
		Ok(())
	}
	fn libs(&self, ws: &mut Workspace, path: &str) -> Outcome {
		self.object(ws).libs(path);
		Ok(())
	}
	fn srcs(&self, ws: &mut Workspace, path: &str) -> Outcome {
		self.object(ws).srcs(path);
		Ok(())
	}
	fn ext(&self, ws: &mut Workspace, ext: &str) -> Outcome {
		self.object(ws).ext(ext);
		Ok(())
	}
	fn url(&self, ws: &mut Workspace, url: &str, revision: &str) -> Outcome {
		ws.registry.libraries[self.library].url(url, revision);
		Ok(())
	}
	fn add_src(&self, ws: &mut Workspace, src: &str) -> Outcome {
		let obj = self.object(ws);
		obj.add_src(src);
		obj.libs(BUILD_LIB_DIR);
		Ok(())
	}
	fn add_def(&self, ws: &mut Workspace, def: &str) -> Outcome {
		self.object(ws).add_def(def);
		Ok(())
	}
	fn add_lib(&self, ws: &mut Workspace, name: &str) -> Outcome {
		if let Some(dep) = find_dependency(ws.registry, name) {
			self.object(ws).add_lib(dep);
		}
		Ok(())
	}
	fn add_lib_from(&self, ws: &mut Workspace, parent: &str, name: &str) -> Outcome {
		if let Some(dep) = instantiate_dependency(ws.registry, parent, name) {
			self.object(ws).add_lib(dep);
		}
		Ok(())
	}
	fn close(&self, ws: &mut Workspace) {
		ws.project.add_library(LibRef::Library(self.library));
	}
}

pub struct TemplateBuilder {
	template: Handle<Template>,
}

impl TemplateBuilder {
	pub fn open(ws: &mut Workspace, name: &str, pattern: &str) -> Self {
		let template = ws.registry.templates.create(name, |n| Template::new(n, pattern));
		TemplateBuilder { template }
	}
}

impl Builder for TemplateBuilder {
	fn target(&self) -> &'static str {
		"template"
	}
	fn incs(&self, ws: &mut Workspace, path: &str) -> Outcome {
		ws.registry.templates[self.template].library.object.incs(path);
		Ok(())
	}
	fn libs(&self, ws: &mut Workspace, path: &str) -> Outcome {
		ws.registry.templates[self.template].libs(path);
		Ok(())
	}
	fn srcs(&self, ws: &mut Workspace, path: &str) -> Outcome {
		ws.registry.templates[self.template].library.object.srcs(path);
		Ok(())
	}
	fn close(&self, ws: &mut Workspace) {
		ws.project.add_library(LibRef::Template(self.template));
	}
}

pub struct BinaryBuilder {
	binary: Handle<Binary>,
}

impl BinaryBuilder {
	pub fn open(ws: &mut Workspace, name: &str) -> Self {
		let binary = ws.registry.binaries.create(name, Binary::new);
		ws.registry.binaries[binary].object.srcs(&ws.project.source_path);
		BinaryBuilder { binary }
	}

	fn object<'a>(&self, ws: &'a mut Workspace) -> &'a mut Object {
		&mut ws.registry.binaries[self.binary].object
	}
}

impl Builder for BinaryBuilder {
	fn target(&self) -> &'static str {
		"binary"
	}
	fn ccflag(&self, ws: &mut Workspace, flag: &str) -> Outcome {
		self.object(ws).ccflag(flag);
		Ok(())
	}
	fn ldflag(&self, ws: &mut Workspace, flag: &str) -> Outcome {
		self.object(ws).ldflag(flag);
		Ok(())
	}
	fn incs(&self, ws: &mut Workspace, path: &str) -> Outcome {
		self.object(ws).incs(path);
		Ok(())
	}
	fn libs(&self, ws: &mut Workspace, path: &str) -> Outcome {
		self.object(ws).libs(path);
		Ok(())
	}
	fn srcs(&self, ws: &mut Workspace, path: &str) -> Outcome {
		self.object(ws).srcs(path);
		Ok(())
	}
	fn ext(&self, ws: &mut Workspace, ext: &str) -> Outcome {
		self.object(ws).ext(ext);
		Ok(())
	}
	fn add_src(&self, ws: &mut Workspace, src: &str) -> Outcome {
		self.object(ws).add_src(src);
		Ok(())
	}
	fn add_def(&self, ws: &mut Workspace, def: &str) -> Outcome {
		self.object(ws).add_def(def);
		Ok(())
	}
	fn add_lib(&self, ws: &mut Workspace, name: &str) -> Outcome {
		if let Some(dep) = find_dependency(ws.registry, name) {
			self.object(ws).add_lib(dep);
		}
		Ok(())
	}
	fn add_lib_from(&self, ws: &mut Workspace, parent: &str, name: &str) -> Outcome {
		if let Some(dep) = instantiate_dependency(ws.registry, parent, name) {
			self.object(ws).add_lib(dep);
		}
		Ok(())
	}
	fn close(&self, ws: &mut Workspace) {
		ws.project.add_binary(self.binary);
	}
}

pub enum Cursor {
	Project(ProjectBuilder),
	Library(LibraryBuilder),
	Template(TemplateBuilder),
	Binary(BinaryBuilder),
}

impl Cursor {
	pub fn builder(&self) -> &dyn Builder {
		match self {
			Cursor::Project(b) => b,
			Cursor::Library(b) => b,
			Cursor::Template(b) => b,
			Cursor::Binary(b) => b,
		}
	}
}

/// The project under construction and the builder directives currently go to.
pub struct State {
	project: Project,
	cursor: Cursor,
}

impl State {
	pub fn new(project: Project) -> Self {
		State { project, cursor: Cursor::Project(ProjectBuilder) }
	}

	pub fn project(&self) -> &Project {
		&self.project
	}

	pub fn project_mut(&mut self) -> &mut Project {
		&mut self.project
	}

	/// Applies one capability of the current builder.
	pub fn apply(
		&mut self,
		registry: &mut Registry,
		f: impl FnOnce(&dyn Builder, &mut Workspace) -> Outcome,
	) -> Outcome {
		let mut ws = Workspace { registry, project: &mut self.project };
		f(self.cursor.builder(), &mut ws)
	}

	pub fn lib(&mut self, registry: &mut Registry, name: &str) {
		self.switch(registry, |ws| Cursor::Library(LibraryBuilder::open(ws, name)));
	}

	pub fn template(&mut self, registry: &mut Registry, name: &str, pattern: &str) {
		self.switch(registry, |ws| Cursor::Template(TemplateBuilder::open(ws, name, pattern)));
	}

	pub fn bin(&mut self, registry: &mut Registry, name: &str) {
		self.switch(registry, |ws| Cursor::Binary(BinaryBuilder::open(ws, name)));
	}

	/// Closes the current builder and hands back the project.
	pub fn finish(self, registry: &mut Registry) -> Project {
		let State { mut project, cursor } = self;
		let mut ws = Workspace { registry, project: &mut project };
		cursor.builder().close(&mut ws);
		project
	}

	fn switch(&mut self, registry: &mut Registry, open: impl FnOnce(&mut Workspace) -> Cursor) {
		let mut ws = Workspace { registry, project: &mut self.project };
		self.cursor.builder().close(&mut ws);
		self.cursor = open(&mut ws);
	}
}
