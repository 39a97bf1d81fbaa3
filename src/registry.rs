use core::{
	fmt,
	hash,
	marker::PhantomData,
	ops::{Index, IndexMut},
};
use std::collections::HashMap;

use crate::{
	binary::Binary, //
	library::{Library, Template},
	link_type::LibRef,
};

/// Stable, non-owning reference to an entry of a [`Store`].
pub struct Handle<T> {
	index: usize,
	marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
	fn new(index: usize) -> Self {
		Handle { index, marker: PhantomData }
	}
}

impl<T> Clone for Handle<T> {
	fn clone(&self) -> Self {
		*self
	}
}
impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
	fn eq(&self, other: &Self) -> bool {
		self.index == other.index
	}
}
impl<T> Eq for Handle<T> {}

impl<T> hash::Hash for Handle<T> {
	fn hash<H: hash::Hasher>(&self, state: &mut H) {
		self.index.hash(state);
	}
}

impl<T> fmt::Debug for Handle<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Handle({})", self.index)
	}
}

/// Name-keyed get-or-create arena. Entries are never removed.
#[derive(Debug)]
pub struct Store<T> {
	items: Vec<T>,
	names: HashMap<String, usize>,
}

impl<T> Default for Store<T> {
	fn default() -> Self {
		Store { items: Vec::new(), names: HashMap::new() }
	}
}

impl<T> Store<T> {
	/// Returns the entry for `name`, constructing it with `make` only if the
	/// name is new.
	pub fn create(&mut self, name: &str, make: impl FnOnce(&str) -> T) -> Handle<T> {
		if let Some(&index) = self.names.get(name) {
			return Handle::new(index);
		}
		let index = self.items.len();
		self.items.push(make(name));
		self.names.insert(name.to_owned(), index);
		Handle::new(index)
	}

	pub fn get(&self, name: &str) -> Option<Handle<T>> {
		self.names.get(name).map(|&index| Handle::new(index))
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

impl<T> Index<Handle<T>> for Store<T> {
	type Output = T;
	fn index(&self, handle: Handle<T>) -> &T {
		&self.items[handle.index]
	}
}

impl<T> IndexMut<Handle<T>> for Store<T> {
	fn index_mut(&mut self, handle: Handle<T>) -> &mut T {
		&mut self.items[handle.index]
	}
}

/// Owns every library, template and binary of one run.
#[derive(Debug, Default)]
pub struct Registry {
	pub libraries: Store<Library>,
	pub templates: Store<Template>,
	pub binaries: Store<Binary>,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn library(&self, link: LibRef) -> &Library {
		match link {
			LibRef::Library(h) => &self.libraries[h],
			LibRef::Template(h) => &self.templates[h].library,
		}
	}

	/// Looks a dependency up by name. Templates shadow plain libraries.
	pub fn resolve(&self, name: &str) -> Option<LibRef> {
		if let Some(t) = self.templates.get(name) {
			return Some(LibRef::Template(t));
		}
		self.libraries.get(name).map(LibRef::Library)
	}

	/// Concrete library for `name` substituted into a template's pattern. The
	/// template's defines and search paths are copied once, at creation.
	pub fn instantiate(&mut self, template: Handle<Template>, name: &str) -> Handle<Library> {
		let concrete = self.templates[template].library_name(name);
		if let Some(existing) = self.libraries.get(&concrete) {
			return existing;
		}
		let base = &self.templates[template].library.object;
		let defines = base.defines.clone();
		let include_path = base.include_path.clone();
		let library_path = base.library_path.clone();

		let handle = self.libraries.create(&concrete, Library::new);
		let lib = &mut self.libraries[handle];
		for def in &defines {
			lib.object.add_def(def);
		}
		for inc in &include_path {
			lib.object.incs(inc);
		}
		for path in &library_path {
			lib.object.libs(path);
		}
		lib.object.header_only = false;
		log::debug!("instantiated library {} from template", concrete);
		handle
	}
}
