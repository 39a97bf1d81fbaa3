use crate::object::Object;

/// A pinned external repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct External {
	url: String,
	revision: String,
}

impl External {
	pub fn new(url: &str, revision: &str) -> Self {
		External { url: url.to_owned(), revision: revision.to_owned() }
	}
	pub fn url(&self) -> &str {
		&self.url
	}
	/// Commit hash or tag.
	pub fn revision(&self) -> &str {
		&self.revision
	}
}

#[derive(Debug, Clone)]
pub struct Library {
	pub object: Object,
	pub external: Option<External>,
}

impl Library {
	pub fn new(name: &str) -> Self {
		Library { object: Object::new(name), external: None }
	}

	pub fn name(&self) -> &str {
		&self.object.name
	}

	pub fn url(&mut self, url: &str, revision: &str) {
		self.external = Some(External::new(url, revision));
	}
}

/// A library-name generator: `%` in the pattern is replaced by the requested
/// name to produce a concrete library.
#[derive(Debug, Clone)]
pub struct Template {
	pub library: Library,
	pub pattern: String,
}

pub const PLACEHOLDER: char = '%';

impl Template {
	pub fn new(name: &str, pattern: &str) -> Self {
		Template { library: Library::new(name), pattern: pattern.to_owned() }
	}

	pub fn library_name(&self, name: &str) -> String {
		self.pattern.replace(PLACEHOLDER, name)
	}

	/// Search paths on a template do not make it a linkable library.
	pub fn libs(&mut self, path: &str) {
		self.library.object.library_path.push(path.to_owned());
	}
}

#[test]
fn test_template_library_name() {
	let t = Template::new("boost", "boost_%-mt");
	assert_eq!(t.library_name("system"), "boost_system-mt");

	let mut t = Template::new("qt", "Qt5%");
	t.libs("/opt/qt/lib");
	assert!(t.library.object.header_only);
	assert_eq!(t.library.object.library_path, vec!["/opt/qt/lib"]);
}
