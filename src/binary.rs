use core::fmt;

use crate::object::Object;

/// An executable. Nothing depends on a binary.
#[derive(Debug, Clone)]
pub struct Binary {
	pub object: Object,
}

impl Binary {
	pub fn new(name: &str) -> Self {
		Binary { object: Object::new(name) }
	}

	pub fn name(&self) -> &str {
		&self.object.name
	}
}

impl fmt::Display for Binary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let obj = &self.object;
		write!(
			f,
			r#"Binary{{
   name: {},
   sources: [{}],
   links: {},
   include_path: [{}],
   defines: [{}],
   ldflags: [{}],
}}"#,
			obj.name,
			obj.sources.join(", "),
			obj.libraries.len(),
			obj.include_path.join(", "),
			obj.defines.join(", "),
			obj.ldflags.join(", "),
		)
	}
}
