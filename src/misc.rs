use std::{
	collections::HashSet, //
	path::Path,
};

/// A list that keeps the first occurrence of each item, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct UniqueVec {
	seen: HashSet<String>,
	items: Vec<String>,
}

impl UniqueVec {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, item: &str) {
		if self.seen.insert(item.to_owned()) {
			self.items.push(item.to_owned());
		}
	}

	pub fn extend<'a>(&mut self, items: impl IntoIterator<Item = &'a String>) {
		for item in items {
			self.push(item);
		}
	}

	pub fn as_slice(&self) -> &[String] {
		&self.items
	}
}

/// Directory of a directive file as written, with `/` separators. Empty for a
/// file at the top level.
pub(crate) fn parent_dir(file: &str) -> String {
	match Path::new(file).parent() {
		Some(parent) => parent.to_string_lossy().replace('\\', "/"),
		None => String::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unique_vec_keeps_first_seen_order() {
		let mut v = UniqueVec::new();
		for x in ["b", "a", "b", "c", "a", "d"] {
			v.push(x);
		}
		assert_eq!(v.as_slice(), &["b", "a", "c", "d"]);
	}

	#[test]
	fn unique_vec_extend_drops_repeats() {
		let mut v = UniqueVec::new();
		let first = vec!["-O2".to_owned(), "-g".to_owned()];
		let second = vec!["-g".to_owned(), "-Wall".to_owned(), "-O2".to_owned()];
		v.extend(&first);
		v.extend(&second);
		assert_eq!(v.as_slice(), &["-O2", "-g", "-Wall"]);
	}

	#[test]
	fn parent_dir_of_nested_and_top_level_files() {
		assert_eq!(parent_dir("src/foo/_m"), "src/foo");
		assert_eq!(parent_dir("_m"), "");
	}
}
