mod ninja;

use std::{
	fs,
	path::Path, //
};

use uuid::Uuid;

use crate::{
	config::Config,
	error::Error,
	external::Vcs,
	project::Project,
	registry::Registry,
};

pub use ninja::{compile_rule, Ninja};

/// Renders the whole build description for `project`. Pinned externals are
/// synchronized on the way.
pub fn generate(project: &Project, registry: &Registry, config: &Config, vcs: &dyn Vcs) -> Result<String, Error> {
	Ninja::new(registry, config, vcs).generate(project)
}

/// Replaces `path` with `contents` through a uniquely named sibling, so a
/// reader never sees a partial file.
pub fn write_build_file(path: &Path, contents: &str) -> Result<(), Error> {
	let file_name = match path.file_name() {
		Some(x) => x.to_string_lossy().into_owned(),
		None => return Err(Error::io(path, std::io::Error::other("not a file path"))),
	};
	let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));
	if let Err(e) = fs::write(&tmp, contents) {
		let _ = fs::remove_file(&tmp);
		return Err(Error::io(&tmp, e));
	}
	if let Err(e) = fs::rename(&tmp, path) {
		let _ = fs::remove_file(&tmp);
		return Err(Error::io(path, e));
	}
	log::info!("wrote {}", path.display());
	Ok(())
}
