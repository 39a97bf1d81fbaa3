use core::fmt;
use std::{
	io,
	path::PathBuf, //
	process::ExitStatus,
};

use thiserror::Error;

/// A directive capability a builder may or may not implement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
	Ccflags,
	Ldflags,
	Incs,
	Libs,
	Srcs,
	Ext,
	Url,
	AddSrc,
	AddDef,
	AddLib,
}

impl fmt::Display for Capability {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Capability::Ccflags => "ccflags",
			Capability::Ldflags => "ldflags",
			Capability::Incs => "incs",
			Capability::Libs => "libs",
			Capability::Srcs => "srcs",
			Capability::Ext => "ext",
			Capability::Url => "url",
			Capability::AddSrc => "add_src",
			Capability::AddDef => "add_def",
			Capability::AddLib => "add_lib",
		};
		f.write_str(s)
	}
}

/// Returned by a builder asked for something its target kind cannot do.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{capability}: not available for {target}")]
pub struct Unsupported {
	pub capability: Capability,
	pub target: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VcsOp {
	Clone,
	Show,
	Fetch,
	Resolve,
	Reset,
}

impl fmt::Display for VcsOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			VcsOp::Clone => "clone",
			VcsOp::Show => "show",
			VcsOp::Fetch => "fetch",
			VcsOp::Resolve => "log",
			VcsOp::Reset => "reset",
		};
		f.write_str(s)
	}
}

#[derive(Debug, Error)]
pub enum SyncError {
	#[error("Error executing {op} for {}: {source}", repo.display())]
	Spawn {
		op: VcsOp,
		repo: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("{op} failed for {}: {status}", repo.display())]
	Failed { op: VcsOp, repo: PathBuf, status: ExitStatus },
}

#[derive(Debug, Error)]
pub enum Error {
	#[error("{file}:{line}: {unsupported} (directive: {directive})")]
	Unsupported { unsupported: Unsupported, file: String, line: usize, directive: String },
	#[error("{file}:{line}: no project defined before \"{directive}\"")]
	NoProject { file: String, line: usize, directive: String },
	#[error("no project directive found in {0}")]
	EmptyProject(String),
	#[error("Unknown extension: {0}")]
	UnknownExtension(String),
	#[error("Error accessing {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error(transparent)]
	Sync(#[from] SyncError),
	#[error("Error reading config {}: {message}", path.display())]
	Config { path: PathBuf, message: String },
}

impl Error {
	pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
		Error::Io { path: path.into(), source }
	}
}
