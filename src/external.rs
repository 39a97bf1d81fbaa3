//! Keeps the local clone of a pinned external at exactly its pinned revision.
//!
//! Every command for an existing clone runs with the clone as its working
//! directory; the process working directory is never changed.

use std::{
	path::Path,
	process::{Command, Stdio},
};

use crate::{
	error::{SyncError, VcsOp},
	library::External,
};

pub const DEFAULT_REMOTE: &str = "origin";

pub trait Vcs {
	fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), SyncError>;
	/// Whether `revision` is known to the local clone. Cheap, offline.
	fn has_revision(&self, repo: &Path, revision: &str) -> Result<bool, SyncError>;
	fn fetch(&self, repo: &Path, remote: &str) -> Result<(), SyncError>;
	/// Commit id a revision (or `HEAD`) points at.
	fn resolve(&self, repo: &Path, revision: &str) -> Result<String, SyncError>;
	fn reset_hard(&self, repo: &Path, revision: &str) -> Result<(), SyncError>;
}

pub fn sync(vcs: &dyn Vcs, location: &Path, external: &External) -> Result<(), SyncError> {
	if !location.exists() {
		log::info!("Cloning {}", external.url());
		vcs.clone_repo(external.url(), location)?;
	}
	if !vcs.has_revision(location, external.revision())? {
		log::info!("Fetching {}", location.display());
		vcs.fetch(location, DEFAULT_REMOTE)?;
	}
	let head = vcs.resolve(location, "HEAD")?;
	let pinned = vcs.resolve(location, external.revision())?;
	if head != pinned {
		log::info!("Reset {}", location.display());
		vcs.reset_hard(location, external.revision())?;
	}
	Ok(())
}

/// [`Vcs`] backed by the `git` command line.
pub struct Git {
	program: String,
}

impl Git {
	pub fn new(program: &str) -> Self {
		Git { program: program.to_owned() }
	}

	fn command(&self, dir: Option<&Path>, args: &[&str]) -> Command {
		log::debug!("{} {}", self.program, args.join(" "));
		let mut cmd = Command::new(&self.program);
		cmd.args(args);
		if let Some(dir) = dir {
			cmd.current_dir(dir);
		}
		cmd
	}

	fn run(&self, op: VcsOp, repo: &Path, mut cmd: Command) -> Result<(), SyncError> {
		let status = match cmd.status() {
			Ok(x) => x,
			Err(e) => return Err(SyncError::Spawn { op, repo: repo.to_owned(), source: e }),
		};
		if !status.success() {
			return Err(SyncError::Failed { op, repo: repo.to_owned(), status });
		}
		Ok(())
	}
}

impl Vcs for Git {
	fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), SyncError> {
		let dest_str = dest.to_string_lossy();
		let cmd = self.command(None, &["clone", url, &*dest_str]);
		self.run(VcsOp::Clone, dest, cmd)
	}

	fn has_revision(&self, repo: &Path, revision: &str) -> Result<bool, SyncError> {
		let mut cmd = self.command(Some(repo), &["show", "--summary", revision]);
		cmd.stdout(Stdio::null()).stderr(Stdio::null());
		match cmd.status() {
			Ok(status) => Ok(status.success()),
			Err(e) => Err(SyncError::Spawn { op: VcsOp::Show, repo: repo.to_owned(), source: e }),
		}
	}

	fn fetch(&self, repo: &Path, remote: &str) -> Result<(), SyncError> {
		let cmd = self.command(Some(repo), &["fetch", remote]);
		self.run(VcsOp::Fetch, repo, cmd)
	}

	fn resolve(&self, repo: &Path, revision: &str) -> Result<String, SyncError> {
		let output = match self.command(Some(repo), &["log", "--pretty=format:%H", "-1", revision]).output() {
			Ok(x) => x,
			Err(e) => return Err(SyncError::Spawn { op: VcsOp::Resolve, repo: repo.to_owned(), source: e }),
		};
		if !output.status.success() {
			return Err(SyncError::Failed { op: VcsOp::Resolve, repo: repo.to_owned(), status: output.status });
		}
		Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
	}

	fn reset_hard(&self, repo: &Path, revision: &str) -> Result<(), SyncError> {
		let cmd = self.command(Some(repo), &["reset", "--hard", revision]);
		self.run(VcsOp::Reset, repo, cmd)
	}
}
