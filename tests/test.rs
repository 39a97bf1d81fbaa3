use core::cell::RefCell;
use std::{
	fs,
	path::Path, //
};

use mgen::{
	config::Config,
	error::{Capability, SyncError},
	external::Vcs,
	project::Project,
	registry::Registry,
	Diagnostic, Error, DIRECTIVE_FILE,
};

/// Records requests and claims every clone is already at its pin.
#[derive(Default)]
struct Offline {
	calls: RefCell<Vec<String>>,
}

impl Vcs for Offline {
	fn clone_repo(&self, url: &str, _dest: &Path) -> Result<(), SyncError> {
		self.calls.borrow_mut().push(format!("clone {}", url));
		Ok(())
	}
	fn has_revision(&self, _repo: &Path, _revision: &str) -> Result<bool, SyncError> {
		Ok(true)
	}
	fn fetch(&self, _repo: &Path, _remote: &str) -> Result<(), SyncError> {
		self.calls.borrow_mut().push("fetch".to_owned());
		Ok(())
	}
	fn resolve(&self, _repo: &Path, _revision: &str) -> Result<String, SyncError> {
		Ok("c0ffee".to_owned())
	}
	fn reset_hard(&self, _repo: &Path, _revision: &str) -> Result<(), SyncError> {
		self.calls.borrow_mut().push("reset".to_owned());
		Ok(())
	}
}

fn write(dir: &Path, file: &str, contents: &str) {
	let path = dir.join(file);
	fs::create_dir_all(path.parent().unwrap()).unwrap();
	fs::write(path, contents).unwrap();
}

fn parse(dir: &Path) -> Result<(Registry, Project, Vec<Diagnostic>), Error> {
	mgen::parse_project(dir, "build", DIRECTIVE_FILE)
}

fn render(dir: &Path) -> Result<String, Error> {
	let (registry, project, _) = parse(dir)?;
	mgen::generator::generate(&project, &registry, &Config::default(), &Offline::default())
}

#[test]
fn test_project_library_binary() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "_m", "project P\nlib L\nadd src a\nbin B\nadd src b\nadd lib L\n");
	let out = render(dir.path()).unwrap();

	assert!(out.contains("\n# lib: L\nbuild $builddir/obj/L/a.o: COMPILE.cc $topdir/a.cc\n"), "{}", out);
	assert!(out.contains("build libL.a: phony $builddir/lib/libL.a\n"));
	assert!(out.contains("build $builddir/lib/libL.a: ARCHIVE $builddir/obj/L/a.o\n"));
	assert!(out.contains("\n# bin: B\nbuild $builddir/obj/B/b.o: COMPILE.cc $topdir/b.cc\n"));
	assert!(out.contains("build B: phony $builddir/bin/B\n"));
	assert!(out.contains(
		"build $builddir/bin/B: LINK.cc $builddir/obj/B/b.o | $builddir/lib/libL.a\n -L = -L$builddir/lib\n -l = -lL\n"
	));
	// libraries first, then binaries
	assert!(out.find("# lib: L").unwrap() < out.find("# bin: B").unwrap());
}

#[test]
fn test_generate_writes_build_file() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "_m", "project P\nbin B\nadd src main\n");
	let (registry, project, _) = parse(dir.path()).unwrap();
	let build_file = dir.path().join("build.ninja");
	mgen::generate_project(&project, &registry, &Config::default(), &Offline::default(), &build_file).unwrap();
	let text = fs::read_to_string(&build_file).unwrap();
	assert!(text.starts_with("# Generated"));
	assert!(text.ends_with("build $builddir/bin/B: LINK.cc $builddir/obj/B/main.o\n"));
}

#[test]
fn test_unknown_extension() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "_m", "project P\nbin B\next .xyz\nadd src main\n");
	let err = render(dir.path()).unwrap_err();
	assert_eq!(err.to_string(), "Unknown extension: .xyz");
}

#[test]
fn test_header_only_library() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "_m", "project P\nlib H\nincs include/h\nbin B\nadd src b\nadd lib H\n");
	let out = render(dir.path()).unwrap();
	assert!(!out.contains("# lib: H"));
	assert!(!out.contains("libH.a"));
	assert!(out.contains("build $builddir/obj/B/b.o: COMPILE.cc $topdir/b.cc\n -I = -I$topdir/include/h\n"));
	assert!(out.contains("build $builddir/bin/B: LINK.cc $builddir/obj/B/b.o\n"));
	assert!(!out.contains(" -l = "));
}

#[test]
fn test_template_instances_are_shared() {
	let dir = tempfile::tempdir().unwrap();
	write(
		dir.path(),
		"_m",
		"project P
lib boost boost_%
incs /opt/boost/include
libs /opt/boost/lib
bin one
add src one
add lib boost system
bin two
add src two
add lib boost system
add lib boost thread
",
	);
	let (registry, project, _) = parse(dir.path()).unwrap();
	assert_eq!(registry.libraries.len(), 2);
	let one = &registry.binaries[project.binaries[0]].object;
	let two = &registry.binaries[project.binaries[1]].object;
	assert_eq!(one.libraries[0], two.libraries[0]);
	// only the template itself is a project member
	assert_eq!(project.libraries.len(), 1);

	let out = mgen::generator::generate(&project, &registry, &Config::default(), &Offline::default()).unwrap();
	assert!(out.contains(" -L = -L/opt/boost/lib\n -l = -lboost_system -lboost_thread\n"), "{}", out);
	assert!(!out.contains("libboost_system.a"));
}

#[test]
fn test_subdirs_and_source_roots() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "_m", "project P\nsubdirs lib\nbin app\nsrcs app\nadd src main\nadd lib zz\n");
	write(dir.path(), "lib/zz/_m", "lib zz\nincs lib/zz\nadd src zz\n");
	write(dir.path(), "lib/aa/_m", "lib aa\nadd src aa\n");
	let out = render(dir.path()).unwrap();

	let aa = out.find("# lib: aa").unwrap();
	let zz = out.find("# lib: zz").unwrap();
	assert!(aa < zz);
	assert!(out.contains("build $builddir/obj/aa/aa.o: COMPILE.cc $topdir/lib/aa/aa.cc\n"));
	assert!(out.contains("build $builddir/obj/zz/zz.o: COMPILE.cc $topdir/lib/zz/zz.cc\n -I = -I$topdir/lib/zz\n"));
	assert!(out.contains("build $builddir/obj/app/main.o: COMPILE.cc $topdir/app/main.cc\n -I = -I$topdir/lib/zz\n"));
}

#[test]
fn test_unsupported_capability_aborts() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "_m", "project P\nbin B\nurl https://example.com/b.git 0123abcd\n");
	match parse(dir.path()) {
		Err(Error::Unsupported { unsupported, line, .. }) => {
			assert_eq!(unsupported.capability, Capability::Url);
			assert_eq!(line, 3);
		}
		Err(e) => panic!("unexpected error: {}", e),
		Ok(_) => panic!("url on a binary was accepted"),
	}
}

#[test]
fn test_malformed_directive_is_not_fatal() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "_m", "project P\nlib L extra tokens\nfrobnicate\nlib L\nadd src a\n");
	let (_, project, diagnostics) = parse(dir.path()).unwrap();
	assert_eq!(diagnostics.len(), 2);
	assert_eq!(diagnostics[0].line, 2);
	assert_eq!(diagnostics[1].tokens, vec!["frobnicate"]);
	assert_eq!(project.libraries.len(), 1);
}

#[test]
fn test_empty_file_has_no_project() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "_m", "# nothing here\n");
	assert!(matches!(parse(dir.path()), Err(Error::EmptyProject(_))));
}

#[test]
fn test_pinned_library_is_synced() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "_m", "project P\nlib zlib\nurl https://example.com/zlib.git v1.3\nincs .externals/zlib\n");
	let (registry, project, _) = parse(dir.path()).unwrap();
	let vcs = Offline::default();
	let config = Config::default();
	let out = mgen::generator::generate(&project, &registry, &config, &vcs).unwrap();
	assert_eq!(*vcs.calls.borrow(), vec!["clone https://example.com/zlib.git"]);
	assert!(!out.contains("# lib: zlib"));
}

#[test]
fn test_target_flags_replace_project_flags() {
	let dir = tempfile::tempdir().unwrap();
	write(dir.path(), "_m", "project P\nccflags -O2\nlib L\nccflags -O0\nadd src a\nbin B\nadd src b\n");
	let out = render(dir.path()).unwrap();
	assert!(out.contains("\nccflags = -O2\n"), "{}", out);
	assert!(out.contains("build $builddir/obj/L/a.o: COMPILE.cc $topdir/a.cc\n ccflags = -O0\n"));
	assert!(!out.contains("$ccflags"));
	// no binding, so the project value applies
	assert!(out.contains("build $builddir/obj/B/b.o: COMPILE.cc $topdir/b.cc\n"));
	assert!(!out.contains("build $builddir/obj/B/b.o: COMPILE.cc $topdir/b.cc\n ccflags"));
}
