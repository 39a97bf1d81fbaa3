use crate::{
	library::{Library, Template},
	registry::Handle,
};

/// Non-owning reference to something a target can depend on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LibRef {
	Library(Handle<Library>),
	Template(Handle<Template>),
}
