//! Lineage class-model runtime
//!
//! A runtime class-construction utility: given a superclass and a
//! declarative [`ClassDef`], the builder synthesizes a new class with
//! single-inheritance member delegation, mixin composition, static and
//! inherited-static propagation, abstract-member enforcement, and explicit
//! superclass-method chaining. Features:
//!
//! - Single inheritance with subclasses; every class chains to a universal
//!   root, so externally defined classes can sit anywhere in a hierarchy
//! - Mixin classes, composed member-by-member at build time
//! - Statics that apply to one exact class, and inherited statics that
//!   propagate to every future subclass
//! - Abstract members ([`ClassDef::abstract_member`]) and abstract classes,
//!   with a build-time completeness check for concrete classes
//! - Superclass calls declared at the binding site
//!   ([`Method::chained`] / [`CallContext::call_super`]) instead of being
//!   sniffed out of method bodies
//! - Inheritance queries that see mixins too: [`is_instance_of`],
//!   [`ClassHandle::is_subclass_of`], [`ClassHandle::has_mixin`]
//! - A creation hook (`onClassCreate` static) observing each fully built
//!   class
//!
//! Class construction is serialized behind a global reentrant lock and is
//! expected to happen once per class at program start; built classes are
//! immutable apart from the raw `override` patch operation and live for
//! the rest of the process.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod annotations;
pub mod builder;
pub mod class;
pub mod def;
pub mod error;
pub mod instance;
pub mod merge;
pub mod registry;
pub mod value;

pub use builder::{build, create, create_named, extend, extend_named};
pub use class::{is_instance_of, is_subclass_of, universal_root, ClassHandle, MixinId};
pub use def::ClassDef;
pub use error::{ModelError, ModelResult};
pub use instance::{CallContext, Instance, Receiver};
pub use registry::ClassRegistry;
pub use value::{MemberMap, Method, MethodFn, Value};
