//! Codec resolution.
//!
//! A [`Registry`] maps each requested [`Shape`] to a [`Codec`] by asking an
//! ordered chain of [`Rule`]s. Codecs work on JSON values on one side and on
//! erased [`Node`]s on the other. The typed API of the crate converts nodes
//! to and from user types.
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::utils::short_type_name;
use crate::{
	bind, AnyHandle, Document, Error, ErrorObject, JsonApiObject, Link, LinkObject, Links, Meta,
	Relation, Resource, ResourceIdentifier,
};

mod cache;
mod document;
mod registry;
mod resource;
mod structural;

pub use cache::Cache;
pub use registry::Registry;
pub(crate) use registry::Kind;

/// Concrete resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KindId {
	pub type_id: TypeId,
	pub name: &'static str,
}

/// Requested shape of a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
	/// No value.
	Void,

	/// Top-level document with primary data of the given shape.
	Document(Box<Shape>),

	/// Primary data of a document.
	Data(Box<Shape>),

	/// Ordered collection.
	List(Box<Shape>),

	/// Any resource, dispatched on its type name.
	Resource,

	/// Resource of a registered Rust type.
	Kind(KindId),

	/// Resource decoded as a plain [`ResourceObject`](crate::ResourceObject).
	Object,

	Identifier,
	Links,
	Link,
	LinkObject,
	Meta,
	Relation,
	Errors,
	JsonApi,
}

impl Shape {
	pub fn kind<T: Resource>() -> Self {
		Self::Kind(KindId {
			type_id: TypeId::of::<T>(),
			name: short_type_name::<T>(),
		})
	}

	pub fn document(data: Shape) -> Self {
		Self::Document(Box::new(data))
	}

	pub fn list(element: Shape) -> Self {
		Self::List(Box::new(element))
	}
}

impl fmt::Display for Shape {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Void => write!(f, "()"),
			Self::Document(data) => write!(f, "Document<{data}>"),
			Self::Data(data) => write!(f, "Data<{data}>"),
			Self::List(element) => write!(f, "Vec<{element}>"),
			Self::Resource => write!(f, "dyn Resource"),
			Self::Kind(kind) => write!(f, "{}", kind.name),
			Self::Object => write!(f, "ResourceObject"),
			Self::Identifier => write!(f, "ResourceIdentifier"),
			Self::Links => write!(f, "Links"),
			Self::Link => write!(f, "Link"),
			Self::LinkObject => write!(f, "LinkObject"),
			Self::Meta => write!(f, "Meta"),
			Self::Relation => write!(f, "Relation"),
			Self::Errors => write!(f, "Vec<ErrorObject>"),
			Self::JsonApi => write!(f, "JsonApiObject"),
		}
	}
}

/// Decoded value, before conversion into a user type.
#[derive(Debug, Clone)]
pub enum Node {
	Null,
	Resource(AnyHandle),
	Identifier(ResourceIdentifier),
	List(Vec<Node>),
	Links(Links),
	Link(Link),
	LinkObject(LinkObject),
	Meta(Meta),
	Relation(Relation),
	Errors(Vec<ErrorObject>),
	JsonApi(JsonApiObject),
	Document(Box<Document<Node>>),
}

impl Node {
	pub fn describe(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Resource(_) => "resource",
			Self::Identifier(_) => "resource identifier",
			Self::List(_) => "list",
			Self::Links(_) => "links",
			Self::Link(_) => "link",
			Self::LinkObject(_) => "link object",
			Self::Meta(_) => "meta",
			Self::Relation(_) => "relationship",
			Self::Errors(_) => "errors",
			Self::JsonApi(_) => "jsonapi object",
			Self::Document(_) => "document",
		}
	}

	pub(crate) fn unexpected(&self, expected: &str) -> Error {
		Error::Format(format!("expected {expected}, found {}", self.describe()))
	}
}

/// Resources decoded so far in a document.
#[derive(Default)]
pub struct Context {
	resources: Vec<bind::Entry>,
}

impl Context {
	pub(crate) fn push(&mut self, entry: bind::Entry) {
		self.resources.push(entry)
	}

	pub(crate) fn into_resources(self) -> Vec<bind::Entry> {
		self.resources
	}
}

pub trait Codec: Send + Sync {
	fn decode(&self, value: Value, context: &mut Context) -> Result<Node, Error>;

	fn encode(&self, node: &Node) -> Result<Value, Error>;
}

/// Position of a rule in the resolution chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor(pub(crate) usize);

impl Cursor {
	pub fn next(self) -> Self {
		Self(self.0 + 1)
	}
}

/// Resolution rule.
///
/// Returns `Ok(None)` for shapes the rule does not handle. A rule may request
/// codecs for other shapes from the registry, or the next applicable codec
/// for its own shape with [`Registry::next_codec`].
pub trait Rule: Send + Sync {
	fn resolve(
		&self,
		shape: &Shape,
		registry: &Registry,
		cursor: Cursor,
	) -> Result<Option<Arc<dyn Codec>>, Error>;
}

pub(crate) fn expect_object(
	value: Value,
	what: &str,
) -> Result<serde_json::Map<String, Value>, Error> {
	match value {
		Value::Object(members) => Ok(members),
		other => Err(Error::Format(format!(
			"{what} MUST be a JSON object, found `{other}`"
		))),
	}
}
