use serde::{Deserialize, Serialize};

use crate::codec::{Node, Shape};
use crate::utils::short_type_name;
use crate::{
	AnyHandle, Binder, Error, ErrorObject, Errors, Handle, Links, Meta, Resource,
	ResourceIdentifier, Unbinder,
};

/// Top-level JSON:API document.
///
/// `data` and `errors` are never both set, and `included` is only set along
/// with `data`.
#[derive(Debug, Clone)]
pub struct Document<D> {
	pub(crate) data: Option<D>,
	pub(crate) included: Option<Vec<AnyHandle>>,
	pub(crate) errors: Option<Vec<ErrorObject>>,
	pub(crate) links: Option<Links>,
	pub(crate) meta: Option<Meta>,
	pub(crate) jsonapi: Option<JsonApiObject>,
	pub(crate) included_policy: Included,
}

/// What the encoder writes in the `included` member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Included {
	/// Resources reachable from the primary data, computed by unbinding
	/// the resource graph.
	#[default]
	Processed,

	/// The included resources of the document, as they are.
	Declared,

	/// Nothing.
	Omit,
}

impl<D> Document<D> {
	pub fn new(data: D) -> Self {
		Self {
			data: Some(data),
			..Self::null()
		}
	}

	/// Document with `null` primary data.
	pub fn null() -> Self {
		Self {
			data: None,
			included: None,
			errors: None,
			links: None,
			meta: None,
			jsonapi: None,
			included_policy: Included::default(),
		}
	}

	pub fn from_errors(errors: Vec<ErrorObject>) -> Self {
		Self {
			errors: Some(errors),
			..Self::null()
		}
	}

	pub fn from_meta(meta: Meta) -> Self {
		Self {
			meta: Some(meta),
			..Self::null()
		}
	}

	pub fn builder() -> DocumentBuilder<D> {
		DocumentBuilder(Self::null())
	}

	pub fn data(&self) -> Option<&D> {
		self.data.as_ref()
	}

	pub fn data_mut(&mut self) -> Option<&mut D> {
		self.data.as_mut()
	}

	pub fn into_data(self) -> Option<D> {
		self.data
	}

	pub fn included(&self) -> Option<&[AnyHandle]> {
		self.included.as_deref()
	}

	pub fn errors(&self) -> Option<&[ErrorObject]> {
		self.errors.as_deref()
	}

	pub fn links(&self) -> Option<&Links> {
		self.links.as_ref()
	}

	pub fn meta(&self) -> Option<&Meta> {
		self.meta.as_ref()
	}

	pub fn jsonapi(&self) -> Option<&JsonApiObject> {
		self.jsonapi.as_ref()
	}

	pub fn included_policy(&self) -> Included {
		self.included_policy
	}

	pub fn set_included_policy(&mut self, policy: Included) {
		self.included_policy = policy
	}

	pub fn has_data(&self) -> bool {
		self.data.is_some()
	}

	pub fn has_errors(&self) -> bool {
		self.errors.is_some()
	}

	/// Included resources of type `T`.
	pub fn included_of<T: Resource>(&self) -> Vec<Handle<T>> {
		self.included
			.iter()
			.flatten()
			.filter_map(AnyHandle::downcast)
			.collect()
	}

	/// Primary data, or the errors of an error document.
	pub fn into_result(self) -> Result<Option<D>, Error> {
		match self.errors {
			Some(errors) => Err(Error::Errors(Errors(errors))),
			None => Ok(self.data),
		}
	}

	/// Primary data, failing on error documents and `null` data.
	pub fn require_data(self) -> Result<D, Error> {
		self.into_result()?.ok_or(Error::MissingData)
	}

	/// Primary data, or `default` when the document has none. Errors of an
	/// error document are still reported.
	pub fn data_or(self, default: D) -> Result<D, Error> {
		Ok(self.into_result()?.unwrap_or(default))
	}

	pub(crate) fn try_map<E>(self, f: impl FnOnce(D) -> Result<E, Error>) -> Result<Document<E>, Error> {
		Ok(Document {
			data: self.data.map(f).transpose()?,
			included: self.included,
			errors: self.errors,
			links: self.links,
			meta: self.meta,
			jsonapi: self.jsonapi,
			included_policy: self.included_policy,
		})
	}

	pub(crate) fn map_ref<E>(&self, f: impl FnOnce(&D) -> E) -> Document<E> {
		Document {
			data: self.data.as_ref().map(f),
			included: self.included.clone(),
			errors: self.errors.clone(),
			links: self.links.clone(),
			meta: self.meta.clone(),
			jsonapi: self.jsonapi.clone(),
			included_policy: self.included_policy,
		}
	}
}

impl<D: Primary> Document<D> {
	/// Binds the relationship members of every resource of the document to
	/// the resources of the document.
	pub fn bind(&self) -> Result<(), Error> {
		let Some(data) = &self.data else {
			return Ok(());
		};

		let resources = data
			.resources()
			.into_iter()
			.chain(self.included.iter().flatten().cloned());

		Binder::from_resources(resources)?.bind()
	}

	/// Flattens the relationship members of the resource graph into
	/// relationships, and the reachable resources into `included`.
	pub fn unbind(&mut self) -> Result<(), Error> {
		let Some(data) = &self.data else {
			self.included = None;
			return Ok(());
		};

		let included = self.included.clone().unwrap_or_default();
		self.included = Unbinder::new(data.resources(), included)?.unbind()?;
		Ok(())
	}
}

pub struct DocumentBuilder<D>(Document<D>);

impl<D> DocumentBuilder<D> {
	pub fn data(mut self, data: D) -> Self {
		self.0.data = Some(data);
		self
	}

	pub fn included(mut self, included: Vec<AnyHandle>) -> Self {
		self.0.included = Some(included);
		self
	}

	pub fn errors(mut self, errors: Vec<ErrorObject>) -> Self {
		self.0.errors = Some(errors);
		self
	}

	pub fn links(mut self, links: Links) -> Self {
		self.0.links = Some(links);
		self
	}

	pub fn meta(mut self, meta: Meta) -> Self {
		self.0.meta = Some(meta);
		self
	}

	pub fn jsonapi(mut self, jsonapi: JsonApiObject) -> Self {
		self.0.jsonapi = Some(jsonapi);
		self
	}

	pub fn included_policy(mut self, policy: Included) -> Self {
		self.0.included_policy = policy;
		self
	}

	pub fn build(self) -> Result<Document<D>, Error> {
		let document = self.0;

		if document.data.is_some() && document.errors.is_some() {
			return Err(Error::Format(
				"the members data and errors MUST NOT coexist".to_string(),
			));
		}

		if document.included.is_some() && document.data.is_none() {
			return Err(Error::Format(
				"included MUST NOT be present without data".to_string(),
			));
		}

		Ok(document)
	}
}

/// Information about the JSON:API implementation of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonApiObject {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ext: Option<Vec<String>>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub profile: Option<Vec<String>>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub meta: Option<Meta>,
}

impl JsonApiObject {
	pub fn version(version: impl Into<String>) -> Self {
		Self {
			version: Some(version.into()),
			..Default::default()
		}
	}
}

/// Values holding the primary resources of a document.
pub trait Primary {
	fn resources(&self) -> Vec<AnyHandle>;
}

/// Primary data type of a typed document.
pub trait Data: Primary + Sized {
	fn shape() -> Shape;

	fn from_node(node: Node) -> Result<Self, Error>;

	fn to_node(&self) -> Node;
}

impl Primary for Node {
	fn resources(&self) -> Vec<AnyHandle> {
		match self {
			Node::Resource(handle) => vec![handle.clone()],
			Node::List(items) => items.iter().flat_map(Primary::resources).collect(),
			_ => Vec::new(),
		}
	}
}

impl<T: Resource> Primary for Handle<T> {
	fn resources(&self) -> Vec<AnyHandle> {
		vec![self.to_any()]
	}
}

impl<T: Resource> Data for Handle<T> {
	fn shape() -> Shape {
		T::shape()
	}

	fn from_node(node: Node) -> Result<Self, Error> {
		match node {
			Node::Resource(handle) => handle.downcast().ok_or_else(|| Error::TypeMismatch {
				expected: short_type_name::<T>().to_string(),
				found: handle.rust_type().to_string(),
			}),
			other => Err(other.unexpected("a resource")),
		}
	}

	fn to_node(&self) -> Node {
		Node::Resource(self.to_any())
	}
}

impl Primary for AnyHandle {
	fn resources(&self) -> Vec<AnyHandle> {
		vec![self.clone()]
	}
}

impl Data for AnyHandle {
	fn shape() -> Shape {
		Shape::Resource
	}

	fn from_node(node: Node) -> Result<Self, Error> {
		match node {
			Node::Resource(handle) => Ok(handle),
			other => Err(other.unexpected("a resource")),
		}
	}

	fn to_node(&self) -> Node {
		Node::Resource(self.clone())
	}
}

impl Primary for ResourceIdentifier {
	fn resources(&self) -> Vec<AnyHandle> {
		Vec::new()
	}
}

impl Data for ResourceIdentifier {
	fn shape() -> Shape {
		Shape::Identifier
	}

	fn from_node(node: Node) -> Result<Self, Error> {
		match node {
			Node::Identifier(identifier) => Ok(identifier),
			other => Err(other.unexpected("a resource identifier")),
		}
	}

	fn to_node(&self) -> Node {
		Node::Identifier(self.clone())
	}
}

impl Primary for () {
	fn resources(&self) -> Vec<AnyHandle> {
		Vec::new()
	}
}

impl Data for () {
	fn shape() -> Shape {
		Shape::Void
	}

	fn from_node(_: Node) -> Result<Self, Error> {
		Ok(())
	}

	fn to_node(&self) -> Node {
		Node::Null
	}
}

impl<D: Primary> Primary for Vec<D> {
	fn resources(&self) -> Vec<AnyHandle> {
		self.iter().flat_map(Primary::resources).collect()
	}
}

impl<D: Data> Data for Vec<D> {
	fn shape() -> Shape {
		Shape::list(D::shape())
	}

	fn from_node(node: Node) -> Result<Self, Error> {
		match node {
			Node::List(items) => items.into_iter().map(D::from_node).collect(),
			other => Err(other.unexpected("a list")),
		}
	}

	fn to_node(&self) -> Node {
		Node::List(self.iter().map(D::to_node).collect())
	}
}
