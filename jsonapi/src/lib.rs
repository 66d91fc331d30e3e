//! JSON:API 1.1 documents bound to typed Rust resources.
//!
//! Resources are plain Rust types implementing [`Resource`], usually through
//! `#[derive(Resource)]`, and [`serde`] for their attributes. A [`JsonApi`]
//! instance knows the registered resource types and converts documents
//! between their JSON form and a [`Document`] whose resources reference each
//! other through [`Handle`]s.
//!
//! ```
//! # #[cfg(feature = "derive")] {
//! use jsonapi::{Document, Handle, JsonApi, Relationships, Resource};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize, Resource)]
//! #[jsonapi(type = "people")]
//! struct Person {
//! 	#[serde(skip)]
//! 	#[jsonapi(id)]
//! 	id: Option<String>,
//!
//! 	name: String,
//! }
//!
//! #[derive(Default, Serialize, Deserialize, Resource)]
//! #[jsonapi(type = "articles")]
//! struct Article {
//! 	#[serde(skip)]
//! 	#[jsonapi(id)]
//! 	id: Option<String>,
//!
//! 	#[serde(skip)]
//! 	#[jsonapi(relationships)]
//! 	relationships: Option<Relationships>,
//!
//! 	title: String,
//!
//! 	#[serde(skip)]
//! 	#[jsonapi(to_one = "author")]
//! 	author: Option<Handle<Person>>,
//! }
//!
//! let api = JsonApi::builder()
//! 	.register::<Article>()
//! 	.register::<Person>()
//! 	.build()
//! 	.unwrap();
//!
//! let document: Document<Handle<Article>> = api
//! 	.decode(
//! 		r#"{
//! 			"data": {
//! 				"type": "articles",
//! 				"id": "1",
//! 				"attributes": { "title": "Hello" },
//! 				"relationships": { "author": { "data": { "type": "people", "id": "9" } } }
//! 			},
//! 			"included": [{ "type": "people", "id": "9", "attributes": { "name": "Ann" } }]
//! 		}"#,
//! 	)
//! 	.unwrap();
//!
//! let article = document.into_data().unwrap();
//! let author = article.read().author.clone().unwrap();
//! assert_eq!(author.read().name, "Ann");
//! # }
//! ```
use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

extern crate self as jsonapi;

#[cfg(feature = "derive")]
pub use jsonapi_derive::Resource;

mod bind;
pub mod codec;
mod document;
mod error;
mod errors;
mod handle;
mod identifier;
mod links;
#[doc(hidden)]
pub mod member;
mod meta;
mod object;
mod relation;
mod resource;
mod unbind;
mod utils;

pub use bind::Binder;
pub use codec::{Codec, Context, Node, Registry, Shape};
pub use document::*;
pub use error::{Error, ErrorKind};
pub use errors::{ErrorObject, ErrorObjectBuilder, Errors, Source};
pub use handle::{AnyHandle, Handle, Related};
pub use identifier::ResourceIdentifier;
pub use links::{Link, LinkObject, Links};
pub use meta::Meta;
pub use object::{Parts, ResourceObject};
pub use relation::{Cardinality, Relation, Relationships};
pub use resource::*;
pub use unbind::Unbinder;

use codec::Kind;

/// Registry options.
///
/// Can be embedded in an application configuration file; missing fields
/// take their default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
	/// Decode resources of unregistered types as [`ResourceObject`]s instead
	/// of failing.
	pub allow_unregistered_types: bool,

	/// Check the wire type of resources against the type name declared by
	/// their Rust type.
	pub strict_types: bool,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			allow_unregistered_types: false,
			strict_types: true,
		}
	}
}

/// JSON:API codec for a set of registered resource types.
#[derive(Debug, Clone)]
pub struct JsonApi {
	registry: Arc<Registry>,
}

impl JsonApi {
	pub fn builder() -> Builder {
		Builder::default()
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	/// Codec resolved for `shape`.
	pub fn codec(&self, shape: &Shape) -> Result<Arc<dyn Codec>, Error> {
		self.registry.codec(shape)
	}

	/// Decodes a document and binds its resources.
	pub fn decode<D: Data>(&self, input: &str) -> Result<Document<D>, Error> {
		self.from_value(serde_json::from_str(input)?)
	}

	pub fn from_slice<D: Data>(&self, input: &[u8]) -> Result<Document<D>, Error> {
		self.from_value(serde_json::from_slice(input)?)
	}

	pub fn from_value<D: Data>(&self, value: Value) -> Result<Document<D>, Error> {
		let codec = self.codec(&Shape::document(D::shape()))?;

		match codec.decode(value, &mut Context::default())? {
			Node::Document(document) => (*document).try_map(D::from_node),
			other => Err(other.unexpected("a document")),
		}
	}

	/// Decodes the primary data of a document.
	///
	/// Error documents are reported as [`Error::Errors`].
	pub fn decode_data<D: Data>(&self, input: &str) -> Result<Option<D>, Error> {
		self.decode::<D>(input)?.into_result()
	}

	pub fn encode<D: Data>(&self, document: &Document<D>) -> Result<String, Error> {
		Ok(serde_json::to_string(&self.to_value(document)?)?)
	}

	/// Encodes a document.
	///
	/// With the [`Included::Processed`] policy, the resource graph is unbound
	/// to compute the included resources, then bound again.
	pub fn to_value<D: Data>(&self, document: &Document<D>) -> Result<Value, Error> {
		let codec = self.codec(&Shape::document(D::shape()))?;
		codec.encode(&Node::Document(Box::new(document.map_ref(D::to_node))))
	}
}

/// [`JsonApi`] builder.
#[derive(Default)]
pub struct Builder {
	kinds: Vec<Kind>,
	options: Options,
}

impl Builder {
	/// Registers the resource type `T`.
	pub fn register<T: Resource + Serialize + DeserializeOwned>(mut self) -> Self {
		self.kinds.push(Kind::of::<T>());
		self
	}

	pub fn allow_unregistered_types(mut self, value: bool) -> Self {
		self.options.allow_unregistered_types = value;
		self
	}

	pub fn strict_types(mut self, value: bool) -> Self {
		self.options.strict_types = value;
		self
	}

	pub fn options(mut self, options: Options) -> Self {
		self.options = options;
		self
	}

	pub fn build(self) -> Result<JsonApi, Error> {
		Ok(JsonApi {
			registry: Arc::new(Registry::new(self.kinds, self.options)?),
		})
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn options_defaults() {
		let options: Options = serde_json::from_value(json!({ "allow_unregistered_types": true })).unwrap();
		assert!(options.allow_unregistered_types);
		assert!(options.strict_types);
	}

	#[test]
	fn plain_resource_objects_round_trip() {
		let api = JsonApi::builder().build().unwrap();
		let value = json!({
			"data": {
				"type": "things",
				"id": "1",
				"relationships": { "owner": { "data": { "type": "people", "id": "2" } } }
			}
		});

		let document: Document<Handle<ResourceObject>> = api.from_value(value.clone()).unwrap();
		assert_eq!(document.data().unwrap().read().id(), Some("1"));
		assert_eq!(api.to_value(&document).unwrap(), value);
	}

	#[test]
	fn unregistered_types_require_the_option() {
		let value = json!({ "data": { "type": "things", "id": "1" } });

		let strict = JsonApi::builder().build().unwrap();
		assert!(matches!(
			strict.from_value::<AnyHandle>(value.clone()),
			Err(Error::UnregisteredType { .. })
		));

		let lenient = JsonApi::builder().allow_unregistered_types(true).build().unwrap();
		let document = lenient.from_value::<AnyHandle>(value).unwrap();
		assert!(document.data().unwrap().is::<ResourceObject>());
	}
}
