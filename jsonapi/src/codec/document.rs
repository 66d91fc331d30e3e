use std::sync::Arc;

use serde_json::{Map, Value};

use super::{expect_object, Codec, Context, Cursor, Node, Registry, Rule, Shape};
use crate::{AnyHandle, Binder, Document, Error, Included};

/// Top-level envelope.
pub struct DocumentRule;

impl Rule for DocumentRule {
	fn resolve(
		&self,
		shape: &Shape,
		registry: &Registry,
		_: Cursor,
	) -> Result<Option<Arc<dyn Codec>>, Error> {
		let Shape::Document(data) = shape else {
			return Ok(None);
		};

		Ok(Some(Arc::new(DocumentCodec {
			data: registry.codec(&Shape::Data(data.clone()))?,
			included: registry.codec(&Shape::Resource)?,
			errors: registry.codec(&Shape::Errors)?,
			links: registry.codec(&Shape::Links)?,
			meta: registry.codec(&Shape::Meta)?,
			jsonapi: registry.codec(&Shape::JsonApi)?,
		})))
	}
}

pub struct DocumentCodec {
	data: Arc<dyn Codec>,
	included: Arc<dyn Codec>,
	errors: Arc<dyn Codec>,
	links: Arc<dyn Codec>,
	meta: Arc<dyn Codec>,
	jsonapi: Arc<dyn Codec>,
}

/// Decodes an optional member with `codec`, `null` giving `None`.
fn decode_member<T>(
	codec: &dyn Codec,
	value: Option<Value>,
	context: &mut Context,
	what: &str,
	unwrap: fn(Node) -> Result<T, Node>,
) -> Result<Option<T>, Error> {
	match value {
		None => Ok(None),
		Some(value) => match codec.decode(value, context)? {
			Node::Null => Ok(None),
			node => unwrap(node).map(Some).map_err(|node| node.unexpected(what)),
		},
	}
}

impl DocumentCodec {
	fn decode_included(
		&self,
		value: Option<Value>,
		context: &mut Context,
	) -> Result<Option<Vec<AnyHandle>>, Error> {
		let items = match value {
			None | Some(Value::Null) => return Ok(None),
			Some(Value::Array(items)) => items,
			Some(other) => {
				return Err(Error::Format(format!(
					"included MUST be an array, found `{other}`"
				)))
			}
		};

		let mut included = Vec::with_capacity(items.len());
		for item in items {
			match self.included.decode(item, context)? {
				Node::Resource(handle) => included.push(handle),
				Node::Null => (),
				other => return Err(other.unexpected("a resource")),
			}
		}

		Ok(Some(included))
	}

	fn emit(&self, document: &Document<Node>) -> Result<Value, Error> {
		let mut members = Map::new();

		if let Some(jsonapi) = &document.jsonapi {
			members.insert(
				"jsonapi".to_string(),
				self.jsonapi.encode(&Node::JsonApi(jsonapi.clone()))?,
			);
		}

		if let Some(meta) = &document.meta {
			members.insert("meta".to_string(), self.meta.encode(&Node::Meta(meta.clone()))?);
		}

		if let Some(links) = &document.links {
			members.insert("links".to_string(), self.links.encode(&Node::Links(links.clone()))?);
		}

		match &document.data {
			Some(data) => {
				members.insert("data".to_string(), self.data.encode(data)?);
			}
			None if document.errors.is_none() && document.meta.is_none() => {
				members.insert("data".to_string(), Value::Null);
			}
			None => (),
		}

		if document.included_policy != Included::Omit {
			if let Some(included) = &document.included {
				let items = included
					.iter()
					.map(|handle| self.included.encode(&Node::Resource(handle.clone())))
					.collect::<Result<Vec<_>, _>>()?;
				members.insert("included".to_string(), Value::Array(items));
			}
		}

		if let Some(errors) = &document.errors {
			members.insert(
				"errors".to_string(),
				self.errors.encode(&Node::Errors(errors.clone()))?,
			);
		}

		Ok(Value::Object(members))
	}
}

impl Codec for DocumentCodec {
	fn decode(&self, value: Value, _: &mut Context) -> Result<Node, Error> {
		let mut members = expect_object(value, "a JSON:API document")?;
		let has_data = members.contains_key("data");

		if has_data && members.contains_key("errors") {
			return Err(Error::Format(
				"the members data and errors MUST NOT coexist".to_string(),
			));
		}

		if !has_data && members.contains_key("included") {
			return Err(Error::Format(
				"included MUST NOT be present without data".to_string(),
			));
		}

		let mut context = Context::default();

		let data = match members.remove("data") {
			None => None,
			Some(value) => match self.data.decode(value, &mut context)? {
				Node::Null => None,
				node => Some(node),
			},
		};

		let included = self.decode_included(members.remove("included"), &mut context)?;

		let errors = decode_member(
			&*self.errors,
			members.remove("errors"),
			&mut context,
			"errors",
			|node| match node {
				Node::Errors(errors) => Ok(errors),
				other => Err(other),
			},
		)?;

		let links = decode_member(
			&*self.links,
			members.remove("links"),
			&mut context,
			"links",
			|node| match node {
				Node::Links(links) => Ok(links),
				other => Err(other),
			},
		)?;

		let meta = decode_member(
			&*self.meta,
			members.remove("meta"),
			&mut context,
			"meta",
			|node| match node {
				Node::Meta(meta) => Ok(meta),
				other => Err(other),
			},
		)?;

		let jsonapi = decode_member(
			&*self.jsonapi,
			members.remove("jsonapi"),
			&mut context,
			"jsonapi object",
			|node| match node {
				Node::JsonApi(jsonapi) => Ok(jsonapi),
				other => Err(other),
			},
		)?;

		if data.is_some() {
			Binder::new(context.into_resources()).bind()?;
		}

		Ok(Node::Document(Box::new(Document {
			data,
			included,
			errors,
			links,
			meta,
			jsonapi,
			included_policy: Included::default(),
		})))
	}

	fn encode(&self, node: &Node) -> Result<Value, Error> {
		let Node::Document(document) = node else {
			return Err(node.unexpected("a document"));
		};

		if document.included_policy != Included::Processed {
			return self.emit(document);
		}

		// A failed unbind leaves the graph untouched.
		let mut document = (**document).clone();
		document.unbind()?;
		let value = self.emit(&document);

		// Restores the relationship members cleared by the unbinder.
		let rebound = document.bind();
		let value = value?;
		rebound?;
		Ok(value)
	}
}

/// Primary data: a single resource or identifier, or a collection of them.
pub struct DataRule;

impl Rule for DataRule {
	fn resolve(
		&self,
		shape: &Shape,
		registry: &Registry,
		_: Cursor,
	) -> Result<Option<Arc<dyn Codec>>, Error> {
		let Shape::Data(data) = shape else {
			return Ok(None);
		};

		let (element, many) = match &**data {
			Shape::List(element) => (&**element, true),
			element => (element, false),
		};

		match element {
			Shape::Void | Shape::Identifier | Shape::Object | Shape::Resource => (),
			Shape::Kind(id) if registry.is_registered(id.type_id) => (),
			other => {
				return Err(Error::NotResourceKind {
					shape: other.to_string(),
				})
			}
		}

		Ok(Some(Arc::new(DataCodec {
			element: registry.codec(element)?,
			many,
		})))
	}
}

pub struct DataCodec {
	element: Arc<dyn Codec>,
	many: bool,
}

impl Codec for DataCodec {
	fn decode(&self, value: Value, context: &mut Context) -> Result<Node, Error> {
		if !self.many {
			return self.element.decode(value, context);
		}

		match value {
			Value::Null => Ok(Node::Null),
			Value::Array(items) => {
				let mut nodes = Vec::with_capacity(items.len());
				for item in items {
					match self.element.decode(item, context)? {
						Node::Null => (),
						node => nodes.push(node),
					}
				}

				Ok(Node::List(nodes))
			}
			other => Err(Error::Format(format!(
				"collection data MUST be an array, found `{other}`"
			))),
		}
	}

	fn encode(&self, node: &Node) -> Result<Value, Error> {
		match (node, self.many) {
			(Node::Null, _) => Ok(Value::Null),
			(Node::List(items), true) => Ok(Value::Array(
				items
					.iter()
					.map(|item| self.element.encode(item))
					.collect::<Result<_, _>>()?,
			)),
			(Node::List(_), false) => Err(node.unexpected("a single resource")),
			(node, true) => Err(node.unexpected("a list")),
			(node, false) => self.element.encode(node),
		}
	}
}
