use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::{expect_object, Codec, Context, Cursor, Kind, Node, Registry, Rule, Shape};
use crate::bind::Entry;
use crate::{member, AnyHandle, Error, ResourceObject};

/// Polymorphic resource codec: dispatches on the `type` member.
pub struct ResourceBaseRule;

impl Rule for ResourceBaseRule {
	fn resolve(
		&self,
		shape: &Shape,
		registry: &Registry,
		_: Cursor,
	) -> Result<Option<Arc<dyn Codec>>, Error> {
		if *shape != Shape::Resource {
			return Ok(None);
		}

		let mut by_name = HashMap::new();
		let mut by_type_id = HashMap::new();

		for kind in registry.kinds() {
			let codec = registry.codec(&Shape::Kind(kind.id))?;
			by_name.insert(kind.type_name()?, codec.clone());
			by_type_id.insert(kind.id.type_id, codec);
		}

		let object = registry.codec(&Shape::Object)?;
		by_type_id.insert(TypeId::of::<ResourceObject>(), object.clone());

		Ok(Some(Arc::new(PolymorphicCodec {
			by_name,
			by_type_id,
			fallback: registry.options().allow_unregistered_types.then_some(object),
		})))
	}
}

pub struct PolymorphicCodec {
	by_name: HashMap<&'static str, Arc<dyn Codec>>,
	by_type_id: HashMap<TypeId, Arc<dyn Codec>>,
	fallback: Option<Arc<dyn Codec>>,
}

impl Codec for PolymorphicCodec {
	fn decode(&self, value: Value, context: &mut Context) -> Result<Node, Error> {
		let type_name = match &value {
			Value::Null => return Ok(Node::Null),
			Value::Object(members) => match members.get("type") {
				Some(Value::String(name)) => name.as_str(),
				_ => {
					return Err(Error::Format(
						"a resource object MUST contain a `type` string member".to_string(),
					))
				}
			},
			other => {
				return Err(Error::Format(format!(
					"a resource object MUST be a JSON object, found `{other}`"
				)))
			}
		};

		let codec = match self.by_name.get(type_name) {
			Some(codec) => codec,
			None => self.fallback.as_ref().ok_or_else(|| Error::UnregisteredType {
				type_name: type_name.to_string(),
			})?,
		};

		codec.decode(value, context)
	}

	fn encode(&self, node: &Node) -> Result<Value, Error> {
		match node {
			Node::Null => Ok(Value::Null),
			Node::Resource(handle) => self
				.by_type_id
				.get(&handle.type_id())
				.ok_or(Error::UnregisteredResource {
					rust_type: handle.rust_type(),
				})?
				.encode(node),
			other => Err(other.unexpected("a resource")),
		}
	}
}

/// Codec of a registered resource kind: type tagging around the attributes
/// codec of the kind.
pub struct ResourceKindRule;

impl Rule for ResourceKindRule {
	fn resolve(
		&self,
		shape: &Shape,
		registry: &Registry,
		cursor: Cursor,
	) -> Result<Option<Arc<dyn Codec>>, Error> {
		let Shape::Kind(id) = shape else {
			return Ok(None);
		};

		let Some(kind) = registry.kind(id.type_id) else {
			return Ok(None);
		};

		Ok(Some(Arc::new(ResourceCodec {
			type_name: kind.type_name()?,
			rust_type: kind.rust_type,
			strict: registry.options().strict_types,
			attributes: registry.next_codec(shape, cursor)?,
		})))
	}
}

pub struct ResourceCodec {
	type_name: &'static str,
	rust_type: &'static str,
	strict: bool,
	attributes: Arc<dyn Codec>,
}

impl Codec for ResourceCodec {
	fn decode(&self, value: Value, context: &mut Context) -> Result<Node, Error> {
		if value.is_null() {
			return Ok(Node::Null);
		}

		let mut members = expect_object(value, "a resource object")?;
		let attributes = members.remove("attributes").unwrap_or(Value::Null);
		let object: ResourceObject = serde_json::from_value(Value::Object(members))?;

		if self.strict && object.resource_type() != self.type_name {
			return Err(Error::TypeMismatch {
				expected: self.type_name.to_string(),
				found: object.resource_type().to_string(),
			});
		}

		let Node::Resource(handle) = self.attributes.decode(attributes, context)? else {
			return Err(Error::Format(format!(
				"attributes of `{}` did not decode into a resource",
				self.rust_type
			)));
		};

		context.push(Entry::new(object.identifier()?, object.relationships().cloned(), handle.clone()));
		member::write(&mut *handle.write(), object);

		Ok(Node::Resource(handle))
	}

	fn encode(&self, node: &Node) -> Result<Value, Error> {
		let handle = match node {
			Node::Null => return Ok(Value::Null),
			Node::Resource(handle) => handle,
			other => return Err(other.unexpected("a resource")),
		};

		let object = member::read(&*handle.read())?;

		if self.strict && object.resource_type() != self.type_name {
			return Err(Error::TypeMismatch {
				expected: self.type_name.to_string(),
				found: object.resource_type().to_string(),
			});
		}

		let attributes = self.attributes.encode(node)?;
		write_object(object, attributes)
	}
}

/// Resources as plain resource objects, attributes dropped.
pub struct ResourceObjectRule;

impl Rule for ResourceObjectRule {
	fn resolve(&self, shape: &Shape, _: &Registry, _: Cursor) -> Result<Option<Arc<dyn Codec>>, Error> {
		Ok(match shape {
			Shape::Object => Some(Arc::new(ObjectCodec)),
			_ => None,
		})
	}
}

pub struct ObjectCodec;

impl Codec for ObjectCodec {
	fn decode(&self, value: Value, context: &mut Context) -> Result<Node, Error> {
		if value.is_null() {
			return Ok(Node::Null);
		}

		let object: ResourceObject = serde_json::from_value(value)?;
		let identifier = object.identifier()?;
		let relationships = object.relationships().cloned();
		let handle = AnyHandle::new(object);

		context.push(Entry::new(identifier, relationships, handle.clone()));
		Ok(Node::Resource(handle))
	}

	fn encode(&self, node: &Node) -> Result<Value, Error> {
		let handle = match node {
			Node::Null => return Ok(Value::Null),
			Node::Resource(handle) => handle,
			other => return Err(other.unexpected("a resource")),
		};

		let object = match handle.downcast::<ResourceObject>() {
			Some(typed) => {
				let guard = typed.read();
				guard.clone()
			}
			None => member::read(&*handle.read())?,
		};

		write_object(object, Value::Null)
	}
}

/// Plain field-mapping codec of a registered kind, reading and writing the
/// `attributes` member through the serde implementation of the type.
pub struct AttributesRule;

impl Rule for AttributesRule {
	fn resolve(
		&self,
		shape: &Shape,
		registry: &Registry,
		_: Cursor,
	) -> Result<Option<Arc<dyn Codec>>, Error> {
		let Shape::Kind(id) = shape else {
			return Ok(None);
		};

		Ok(registry
			.kind(id.type_id)
			.map(|kind| Arc::new(AttributesCodec(kind.clone())) as Arc<dyn Codec>))
	}
}

pub struct AttributesCodec(Kind);

impl Codec for AttributesCodec {
	fn decode(&self, value: Value, _: &mut Context) -> Result<Node, Error> {
		Ok(Node::Resource((self.0.decode)(value)?))
	}

	fn encode(&self, node: &Node) -> Result<Value, Error> {
		match node {
			Node::Resource(handle) => (self.0.encode)(handle),
			other => Err(other.unexpected("a resource")),
		}
	}
}

fn write_object(object: ResourceObject, attributes: Value) -> Result<Value, Error> {
	let mut members = expect_object(serde_json::to_value(object)?, "a resource object")?;

	if !attributes.is_null() {
		members.insert("attributes".to_string(), attributes);
	}

	Ok(Value::Object(members))
}
