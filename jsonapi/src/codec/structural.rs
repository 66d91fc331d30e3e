use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{Codec, Context, Cursor, Node, Registry, Rule, Shape};
use crate::{Error, ErrorObject, JsonApiObject, Link, LinkObject, Links, Meta, Relation, ResourceIdentifier};

/// Absent value: decoding skips the input, encoding writes `null`.
pub struct VoidRule;

impl Rule for VoidRule {
	fn resolve(&self, shape: &Shape, _: &Registry, _: Cursor) -> Result<Option<Arc<dyn Codec>>, Error> {
		Ok(match shape {
			Shape::Void => Some(Arc::new(VoidCodec)),
			_ => None,
		})
	}
}

pub struct VoidCodec;

impl Codec for VoidCodec {
	fn decode(&self, _: Value, _: &mut Context) -> Result<Node, Error> {
		Ok(Node::Null)
	}

	fn encode(&self, _: &Node) -> Result<Value, Error> {
		Ok(Value::Null)
	}
}

/// Fixed codecs for the auxiliary document members.
pub struct StructuralRule {
	resolve: fn(&Shape) -> Option<Arc<dyn Codec>>,
}

impl StructuralRule {
	pub const LINKS: Self = Self {
		resolve: |shape| match shape {
			Shape::Links => Some(Arc::new(Structural::<Links>::new("links", Node::Links, |n| match n {
				Node::Links(v) => Some(v),
				_ => None,
			}))),
			Shape::Link => Some(Arc::new(Structural::<Link>::new("link", Node::Link, |n| match n {
				Node::Link(v) => Some(v),
				_ => None,
			}))),
			Shape::LinkObject => Some(Arc::new(Structural::<LinkObject>::new(
				"link object",
				Node::LinkObject,
				|n| match n {
					Node::LinkObject(v) => Some(v),
					_ => None,
				},
			))),
			_ => None,
		},
	};

	pub const META: Self = Self {
		resolve: |shape| match shape {
			Shape::Meta => Some(Arc::new(Structural::<Meta>::new("meta", Node::Meta, |n| match n {
				Node::Meta(v) => Some(v),
				_ => None,
			}))),
			_ => None,
		},
	};

	pub const RELATION: Self = Self {
		resolve: |shape| match shape {
			Shape::Relation => Some(Arc::new(Structural::<Relation>::new(
				"relationship",
				Node::Relation,
				|n| match n {
					Node::Relation(v) => Some(v),
					_ => None,
				},
			))),
			_ => None,
		},
	};

	pub const ERRORS: Self = Self {
		resolve: |shape| match shape {
			Shape::Errors => Some(Arc::new(Structural::<Vec<ErrorObject>>::new(
				"errors",
				Node::Errors,
				|n| match n {
					Node::Errors(v) => Some(v),
					_ => None,
				},
			))),
			_ => None,
		},
	};

	pub const JSONAPI: Self = Self {
		resolve: |shape| match shape {
			Shape::JsonApi => Some(Arc::new(Structural::<JsonApiObject>::new(
				"jsonapi object",
				Node::JsonApi,
				|n| match n {
					Node::JsonApi(v) => Some(v),
					_ => None,
				},
			))),
			_ => None,
		},
	};

	pub const IDENTIFIER: Self = Self {
		resolve: |shape| match shape {
			Shape::Identifier => Some(Arc::new(Structural::<ResourceIdentifier>::new(
				"resource identifier",
				Node::Identifier,
				|n| match n {
					Node::Identifier(v) => Some(v),
					_ => None,
				},
			))),
			_ => None,
		},
	};
}

impl Rule for StructuralRule {
	fn resolve(&self, shape: &Shape, _: &Registry, _: Cursor) -> Result<Option<Arc<dyn Codec>>, Error> {
		Ok((self.resolve)(shape))
	}
}

/// Codec going through the serde implementation of `T`.
pub struct Structural<T> {
	name: &'static str,
	wrap: fn(T) -> Node,
	unwrap: fn(&Node) -> Option<&T>,
}

impl<T> Structural<T> {
	fn new(name: &'static str, wrap: fn(T) -> Node, unwrap: fn(&Node) -> Option<&T>) -> Self {
		Self { name, wrap, unwrap }
	}
}

impl<T: Serialize + DeserializeOwned> Codec for Structural<T> {
	fn decode(&self, value: Value, _: &mut Context) -> Result<Node, Error> {
		match value {
			Value::Null => Ok(Node::Null),
			value => Ok((self.wrap)(serde_json::from_value(value)?)),
		}
	}

	fn encode(&self, node: &Node) -> Result<Value, Error> {
		match node {
			Node::Null => Ok(Value::Null),
			node => {
				let value = (self.unwrap)(node).ok_or_else(|| node.unexpected(self.name))?;
				Ok(serde_json::to_value(value)?)
			}
		}
	}
}
