use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use educe::Educe;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{document, resource, structural, Cache, Codec, Cursor, KindId, Rule, Shape};
use crate::utils::{is_blank, short_type_name};
use crate::{AnyHandle, Error, Handle, Options, Resource};

/// Registered resource type.
#[derive(Debug, Clone)]
pub(crate) struct Kind {
	pub id: KindId,
	pub rust_type: &'static str,
	pub declared: Option<&'static str>,
	pub decode: fn(Value) -> Result<AnyHandle, Error>,
	pub encode: fn(&AnyHandle) -> Result<Value, Error>,
}

impl Kind {
	pub fn of<T: Resource + Serialize + DeserializeOwned>() -> Self {
		Self {
			id: KindId {
				type_id: TypeId::of::<T>(),
				name: short_type_name::<T>(),
			},
			rust_type: short_type_name::<T>(),
			declared: T::declared_type(),
			decode: decode_attributes::<T>,
			encode: encode_attributes::<T>,
		}
	}

	/// Declared type name, required to be non-blank.
	pub fn type_name(&self) -> Result<&'static str, Error> {
		match self.declared {
			None => Err(Error::UndeclaredType {
				rust_type: self.rust_type,
			}),
			Some(name) if is_blank(name) => Err(Error::BlankTypeName {
				rust_type: self.rust_type,
			}),
			Some(name) => Ok(name),
		}
	}
}

/// Builds a resource from its `attributes` member. An absent member is read
/// as an empty object.
fn decode_attributes<T: Resource + DeserializeOwned>(attributes: Value) -> Result<AnyHandle, Error> {
	let attributes = match attributes {
		Value::Null => Value::Object(Default::default()),
		other => other,
	};

	Ok(AnyHandle::new(serde_json::from_value::<T>(attributes)?))
}

/// Writes the attributes of a resource. Empty attributes give `null`.
fn encode_attributes<T: Resource + Serialize>(handle: &AnyHandle) -> Result<Value, Error> {
	let typed: Handle<T> = handle.downcast().ok_or_else(|| Error::TypeMismatch {
		expected: short_type_name::<T>().to_string(),
		found: handle.rust_type().to_string(),
	})?;

	let value = serde_json::to_value(&*typed.read())?;
	Ok(match value {
		Value::Object(members) if members.is_empty() => Value::Null,
		other => other,
	})
}

/// Resolution chain with its registered kinds and resolved codecs.
#[derive(Educe)]
#[educe(Debug)]
pub struct Registry {
	kinds: Vec<Kind>,

	by_type_id: HashMap<TypeId, usize>,

	by_name: HashMap<&'static str, usize>,

	options: Options,

	#[educe(Debug(ignore))]
	rules: Vec<Box<dyn Rule>>,

	#[educe(Debug(ignore))]
	cache: Cache<Shape, dyn Codec>,
}

impl Registry {
	pub(crate) fn new(kinds: Vec<Kind>, options: Options) -> Result<Self, Error> {
		let mut by_type_id = HashMap::new();
		let mut by_name = HashMap::new();

		for (i, kind) in kinds.iter().enumerate() {
			let name = kind.type_name()?;

			if let Some(&j) = by_name.get(name) {
				let registered: &Kind = &kinds[j];
				return Err(Error::DuplicateTypeName {
					name,
					rust_type: kind.rust_type,
					registered: registered.rust_type,
				});
			}

			by_name.insert(name, i);
			by_type_id.insert(kind.id.type_id, i);
		}

		tracing::debug!(kinds = kinds.len(), ?options, "built resource registry");

		Ok(Self {
			kinds,
			by_type_id,
			by_name,
			options,
			rules: default_rules(),
			cache: Cache::default(),
		})
	}

	pub fn options(&self) -> &Options {
		&self.options
	}

	pub(crate) fn kind(&self, type_id: TypeId) -> Option<&Kind> {
		self.by_type_id.get(&type_id).map(|&i| &self.kinds[i])
	}

	pub(crate) fn kinds(&self) -> &[Kind] {
		&self.kinds
	}

	pub fn is_registered(&self, type_id: TypeId) -> bool {
		self.by_type_id.contains_key(&type_id)
	}

	pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.by_name.keys().copied()
	}

	/// Codec for `shape`, resolved once and cached.
	pub fn codec(&self, shape: &Shape) -> Result<Arc<dyn Codec>, Error> {
		self.cache.get_or_insert(shape, || {
			let codec = self.resolve(shape, Cursor(0))?;
			tracing::trace!(%shape, "resolved codec");
			Ok(codec)
		})
	}

	/// Codec for `shape` from the rules following `cursor`. Not cached.
	pub fn next_codec(&self, shape: &Shape, cursor: Cursor) -> Result<Arc<dyn Codec>, Error> {
		self.resolve(shape, cursor.next())
	}

	fn resolve(&self, shape: &Shape, from: Cursor) -> Result<Arc<dyn Codec>, Error> {
		for (i, rule) in self.rules.iter().enumerate().skip(from.0) {
			if let Some(codec) = rule.resolve(shape, self, Cursor(i))? {
				return Ok(codec);
			}
		}

		Err(Error::NoCodec {
			shape: shape.to_string(),
		})
	}
}

/// Rules in precedence order.
fn default_rules() -> Vec<Box<dyn Rule>> {
	vec![
		Box::new(structural::VoidRule),
		Box::new(document::DocumentRule),
		Box::new(document::DataRule),
		Box::new(resource::ResourceBaseRule),
		Box::new(resource::ResourceKindRule),
		Box::new(resource::ResourceObjectRule),
		Box::new(structural::StructuralRule::LINKS),
		Box::new(structural::StructuralRule::META),
		Box::new(structural::StructuralRule::RELATION),
		Box::new(structural::StructuralRule::ERRORS),
		Box::new(structural::StructuralRule::JSONAPI),
		Box::new(structural::StructuralRule::IDENTIFIER),
		Box::new(resource::AttributesRule),
	]
}
