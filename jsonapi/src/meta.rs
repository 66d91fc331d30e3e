use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;

/// Non-standard meta-information: a JSON object of arbitrary members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meta(Map<String, Value>);

impl Meta {
	pub fn new() -> Self {
		Self::default()
	}

	/// Serializes `value` into meta members. `value` must serialize into a
	/// JSON object.
	pub fn from_value<T: Serialize>(value: &T) -> Result<Self, Error> {
		match serde_json::to_value(value)? {
			Value::Object(members) => Ok(Self(members)),
			other => Err(Error::Format(format!(
				"meta must be a JSON object, found `{other}`"
			))),
		}
	}

	/// Deserializes the meta members into `T`.
	pub fn to<T: DeserializeOwned>(&self) -> Result<T, Error> {
		Ok(T::deserialize(Value::Object(self.0.clone()))?)
	}

	pub fn get(&self, name: &str) -> Option<&Value> {
		self.0.get(name)
	}

	pub fn string(&self, name: &str) -> Option<&str> {
		self.get(name).and_then(Value::as_str)
	}

	pub fn number(&self, name: &str) -> Option<f64> {
		self.get(name).and_then(Value::as_f64)
	}

	pub fn integer(&self, name: &str) -> Option<i64> {
		self.get(name).and_then(Value::as_i64)
	}

	pub fn boolean(&self, name: &str) -> Option<bool> {
		self.get(name).and_then(Value::as_bool)
	}

	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.0.insert(name.into(), value.into())
	}

	pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.insert(name, value);
		self
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> serde_json::map::Iter<'_> {
		self.0.iter()
	}

	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	pub fn into_map(self) -> Map<String, Value> {
		self.0
	}
}

impl From<Map<String, Value>> for Meta {
	fn from(members: Map<String, Value>) -> Self {
		Self(members)
	}
}

#[cfg(test)]
mod tests {
	use serde::{Deserialize, Serialize};
	use serde_json::json;

	use super::*;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Paging {
		total: u32,
		cursor: Option<String>,
	}

	#[test]
	fn typed_accessors() {
		let meta: Meta =
			serde_json::from_value(json!({ "name": "x", "count": 3, "ratio": 0.5, "ok": true }))
				.unwrap();

		assert_eq!(meta.string("name"), Some("x"));
		assert_eq!(meta.integer("count"), Some(3));
		assert_eq!(meta.number("ratio"), Some(0.5));
		assert_eq!(meta.boolean("ok"), Some(true));
		assert_eq!(meta.string("count"), None);
		assert_eq!(meta.get("missing"), None);
	}

	#[test]
	fn converts_to_and_from_typed_values() {
		let paging = Paging {
			total: 12,
			cursor: Some("abc".into()),
		};

		let meta = Meta::from_value(&paging).unwrap();
		assert_eq!(meta.integer("total"), Some(12));
		assert_eq!(meta.to::<Paging>().unwrap(), paging);
	}

	#[test]
	fn rejects_non_object_values() {
		assert!(matches!(Meta::from_value(&[1, 2]), Err(Error::Format(_))));
	}
}
