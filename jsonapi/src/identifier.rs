use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::utils::{is_blank, non_blank};
use crate::{Error, Meta};

/// Minimal `(type, id, lid)` reference to a resource.
///
/// Two identifiers are equal when they share the same type and the same `id`
/// (or the same `lid` when neither carries an `id`). `meta` is ignored.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "RawIdentifier")]
pub struct ResourceIdentifier {
	#[serde(rename = "type")]
	resource_type: String,

	#[serde(skip_serializing_if = "Option::is_none")]
	id: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	lid: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	meta: Option<Meta>,
}

#[derive(Deserialize)]
struct RawIdentifier {
	#[serde(rename = "type")]
	resource_type: Option<String>,
	id: Option<String>,
	lid: Option<String>,
	meta: Option<Meta>,
}

impl TryFrom<RawIdentifier> for ResourceIdentifier {
	type Error = Error;

	fn try_from(raw: RawIdentifier) -> Result<Self, Error> {
		let resource_type = raw.resource_type.unwrap_or_default();
		Ok(Self::new(resource_type, raw.id, raw.lid)?.with_meta(raw.meta))
	}
}

#[derive(PartialEq, Eq, Hash)]
enum Key<'a> {
	Id(&'a str),
	Lid(&'a str),
}

impl ResourceIdentifier {
	/// Creates an identifier, failing if `resource_type` is blank or if both
	/// `id` and `lid` are blank.
	pub fn new(
		resource_type: impl Into<String>,
		id: Option<String>,
		lid: Option<String>,
	) -> Result<Self, Error> {
		let resource_type = resource_type.into();

		if is_blank(&resource_type) {
			return Err(Error::MissingType {
				owner: "ResourceIdentifier".to_string(),
			});
		}

		if non_blank(id.as_deref()).is_none() && non_blank(lid.as_deref()).is_none() {
			return Err(Error::MissingIdentifier { resource_type });
		}

		Ok(Self {
			resource_type,
			id,
			lid,
			meta: None,
		})
	}

	pub fn from_id(resource_type: impl Into<String>, id: impl Into<String>) -> Result<Self, Error> {
		Self::new(resource_type, Some(id.into()), None)
	}

	pub fn from_lid(resource_type: impl Into<String>, lid: impl Into<String>) -> Result<Self, Error> {
		Self::new(resource_type, None, Some(lid.into()))
	}

	pub fn with_meta(mut self, meta: Option<Meta>) -> Self {
		self.meta = meta;
		self
	}

	pub fn resource_type(&self) -> &str {
		&self.resource_type
	}

	pub fn id(&self) -> Option<&str> {
		self.id.as_deref()
	}

	pub fn lid(&self) -> Option<&str> {
		self.lid.as_deref()
	}

	pub fn meta(&self) -> Option<&Meta> {
		self.meta.as_ref()
	}

	fn key(&self) -> Key<'_> {
		match non_blank(self.id.as_deref()) {
			Some(id) => Key::Id(id),
			None => Key::Lid(self.lid.as_deref().unwrap_or_default()),
		}
	}
}

impl PartialEq for ResourceIdentifier {
	fn eq(&self, other: &Self) -> bool {
		self.resource_type == other.resource_type && self.key() == other.key()
	}
}

impl Eq for ResourceIdentifier {}

impl Hash for ResourceIdentifier {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.resource_type.hash(state);
		self.key().hash(state)
	}
}

impl fmt::Display for ResourceIdentifier {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self.key() {
			Key::Id(id) => write!(f, "{}:{}", self.resource_type, id),
			Key::Lid(lid) => write!(f, "{}:lid:{}", self.resource_type, lid),
		}
	}
}

impl fmt::Debug for ResourceIdentifier {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "ResourceIdentifier({self})")
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use serde_json::json;

	use super::*;

	#[test]
	fn requires_id_or_lid() {
		assert!(matches!(
			ResourceIdentifier::new("people", None, None),
			Err(Error::MissingIdentifier { .. })
		));
		assert!(matches!(
			ResourceIdentifier::new("people", Some(" ".into()), Some(String::new())),
			Err(Error::MissingIdentifier { .. })
		));
		assert!(ResourceIdentifier::from_id("people", "1").is_ok());
		assert!(ResourceIdentifier::from_lid("people", "local").is_ok());
	}

	#[test]
	fn requires_type() {
		assert!(matches!(
			ResourceIdentifier::from_id("", "1"),
			Err(Error::MissingType { .. })
		));
	}

	#[test]
	fn equality_ignores_meta_and_prefers_id() {
		let a = ResourceIdentifier::new("people", Some("1".into()), Some("x".into())).unwrap();
		let b = ResourceIdentifier::from_id("people", "1")
			.unwrap()
			.with_meta(Some(Meta::new().with("k", 1)));
		let c = ResourceIdentifier::from_id("comments", "1").unwrap();
		let d = ResourceIdentifier::from_lid("people", "1").unwrap();

		assert_eq!(a, b);
		assert_ne!(a, c);
		assert_ne!(b, d);

		let set: HashSet<_> = [a, b, c, d].into_iter().collect();
		assert_eq!(set.len(), 3)
	}

	#[test]
	fn decodes_and_validates_wire_form() {
		let id: ResourceIdentifier =
			serde_json::from_value(json!({ "type": "people", "id": "9" })).unwrap();
		assert_eq!(id.resource_type(), "people");
		assert_eq!(id.id(), Some("9"));

		assert!(serde_json::from_value::<ResourceIdentifier>(json!({ "type": "people" })).is_err());
		assert!(serde_json::from_value::<ResourceIdentifier>(json!({ "id": "1" })).is_err());
	}

	#[test]
	fn encodes_without_absent_members() {
		let id = ResourceIdentifier::from_lid("people", "tmp").unwrap();
		assert_eq!(
			serde_json::to_value(&id).unwrap(),
			json!({ "type": "people", "lid": "tmp" })
		)
	}
}
