use std::collections::BTreeMap;
use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::{Links, Meta, ResourceIdentifier};

/// Relationships of a resource object, by relationship name.
pub type Relationships = BTreeMap<String, Relation>;

/// Number of resources a relationship refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
	ToOne,
	ToMany,
}

impl fmt::Display for Cardinality {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::ToOne => write!(f, "to-one"),
			Self::ToMany => write!(f, "to-many"),
		}
	}
}

/// Relationship object: resource linkage by identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
	/// `data` is `None` for an empty (`null`) relationship.
	ToOne {
		data: Option<ResourceIdentifier>,
		links: Option<Links>,
		meta: Option<Meta>,
	},
	ToMany {
		data: Vec<ResourceIdentifier>,
		links: Option<Links>,
		meta: Option<Meta>,
	},
}

impl Relation {
	pub fn to_one(data: Option<ResourceIdentifier>) -> Self {
		Self::ToOne {
			data,
			links: None,
			meta: None,
		}
	}

	pub fn to_many(data: Vec<ResourceIdentifier>) -> Self {
		Self::ToMany {
			data,
			links: None,
			meta: None,
		}
	}

	pub fn cardinality(&self) -> Cardinality {
		match self {
			Self::ToOne { .. } => Cardinality::ToOne,
			Self::ToMany { .. } => Cardinality::ToMany,
		}
	}

	pub fn identifiers(&self) -> &[ResourceIdentifier] {
		match self {
			Self::ToOne { data: Some(id), .. } => std::slice::from_ref(id),
			Self::ToOne { data: None, .. } => &[],
			Self::ToMany { data, .. } => data,
		}
	}

	pub fn links(&self) -> Option<&Links> {
		match self {
			Self::ToOne { links, .. } | Self::ToMany { links, .. } => links.as_ref(),
		}
	}

	pub fn meta(&self) -> Option<&Meta> {
		match self {
			Self::ToOne { meta, .. } | Self::ToMany { meta, .. } => meta.as_ref(),
		}
	}

	pub fn with_links(mut self, value: Links) -> Self {
		match &mut self {
			Self::ToOne { links, .. } | Self::ToMany { links, .. } => *links = Some(value),
		}
		self
	}

	pub fn with_meta(mut self, value: Meta) -> Self {
		match &mut self {
			Self::ToOne { meta, .. } | Self::ToMany { meta, .. } => *meta = Some(value),
		}
		self
	}
}

#[derive(Serialize)]
#[serde(untagged)]
enum DataRef<'a> {
	One(Option<&'a ResourceIdentifier>),
	Many(&'a [ResourceIdentifier]),
}

#[derive(Serialize)]
struct RelationRef<'a> {
	data: DataRef<'a>,

	#[serde(skip_serializing_if = "Option::is_none")]
	links: Option<&'a Links>,

	#[serde(skip_serializing_if = "Option::is_none")]
	meta: Option<&'a Meta>,
}

impl Serialize for Relation {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let data = match self {
			Self::ToOne { data, .. } => DataRef::One(data.as_ref()),
			Self::ToMany { data, .. } => DataRef::Many(data),
		};

		RelationRef {
			data,
			links: self.links(),
			meta: self.meta(),
		}
		.serialize(serializer)
	}
}

#[derive(Deserialize)]
struct RawRelation {
	#[serde(default)]
	data: Option<Value>,

	#[serde(default)]
	links: Option<Links>,

	#[serde(default)]
	meta: Option<Meta>,
}

impl<'de> Deserialize<'de> for Relation {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = RawRelation::deserialize(deserializer)?;

		match raw.data {
			Some(Value::Array(items)) => {
				let data: Vec<ResourceIdentifier> = items
					.into_iter()
					.map(ResourceIdentifier::deserialize)
					.collect::<Result<_, _>>()
					.map_err(de::Error::custom)?;

				Ok(Self::ToMany {
					data,
					links: raw.links,
					meta: raw.meta,
				})
			}
			Some(Value::Null) | None => Ok(Self::ToOne {
				data: None,
				links: raw.links,
				meta: raw.meta,
			}),
			Some(value) => Ok(Self::ToOne {
				data: Some(ResourceIdentifier::deserialize(value).map_err(de::Error::custom)?),
				links: raw.links,
				meta: raw.meta,
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn person(id: &str) -> ResourceIdentifier {
		ResourceIdentifier::from_id("people", id).unwrap()
	}

	#[test]
	fn array_data_is_to_many() {
		let relation: Relation = serde_json::from_value(json!({
			"data": [{ "type": "people", "id": "1" }, { "type": "people", "id": "2" }]
		}))
		.unwrap();

		assert_eq!(relation, Relation::to_many(vec![person("1"), person("2")]));
		assert_eq!(relation.cardinality(), Cardinality::ToMany);
	}

	#[test]
	fn object_null_or_missing_data_is_to_one() {
		let one: Relation =
			serde_json::from_value(json!({ "data": { "type": "people", "id": "1" } })).unwrap();
		let null: Relation = serde_json::from_value(json!({ "data": null })).unwrap();
		let missing: Relation =
			serde_json::from_value(json!({ "links": { "related": "/a/author" } })).unwrap();

		assert_eq!(one, Relation::to_one(Some(person("1"))));
		assert_eq!(null, Relation::to_one(None));
		assert!(missing.identifiers().is_empty());
		assert!(missing.links().and_then(Links::related).is_some());
	}

	#[test]
	fn invalid_linkage_is_rejected() {
		assert!(serde_json::from_value::<Relation>(json!({ "data": { "type": "people" } })).is_err());
		assert!(serde_json::from_value::<Relation>(json!({ "data": [{ "id": "1" }] })).is_err());
	}

	#[test]
	fn writes_null_linkage_explicitly() {
		assert_eq!(
			serde_json::to_value(Relation::to_one(None)).unwrap(),
			json!({ "data": null })
		);
		assert_eq!(
			serde_json::to_value(Relation::to_many(vec![person("3")]).with_meta(Meta::new().with("n", 1)))
				.unwrap(),
			json!({ "data": [{ "type": "people", "id": "3" }], "meta": { "n": 1 } })
		)
	}
}
