use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Meta;

/// Links object: link names mapped to links, possibly `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(BTreeMap<String, Option<Link>>);

impl Links {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, name: &str) -> Option<&Link> {
		self.0.get(name).and_then(Option::as_ref)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	pub fn insert(&mut self, name: impl Into<String>, link: Option<Link>) -> Option<Option<Link>> {
		self.0.insert(name.into(), link)
	}

	pub fn with(mut self, name: impl Into<String>, link: impl Into<Link>) -> Self {
		self.insert(name, Some(link.into()));
		self
	}

	pub fn self_link(&self) -> Option<&Link> {
		self.get("self")
	}

	pub fn related(&self) -> Option<&Link> {
		self.get("related")
	}

	pub fn first(&self) -> Option<&Link> {
		self.get("first")
	}

	pub fn prev(&self) -> Option<&Link> {
		self.get("prev")
	}

	pub fn next(&self) -> Option<&Link> {
		self.get("next")
	}

	pub fn last(&self) -> Option<&Link> {
		self.get("last")
	}

	pub fn about(&self) -> Option<&Link> {
		self.get("about")
	}

	pub fn link_type(&self) -> Option<&Link> {
		self.get("type")
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Link>)> {
		self.0.iter().map(|(name, link)| (name.as_str(), link.as_ref()))
	}
}

impl<K: Into<String>, L: Into<Link>> FromIterator<(K, L)> for Links {
	fn from_iter<I: IntoIterator<Item = (K, L)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(name, link)| (name.into(), Some(link.into())))
				.collect(),
		)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Link {
	Uri(String),
	Object(LinkObject),
}

impl Link {
	pub fn href(&self) -> &str {
		match self {
			Self::Uri(uri) => uri,
			Self::Object(object) => &object.href,
		}
	}
}

impl From<String> for Link {
	fn from(uri: String) -> Self {
		Self::Uri(uri)
	}
}

impl From<&str> for Link {
	fn from(uri: &str) -> Self {
		Self::Uri(uri.to_string())
	}
}

impl From<LinkObject> for Link {
	fn from(object: LinkObject) -> Self {
		Self::Object(object)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkObject {
	pub href: String,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rel: Option<String>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub describedby: Option<Box<Link>>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,

	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub media_type: Option<String>,

	/// Language(s) of the target; a single entry is written as a string.
	#[serde(
		default,
		deserialize_with = "deserialize_hreflang",
		serialize_with = "serialize_hreflang",
		skip_serializing_if = "Option::is_none"
	)]
	pub hreflang: Option<Vec<String>>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub meta: Option<Meta>,
}

impl LinkObject {
	pub fn new(href: impl Into<String>) -> Self {
		Self {
			href: href.into(),
			rel: None,
			describedby: None,
			title: None,
			media_type: None,
			hreflang: None,
			meta: None,
		}
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
	One(String),
	Many(Vec<String>),
}

fn deserialize_hreflang<'de, D: Deserializer<'de>>(
	deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
	Ok(
		Option::<OneOrMany>::deserialize(deserializer)?.map(|value| match value {
			OneOrMany::One(lang) => vec![lang],
			OneOrMany::Many(langs) => langs,
		}),
	)
}

fn serialize_hreflang<S: Serializer>(
	value: &Option<Vec<String>>,
	serializer: S,
) -> Result<S::Ok, S::Error> {
	match value.as_deref() {
		Some([lang]) => serializer.serialize_str(lang),
		Some([]) | None => serializer.serialize_none(),
		Some(langs) => langs.serialize(serializer),
	}
}
