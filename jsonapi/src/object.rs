use serde::{Deserialize, Serialize};

use crate::utils::{is_blank, non_blank};
use crate::{Error, Links, Meta, Relationships, Resource, ResourceIdentifier, Shape};

/// Wire-level resource object, without attributes.
///
/// Resources of unregistered types decode into this type when the registry
/// allows them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawResourceObject")]
pub struct ResourceObject {
	#[serde(rename = "type")]
	resource_type: String,

	#[serde(skip_serializing_if = "Option::is_none")]
	id: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	lid: Option<String>,

	#[serde(skip_serializing_if = "Option::is_none")]
	relationships: Option<Relationships>,

	#[serde(skip_serializing_if = "Option::is_none")]
	links: Option<Links>,

	#[serde(skip_serializing_if = "Option::is_none")]
	meta: Option<Meta>,
}

#[derive(Deserialize)]
struct RawResourceObject {
	#[serde(rename = "type")]
	resource_type: Option<String>,
	id: Option<String>,
	lid: Option<String>,
	relationships: Option<Relationships>,
	links: Option<Links>,
	meta: Option<Meta>,
}

impl TryFrom<RawResourceObject> for ResourceObject {
	type Error = Error;

	fn try_from(raw: RawResourceObject) -> Result<Self, Error> {
		let mut object = Self::new(raw.resource_type.unwrap_or_default(), raw.id, raw.lid)?;
		object.relationships = raw.relationships;
		object.links = raw.links;
		object.meta = raw.meta;
		Ok(object)
	}
}

impl ResourceObject {
	pub fn new(
		resource_type: impl Into<String>,
		id: Option<String>,
		lid: Option<String>,
	) -> Result<Self, Error> {
		let resource_type = resource_type.into();

		if is_blank(&resource_type) {
			return Err(Error::MissingType {
				owner: "ResourceObject".to_string(),
			});
		}

		if non_blank(id.as_deref()).is_none() && non_blank(lid.as_deref()).is_none() {
			return Err(Error::MissingIdentifier { resource_type });
		}

		Ok(Self {
			resource_type,
			id,
			lid,
			relationships: None,
			links: None,
			meta: None,
		})
	}

	pub fn with_relationships(mut self, relationships: Option<Relationships>) -> Self {
		self.relationships = relationships;
		self
	}

	pub fn with_links(mut self, links: Option<Links>) -> Self {
		self.links = links;
		self
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

	pub fn relationships(&self) -> Option<&Relationships> {
		self.relationships.as_ref()
	}

	pub fn links(&self) -> Option<&Links> {
		self.links.as_ref()
	}

	pub fn meta(&self) -> Option<&Meta> {
		self.meta.as_ref()
	}

	pub fn identifier(&self) -> Result<ResourceIdentifier, Error> {
		ResourceIdentifier::new(self.resource_type.clone(), self.id.clone(), self.lid.clone())
	}

	pub fn into_parts(self) -> Parts {
		Parts {
			resource_type: self.resource_type,
			id: self.id,
			lid: self.lid,
			relationships: self.relationships,
			links: self.links,
			meta: self.meta,
		}
	}
}

/// Owned members of a [`ResourceObject`].
#[derive(Debug, Clone)]
pub struct Parts {
	pub resource_type: String,
	pub id: Option<String>,
	pub lid: Option<String>,
	pub relationships: Option<Relationships>,
	pub links: Option<Links>,
	pub meta: Option<Meta>,
}

impl Resource for ResourceObject {
	fn declared_type() -> Option<&'static str> {
		None
	}

	fn shape() -> Shape {
		Shape::Object
	}

	fn class_type(&self) -> Option<&'static str> {
		None
	}

	fn type_member(&self) -> Option<&str> {
		Some(&self.resource_type)
	}

	fn set_type_member(&mut self, value: String) {
		self.resource_type = value
	}

	fn id_member(&self) -> Option<&str> {
		self.id.as_deref()
	}

	fn set_id_member(&mut self, value: String) {
		self.id = Some(value)
	}

	fn lid_member(&self) -> Option<&str> {
		self.lid.as_deref()
	}

	fn set_lid_member(&mut self, value: String) {
		self.lid = Some(value)
	}

	fn relationships_member(&self) -> Option<&Relationships> {
		self.relationships.as_ref()
	}

	fn set_relationships_member(&mut self, value: Option<Relationships>) {
		self.relationships = value
	}

	fn links_member(&self) -> Option<&Links> {
		self.links.as_ref()
	}

	fn set_links_member(&mut self, value: Links) {
		self.links = Some(value)
	}

	fn meta_member(&self) -> Option<&Meta> {
		self.meta.as_ref()
	}

	fn set_meta_member(&mut self, value: Meta) {
		self.meta = Some(value)
	}
}
