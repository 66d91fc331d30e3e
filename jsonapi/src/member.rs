//! Reading and writing the JSON:API members of typed resources.
use std::collections::BTreeSet;

use crate::utils::{is_blank, non_blank};
use crate::{
	AnyHandle, Cardinality, Error, Linkage, Mismatch, Relation, Relationships, Resource,
	ResourceIdentifier, ResourceObject, ToManyMember, ToOneMember,
};

/// Type name of `resource`: its type member if set, its declared type
/// otherwise.
pub fn resource_type(resource: &dyn Resource) -> Result<&str, Error> {
	non_blank(resource.type_member())
		.or(resource.class_type())
		.filter(|t| !is_blank(t))
		.ok_or_else(|| Error::MissingType {
			owner: resource.rust_type().to_string(),
		})
}

pub fn identifier(resource: &dyn Resource) -> Result<ResourceIdentifier, Error> {
	ResourceIdentifier::new(
		resource_type(resource)?,
		resource.id_member().map(str::to_string),
		resource.lid_member().map(str::to_string),
	)
}

/// Reads the resource object of `resource`.
///
/// Relationships come from the relationship members merged with the bulk
/// relationships member, the latter winning on name collisions. Handles
/// found in relationship members are read to compute their identifiers.
pub fn read(resource: &dyn Resource) -> Result<ResourceObject, Error> {
	let identifier = identifier(resource)?;
	let mut relationships = members_relationships(resource)?;

	if let Some(bulk) = resource.relationships_member() {
		relationships.extend(bulk.iter().map(|(name, relation)| (name.clone(), relation.clone())));
	}

	let object = ResourceObject::new(
		identifier.resource_type(),
		identifier.id().map(str::to_string),
		identifier.lid().map(str::to_string),
	)?;

	Ok(object
		.with_relationships(if relationships.is_empty() {
			None
		} else {
			Some(relationships)
		})
		.with_links(resource.links_member().cloned())
		.with_meta(resource.meta_member().cloned()))
}

fn members_relationships(resource: &dyn Resource) -> Result<Relationships, Error> {
	let mut names = BTreeSet::new();
	let mut relationships = Relationships::new();

	for (index, field) in resource.relationship_fields().iter().enumerate() {
		if !names.insert(field.name) {
			return Err(Error::DuplicateRelationship {
				owner: resource.rust_type(),
				name: field.name,
			});
		}

		if let Some(relation) = relation_of(resource.linkage(index))? {
			relationships.insert(field.name.to_string(), relation);
		}
	}

	Ok(relationships)
}

/// Relation referring to the resources of `linkage`.
///
/// An empty to-many linkage has no relation.
pub fn relation_of(linkage: Linkage) -> Result<Option<Relation>, Error> {
	match linkage {
		Linkage::Empty => Ok(None),
		Linkage::Many(handles) if handles.is_empty() => Ok(None),
		Linkage::One(handle) => Ok(Some(Relation::to_one(Some(handle.identifier()?)))),
		Linkage::Many(handles) => Ok(Some(Relation::to_many(
			handles
				.iter()
				.map(AnyHandle::identifier)
				.collect::<Result<_, _>>()?,
		))),
	}
}

/// Writes the members of `object` into `resource`.
///
/// The type is always written. Other members are only written when present
/// in `object`, so defaults of `resource` survive.
pub fn write(resource: &mut dyn Resource, object: ResourceObject) {
	let parts = object.into_parts();
	resource.set_type_member(parts.resource_type);

	if let Some(id) = parts.id {
		resource.set_id_member(id)
	}

	if let Some(lid) = parts.lid {
		resource.set_lid_member(lid)
	}

	if let Some(relationships) = parts.relationships {
		resource.set_relationships_member(Some(relationships))
	}

	if let Some(links) = parts.links {
		resource.set_links_member(links)
	}

	if let Some(meta) = parts.meta {
		resource.set_meta_member(meta)
	}
}

/// Assigns `linkage` to a to-one relationship member.
pub fn assign_one<S: ToOneMember>(slot: &mut S, linkage: Linkage) -> Result<(), Mismatch> {
	match linkage {
		Linkage::Empty => Ok(()),
		Linkage::One(handle) => slot.assign(handle).map_err(|found| Mismatch::Type {
			expected: S::element_type(),
			found: found.rust_type(),
		}),
		Linkage::Many(_) => Err(Mismatch::Cardinality {
			expected: Cardinality::ToOne,
			found: Cardinality::ToMany,
		}),
	}
}

/// Assigns `linkage` to a to-many relationship member.
///
/// Nothing is assigned unless every handle fits the member.
pub fn assign_many<S: ToManyMember>(slot: &mut S, linkage: Linkage) -> Result<(), Mismatch> {
	match linkage {
		Linkage::Empty => Ok(()),
		Linkage::Many(handles) => slot.assign(handles).map_err(|found| Mismatch::Type {
			expected: S::element_type(),
			found: found.rust_type(),
		}),
		Linkage::One(_) => Err(Mismatch::Cardinality {
			expected: Cardinality::ToMany,
			found: Cardinality::ToOne,
		}),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Handle, Links, Meta, RelationshipField};

	#[derive(Default)]
	struct Note {
		id: Option<String>,
		relationships: Option<Relationships>,
		meta: Option<Meta>,
		subject: Option<Handle<ResourceObject>>,
		tags: Vec<Handle<ResourceObject>>,
	}

	const NOTE_FIELDS: &[RelationshipField] = &[
		RelationshipField {
			name: "subject",
			member: "subject",
			cardinality: Cardinality::ToOne,
		},
		RelationshipField {
			name: "tags",
			member: "tags",
			cardinality: Cardinality::ToMany,
		},
	];

	impl Resource for Note {
		fn declared_type() -> Option<&'static str> {
			Some("notes")
		}

		fn class_type(&self) -> Option<&'static str> {
			Some("notes")
		}

		fn id_member(&self) -> Option<&str> {
			self.id.as_deref()
		}

		fn set_id_member(&mut self, value: String) {
			self.id = Some(value)
		}

		fn relationships_member(&self) -> Option<&Relationships> {
			self.relationships.as_ref()
		}

		fn set_relationships_member(&mut self, value: Option<Relationships>) {
			self.relationships = value
		}

		fn meta_member(&self) -> Option<&Meta> {
			self.meta.as_ref()
		}

		fn set_meta_member(&mut self, value: Meta) {
			self.meta = Some(value)
		}

		fn relationship_fields(&self) -> &'static [RelationshipField] {
			NOTE_FIELDS
		}

		fn linkage(&self, index: usize) -> Linkage {
			match index {
				0 => Linkage::from_one(ToOneMember::linkage(&self.subject)),
				1 => Linkage::from_many(ToManyMember::linkage(&self.tags)),
				_ => Linkage::Empty,
			}
		}

		fn assign_linkage(&mut self, index: usize, linkage: Linkage) -> Result<(), Mismatch> {
			match index {
				0 => assign_one(&mut self.subject, linkage),
				1 => assign_many(&mut self.tags, linkage),
				_ => Ok(()),
			}
		}
	}

	struct Ambiguous;

	impl Resource for Ambiguous {
		fn declared_type() -> Option<&'static str> {
			Some("ambiguous")
		}

		fn class_type(&self) -> Option<&'static str> {
			Some("ambiguous")
		}

		fn id_member(&self) -> Option<&str> {
			Some("1")
		}

		fn relationship_fields(&self) -> &'static [RelationshipField] {
			const FIELDS: &[RelationshipField] = &[
				RelationshipField {
					name: "owner",
					member: "a",
					cardinality: Cardinality::ToOne,
				},
				RelationshipField {
					name: "owner",
					member: "b",
					cardinality: Cardinality::ToOne,
				},
			];
			FIELDS
		}
	}

	fn thing(id: &str) -> Handle<ResourceObject> {
		Handle::new(ResourceObject::new("things", Some(id.to_string()), None).unwrap())
	}

	fn thing_id(id: &str) -> ResourceIdentifier {
		ResourceIdentifier::from_id("things", id).unwrap()
	}

	#[test]
	fn type_falls_back_to_the_declared_type() {
		let note = Note {
			id: Some("1".into()),
			..Default::default()
		};

		assert_eq!(identifier(&note).unwrap(), ResourceIdentifier::from_id("notes", "1").unwrap());
		assert!(matches!(
			identifier(&Note::default()),
			Err(Error::MissingIdentifier { .. })
		));
	}

	#[test]
	fn reads_relationship_members() {
		let note = Note {
			id: Some("1".into()),
			subject: Some(thing("7")),
			tags: vec![thing("1"), thing("2")],
			meta: Some(Meta::new().with("pinned", true)),
			..Default::default()
		};

		let object = read(&note).unwrap();
		let relationships = object.relationships().unwrap();

		assert_eq!(relationships["subject"], Relation::to_one(Some(thing_id("7"))));
		assert_eq!(
			relationships["tags"],
			Relation::to_many(vec![thing_id("1"), thing_id("2")])
		);
		assert_eq!(object.meta().and_then(|m| m.boolean("pinned")), Some(true));
		assert!(object.links().is_none());
	}

	#[test]
	fn bulk_relationships_win_over_members() {
		let mut bulk = Relationships::new();
		bulk.insert("subject".into(), Relation::to_one(None));

		let note = Note {
			id: Some("1".into()),
			subject: Some(thing("7")),
			relationships: Some(bulk),
			..Default::default()
		};

		let object = read(&note).unwrap();
		assert_eq!(object.relationships().unwrap()["subject"], Relation::to_one(None));
	}

	#[test]
	fn duplicate_relationship_names_are_rejected() {
		assert!(matches!(
			read(&Ambiguous),
			Err(Error::DuplicateRelationship { name: "owner", .. })
		));
	}

	#[test]
	fn write_preserves_defaults_for_absent_members() {
		let mut note = Note {
			meta: Some(Meta::new().with("kept", 1)),
			..Default::default()
		};

		let object = ResourceObject::new("notes", Some("5".into()), None)
			.unwrap()
			.with_links(Some(Links::new().with("self", "/notes/5")));
		write(&mut note, object);

		assert_eq!(note.id.as_deref(), Some("5"));
		assert_eq!(note.meta.as_ref().and_then(|m| m.integer("kept")), Some(1));
	}

	#[test]
	fn assignment_checks_types_and_cardinality() {
		let mut note = Note::default();
		let other = AnyHandle::new(Note {
			id: Some("2".into()),
			..Default::default()
		});

		assert_eq!(
			note.assign_linkage(0, Linkage::One(other.clone())),
			Err(Mismatch::Type {
				expected: "ResourceObject",
				found: "Note"
			})
		);
		assert_eq!(
			note.assign_linkage(0, Linkage::Many(Vec::new())),
			Err(Mismatch::Cardinality {
				expected: Cardinality::ToOne,
				found: Cardinality::ToMany
			})
		);
		assert!(matches!(
			note.assign_linkage(1, Linkage::Many(vec![thing("1").to_any(), other])),
			Err(Mismatch::Type { .. })
		));
		assert!(note.tags.is_empty());
	}
}
