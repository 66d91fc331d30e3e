//! Resource graph binding.
//!
//! Decoded resources refer to each other through resource identifiers. The
//! [`Binder`] replaces these references with handles to the resources of the
//! document, storing them in the relationship members of each resource.
use std::collections::HashMap;

use crate::{
	member, AnyHandle, Error, Linkage, Mismatch, Relation, RelationshipField, Relationships,
	ResourceIdentifier,
};

/// Resource of a document, with the identifier and relationships it was
/// decoded from.
#[derive(Debug, Clone)]
pub struct Entry {
	identifier: ResourceIdentifier,
	relationships: Option<Relationships>,
	handle: AnyHandle,
}

impl Entry {
	pub fn new(
		identifier: ResourceIdentifier,
		relationships: Option<Relationships>,
		handle: AnyHandle,
	) -> Self {
		Self {
			identifier,
			relationships,
			handle,
		}
	}

	/// Entry of a resource, read from its members.
	pub fn read(handle: AnyHandle) -> Result<Self, Error> {
		let (identifier, relationships) = {
			let resource = handle.read();
			(
				member::identifier(&*resource)?,
				resource.relationships_member().cloned(),
			)
		};

		Ok(Self::new(identifier, relationships, handle))
	}

	pub fn identifier(&self) -> &ResourceIdentifier {
		&self.identifier
	}

	pub fn handle(&self) -> &AnyHandle {
		&self.handle
	}
}

pub struct Binder {
	entries: Vec<Entry>,
	index: HashMap<ResourceIdentifier, usize>,
}

impl Binder {
	/// Creates a binder over the given resources. When two entries share an
	/// identifier, references resolve to the first one.
	pub fn new(entries: Vec<Entry>) -> Self {
		let mut index = HashMap::with_capacity(entries.len());

		for (i, entry) in entries.iter().enumerate() {
			index.entry(entry.identifier.clone()).or_insert(i);
		}

		Self { entries, index }
	}

	/// Creates a binder over resources whose relationships are stored in
	/// their relationships member.
	pub fn from_resources(resources: impl IntoIterator<Item = AnyHandle>) -> Result<Self, Error> {
		Ok(Self::new(
			resources
				.into_iter()
				.map(Entry::read)
				.collect::<Result<_, _>>()?,
		))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	fn resolve(&self, identifier: &ResourceIdentifier) -> Option<&AnyHandle> {
		self.index.get(identifier).map(|&i| &self.entries[i].handle)
	}

	/// Binds the relationship members of every resource.
	///
	/// Unresolved identifiers are skipped, leaving the member as it is.
	pub fn bind(&self) -> Result<(), Error> {
		for entry in &self.entries {
			self.bind_entry(entry)?;
		}

		tracing::debug!(resources = self.entries.len(), "bound resource graph");
		Ok(())
	}

	fn bind_entry(&self, entry: &Entry) -> Result<(), Error> {
		let Some(relationships) = &entry.relationships else {
			return Ok(());
		};

		let fields = entry.handle.read().relationship_fields();

		let mut linkages = Vec::new();
		for (index, field) in fields.iter().enumerate() {
			let Some(relation) = relationships.get(field.name) else {
				continue;
			};

			let linkage = self.linkage(relation);
			if linkage.is_empty() {
				tracing::trace!(
					resource = %entry.identifier,
					relationship = field.name,
					"no related resource found"
				);
				continue;
			}

			linkages.push((index, field, linkage));
		}

		if linkages.is_empty() {
			return Ok(());
		}

		// Related handles are resolved before locking, so that a resource
		// referring to itself does not deadlock.
		let mut resource = entry.handle.write();
		let owner = resource.rust_type();

		for (index, field, linkage) in linkages {
			resource
				.assign_linkage(index, linkage)
				.map_err(|mismatch| binding_error(owner, field, mismatch))?;
		}

		Ok(())
	}

	/// Handles referred to by `relation`, skipping unresolved identifiers.
	fn linkage(&self, relation: &Relation) -> Linkage {
		match relation {
			Relation::ToOne { data, .. } => Linkage::from_one(
				data.as_ref()
					.and_then(|identifier| self.resolve(identifier))
					.cloned(),
			),
			Relation::ToMany { data, .. } => Linkage::Many(
				data.iter()
					.filter_map(|identifier| self.resolve(identifier))
					.cloned()
					.collect(),
			),
		}
	}
}

fn binding_error(owner: &'static str, field: &RelationshipField, mismatch: Mismatch) -> Error {
	match mismatch {
		Mismatch::Cardinality { expected, found } => Error::Cardinality {
			owner,
			member: field.member,
			name: field.name,
			expected,
			found,
		},
		Mismatch::Type { expected, found } => Error::Binding {
			owner,
			member: field.member,
			name: field.name,
			expected,
			found,
		},
	}
}
