//! Resource graph unbinding.
//!
//! The [`Unbinder`] is the inverse of the [`Binder`](crate::Binder): it moves
//! the handles stored in relationship members into the relationships member
//! of each resource, as resource identifiers, and collects every resource
//! reachable from the primary data.
use std::collections::HashSet;

use crate::{member, AnyHandle, Error, Linkage, Relation, ResourceIdentifier};

pub struct Unbinder {
	primary: Vec<AnyHandle>,
	primary_ids: HashSet<ResourceIdentifier>,
	included: Vec<AnyHandle>,
	included_ids: HashSet<ResourceIdentifier>,
}

impl Unbinder {
	/// Creates an unbinder for the given primary resources, starting from
	/// an already declared set of included resources.
	pub fn new(primary: Vec<AnyHandle>, included: Vec<AnyHandle>) -> Result<Self, Error> {
		let primary_ids = primary
			.iter()
			.map(AnyHandle::identifier)
			.collect::<Result<_, _>>()?;

		let mut unbinder = Self {
			primary,
			primary_ids,
			included: Vec::with_capacity(included.len()),
			included_ids: HashSet::new(),
		};

		for handle in included {
			unbinder.include(handle)?;
		}

		Ok(unbinder)
	}

	/// Adds `handle` to the included resources, unless a resource with the
	/// same identifier is primary or already included.
	fn include(&mut self, handle: AnyHandle) -> Result<bool, Error> {
		let identifier = handle.identifier()?;

		if self.primary_ids.contains(&identifier) || !self.included_ids.insert(identifier) {
			return Ok(false);
		}

		self.included.push(handle);
		Ok(true)
	}

	/// Unbinds the whole graph and returns the included resources, or `None`
	/// if there are none.
	///
	/// Every relation is computed before any member is cleared, so the graph
	/// is left untouched when an identifier cannot be computed.
	pub fn unbind(mut self) -> Result<Option<Vec<AnyHandle>>, Error> {
		let mut plans = Vec::new();
		for handle in self.primary.clone() {
			plans.extend(self.plan(&handle)?);
		}

		// Planning an included resource may include more resources. Rounds
		// are repeated until one includes nothing new.
		let mut passes = 0;
		let mut planned = 0;
		while planned < self.included.len() {
			let round = self.included[planned..].to_vec();
			planned = self.included.len();
			passes += 1;

			for handle in &round {
				plans.extend(self.plan(handle)?);
			}
		}

		for plan in plans {
			plan.commit();
		}

		tracing::debug!(
			primary = self.primary.len(),
			included = self.included.len(),
			passes,
			"unbound resource graph"
		);

		Ok(if self.included.is_empty() {
			None
		} else {
			Some(self.included)
		})
	}

	/// Computes the relations of `handle` and includes the resources it
	/// refers to, without modifying it.
	fn plan(&mut self, handle: &AnyHandle) -> Result<Option<Plan>, Error> {
		// The lock is released before related resources are read, since they
		// may include this one.
		let (fields, linkages) = {
			let resource = handle.read();
			let fields = resource.relationship_fields();
			let linkages: Vec<Linkage> = (0..fields.len()).map(|i| resource.linkage(i)).collect();
			(fields, linkages)
		};

		if linkages.iter().all(Linkage::is_empty) {
			return Ok(None);
		}

		let mut relations = Vec::new();
		for (field, linkage) in fields.iter().zip(linkages) {
			match &linkage {
				Linkage::Empty => continue,
				Linkage::One(related) => {
					self.include(related.clone())?;
				}
				Linkage::Many(related) => {
					for related in related {
						self.include(related.clone())?;
					}
				}
			}

			// An emptied to-many member removes the relationship.
			relations.push((field.name, member::relation_of(linkage)?));
		}

		Ok(Some(Plan {
			handle: handle.clone(),
			relations,
		}))
	}
}

/// Relations computed for one resource, waiting to replace its
/// relationship members.
struct Plan {
	handle: AnyHandle,
	relations: Vec<(&'static str, Option<Relation>)>,
}

impl Plan {
	fn commit(self) {
		let mut resource = self.handle.write();
		for index in 0..resource.relationship_fields().len() {
			resource.take_linkage(index);
		}

		let mut relationships = resource.relationships_member().cloned().unwrap_or_default();
		for (name, relation) in self.relations {
			match relation {
				Some(relation) => {
					relationships.insert(name.to_string(), relation);
				}
				None => {
					relationships.remove(name);
				}
			}
		}

		resource.set_relationships_member(if relationships.is_empty() {
			None
		} else {
			Some(relationships)
		});
	}
}
