use std::any::Any;

use crate::utils::short_type_name;
use crate::{AnyHandle, Cardinality, Links, Meta, Related, Relationships, Shape};

/// Typed resource, usually implemented with `#[derive(Resource)]`.
///
/// Exposes the members of the resource that hold JSON:API structure rather
/// than attributes: identity, links, meta, the bulk relationships map and the
/// relationship members holding handles to other resources. Every accessor
/// has a default so that types only implement the members they declare.
pub trait Resource: Any + Send + Sync {
	/// Resource type name declared by the Rust type.
	fn declared_type() -> Option<&'static str>
	where
		Self: Sized;

	/// Shape under which the registry resolves codecs for this type.
	fn shape() -> Shape
	where
		Self: Sized,
	{
		Shape::kind::<Self>()
	}

	/// Object-safe access to [`Resource::declared_type`].
	fn class_type(&self) -> Option<&'static str>;

	fn rust_type(&self) -> &'static str {
		short_type_name::<Self>()
	}

	fn type_member(&self) -> Option<&str> {
		None
	}

	fn set_type_member(&mut self, _value: String) {}

	fn id_member(&self) -> Option<&str> {
		None
	}

	fn set_id_member(&mut self, _value: String) {}

	fn lid_member(&self) -> Option<&str> {
		None
	}

	fn set_lid_member(&mut self, _value: String) {}

	fn relationships_member(&self) -> Option<&Relationships> {
		None
	}

	fn set_relationships_member(&mut self, _value: Option<Relationships>) {}

	fn links_member(&self) -> Option<&Links> {
		None
	}

	fn set_links_member(&mut self, _value: Links) {}

	fn meta_member(&self) -> Option<&Meta> {
		None
	}

	fn set_meta_member(&mut self, _value: Meta) {}

	/// Relationship members, in declaration order. Indexes into this table
	/// address the members in [`Resource::linkage`] and friends.
	fn relationship_fields(&self) -> &'static [RelationshipField] {
		&[]
	}

	/// Handles currently stored in the given relationship member.
	fn linkage(&self, _index: usize) -> Linkage {
		Linkage::Empty
	}

	/// Takes the handles out of the given relationship member, leaving it
	/// unset.
	fn take_linkage(&mut self, _index: usize) -> Linkage {
		Linkage::Empty
	}

	fn assign_linkage(&mut self, _index: usize, _linkage: Linkage) -> Result<(), Mismatch> {
		Ok(())
	}
}

/// Relationship member declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipField {
	/// Relationship name on the wire.
	pub name: &'static str,

	/// Rust member name.
	pub member: &'static str,

	pub cardinality: Cardinality,
}

/// Content of a relationship member.
#[derive(Debug, Clone)]
pub enum Linkage {
	Empty,
	One(AnyHandle),
	Many(Vec<AnyHandle>),
}

impl Linkage {
	pub fn from_one(handle: Option<AnyHandle>) -> Self {
		handle.map(Self::One).unwrap_or(Self::Empty)
	}

	pub fn from_many(handles: Option<Vec<AnyHandle>>) -> Self {
		handles.map(Self::Many).unwrap_or(Self::Empty)
	}

	pub fn is_empty(&self) -> bool {
		matches!(self, Self::Empty)
	}

	pub fn cardinality(&self) -> Option<Cardinality> {
		match self {
			Self::Empty => None,
			Self::One(_) => Some(Cardinality::ToOne),
			Self::Many(_) => Some(Cardinality::ToMany),
		}
	}
}

/// Reason a linkage cannot be assigned to a relationship member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
	Cardinality { expected: Cardinality, found: Cardinality },
	Type { expected: &'static str, found: &'static str },
}

/// Field storing an optional JSON:API member of a resource.
///
/// Implemented by `Option<T>`, and by `String`, `Links` and `Meta` where the
/// empty value stands for an absent member.
pub trait OptionalMember<T> {
	fn get(&self) -> Option<&T>;

	fn set(&mut self, value: Option<T>);
}

impl<T> OptionalMember<T> for Option<T> {
	fn get(&self) -> Option<&T> {
		self.as_ref()
	}

	fn set(&mut self, value: Option<T>) {
		*self = value
	}
}

impl OptionalMember<String> for String {
	fn get(&self) -> Option<&String> {
		if self.is_empty() {
			None
		} else {
			Some(self)
		}
	}

	fn set(&mut self, value: Option<String>) {
		*self = value.unwrap_or_default()
	}
}

impl OptionalMember<Relationships> for Relationships {
	fn get(&self) -> Option<&Relationships> {
		if self.is_empty() {
			None
		} else {
			Some(self)
		}
	}

	fn set(&mut self, value: Option<Relationships>) {
		*self = value.unwrap_or_default()
	}
}

impl OptionalMember<Links> for Links {
	fn get(&self) -> Option<&Links> {
		if self.is_empty() {
			None
		} else {
			Some(self)
		}
	}

	fn set(&mut self, value: Option<Links>) {
		*self = value.unwrap_or_default()
	}
}

impl OptionalMember<Meta> for Meta {
	fn get(&self) -> Option<&Meta> {
		if self.is_empty() {
			None
		} else {
			Some(self)
		}
	}

	fn set(&mut self, value: Option<Meta>) {
		*self = value.unwrap_or_default()
	}
}

/// Member holding at most one related resource.
pub trait ToOneMember {
	fn element_type() -> &'static str;

	fn linkage(&self) -> Option<AnyHandle>;

	fn take(&mut self) -> Option<AnyHandle>;

	fn assign(&mut self, handle: AnyHandle) -> Result<(), AnyHandle>;
}

impl<H: Related> ToOneMember for Option<H> {
	fn element_type() -> &'static str {
		H::type_label()
	}

	fn linkage(&self) -> Option<AnyHandle> {
		self.as_ref().map(H::to_any)
	}

	fn take(&mut self) -> Option<AnyHandle> {
		Option::take(self).map(|h| h.to_any())
	}

	fn assign(&mut self, handle: AnyHandle) -> Result<(), AnyHandle> {
		*self = Some(H::from_any(handle)?);
		Ok(())
	}
}

/// Member holding an ordered sequence of related resources.
pub trait ToManyMember {
	fn element_type() -> &'static str;

	fn linkage(&self) -> Option<Vec<AnyHandle>>;

	fn take(&mut self) -> Option<Vec<AnyHandle>>;

	fn assign(&mut self, handles: Vec<AnyHandle>) -> Result<(), AnyHandle>;
}

fn convert_all<H: Related>(handles: Vec<AnyHandle>) -> Result<Vec<H>, AnyHandle> {
	handles.into_iter().map(H::from_any).collect()
}

/// A vector is always set: an empty vector means no related resources.
impl<H: Related> ToManyMember for Vec<H> {
	fn element_type() -> &'static str {
		H::type_label()
	}

	fn linkage(&self) -> Option<Vec<AnyHandle>> {
		Some(self.iter().map(H::to_any).collect())
	}

	fn take(&mut self) -> Option<Vec<AnyHandle>> {
		Some(std::mem::take(self).iter().map(H::to_any).collect())
	}

	fn assign(&mut self, handles: Vec<AnyHandle>) -> Result<(), AnyHandle> {
		*self = convert_all(handles)?;
		Ok(())
	}
}

impl<H: Related> ToManyMember for Option<Vec<H>> {
	fn element_type() -> &'static str {
		H::type_label()
	}

	fn linkage(&self) -> Option<Vec<AnyHandle>> {
		self.as_ref().map(|v| v.iter().map(H::to_any).collect())
	}

	fn take(&mut self) -> Option<Vec<AnyHandle>> {
		Option::take(self).map(|v| v.iter().map(H::to_any).collect())
	}

	fn assign(&mut self, handles: Vec<AnyHandle>) -> Result<(), AnyHandle> {
		*self = Some(convert_all(handles)?);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Handle, ResourceObject};

	fn thing(id: &str) -> Handle<ResourceObject> {
		Handle::new(ResourceObject::new("things", Some(id.to_string()), None).unwrap())
	}

	#[test]
	fn to_one_slot_round_trip() {
		let mut slot: Option<Handle<ResourceObject>> = None;
		assert!(ToOneMember::linkage(&slot).is_none());

		ToOneMember::assign(&mut slot, thing("1").to_any()).unwrap();
		assert!(ToOneMember::linkage(&slot).is_some());

		let taken = ToOneMember::take(&mut slot).unwrap();
		assert_eq!(taken.identifier().unwrap().id(), Some("1"));
		assert!(slot.is_none());
	}

	#[test]
	fn to_many_vec_is_never_unset() {
		let mut slot: Vec<Handle<ResourceObject>> = Vec::new();
		assert_eq!(ToManyMember::linkage(&slot).map(|v| v.len()), Some(0));

		ToManyMember::assign(&mut slot, vec![thing("1").to_any(), thing("2").to_any()]).unwrap();
		assert_eq!(ToManyMember::linkage(&slot).map(|v| v.len()), Some(2));
		assert_eq!(ToManyMember::take(&mut slot).map(|v| v.len()), Some(2));
		assert!(slot.is_empty());
		assert_eq!(ToManyMember::take(&mut slot).map(|v| v.len()), Some(0));
	}

	#[test]
	fn optional_to_many_keeps_empty_sequences() {
		let mut slot: Option<Vec<AnyHandle>> = Some(Vec::new());
		assert_eq!(ToManyMember::linkage(&slot).map(|v| v.len()), Some(0));
		assert_eq!(<Option<Vec<AnyHandle>> as ToManyMember>::element_type(), "dyn Resource");
		assert_eq!(ToManyMember::take(&mut slot).map(|v| v.len()), Some(0));
		assert!(slot.is_none());
	}

	#[test]
	fn empty_members_read_as_absent() {
		let mut id = String::new();
		assert!(OptionalMember::<String>::get(&id).is_none());
		OptionalMember::set(&mut id, Some("1".to_string()));
		assert_eq!(OptionalMember::<String>::get(&id).map(String::as_str), Some("1"));

		let mut meta = Meta::new();
		assert!(OptionalMember::<Meta>::get(&meta).is_none());
		OptionalMember::set(&mut meta, Some(Meta::new().with("page", 2)));
		assert_eq!(OptionalMember::<Meta>::get(&meta).and_then(|m| m.integer("page")), Some(2));

		let mut links: Option<Links> = None;
		OptionalMember::set(&mut links, Some(Links::new()));
		assert!(OptionalMember::<Links>::get(&links).is_some());
	}
}
