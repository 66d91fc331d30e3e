use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use educe::Educe;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::utils::short_type_name;
use crate::{member, Error, Resource, ResourceIdentifier};

/// Shared handle to a typed resource.
///
/// Resources of a document graph reference each other through handles, so
/// binding and unbinding can update relationship members in place. Reads
/// are recursive: a resource may be read while another read of it is alive.
#[derive(Educe)]
#[educe(Clone)]
pub struct Handle<T>(Arc<RwLock<T>>);

impl<T: Resource> Handle<T> {
	pub fn new(resource: T) -> Self {
		Self(Arc::new(RwLock::new(resource)))
	}

	pub fn read(&self) -> RwLockReadGuard<'_, T> {
		self.0.read_recursive()
	}

	pub fn write(&self) -> RwLockWriteGuard<'_, T> {
		self.0.write()
	}

	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}

	pub fn to_any(&self) -> AnyHandle {
		AnyHandle::from_arc(self.0.clone())
	}

	pub fn identifier(&self) -> Result<ResourceIdentifier, Error> {
		member::identifier(&*self.read())
	}
}

impl<T: Resource> PartialEq for Handle<T> {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other) || same_identifier(self.identifier(), other.identifier())
	}
}

impl<T: Resource> fmt::Debug for Handle<T> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self.0.try_read_recursive() {
			Some(resource) => debug_identity(f, &*resource),
			None => write!(f, "Handle(<locked>)"),
		}
	}
}

impl<T: Resource> From<Handle<T>> for AnyHandle {
	fn from(handle: Handle<T>) -> Self {
		AnyHandle::from_arc(handle.0)
	}
}

/// Type-erased handle to a resource of any kind.
#[derive(Clone)]
pub struct AnyHandle {
	cell: Arc<dyn Any + Send + Sync>,
	resource: Arc<RwLock<dyn Resource>>,
	type_id: TypeId,
	rust_type: &'static str,
}

impl AnyHandle {
	pub fn new<T: Resource>(resource: T) -> Self {
		Handle::new(resource).into()
	}

	fn from_arc<T: Resource>(arc: Arc<RwLock<T>>) -> Self {
		Self {
			cell: arc.clone(),
			resource: arc,
			type_id: TypeId::of::<T>(),
			rust_type: short_type_name::<T>(),
		}
	}

	pub fn read(&self) -> RwLockReadGuard<'_, dyn Resource> {
		self.resource.read_recursive()
	}

	pub fn write(&self) -> RwLockWriteGuard<'_, dyn Resource> {
		self.resource.write()
	}

	/// Rust type of the resource behind this handle.
	pub fn rust_type(&self) -> &'static str {
		self.rust_type
	}

	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	pub fn is<T: Resource>(&self) -> bool {
		self.type_id == TypeId::of::<T>()
	}

	pub fn downcast<T: Resource>(&self) -> Option<Handle<T>> {
		self.cell.clone().downcast::<RwLock<T>>().ok().map(Handle)
	}

	/// Checks if both handles point to the same resource.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::as_ptr(&self.cell) as *const () == Arc::as_ptr(&other.cell) as *const ()
	}

	pub fn identifier(&self) -> Result<ResourceIdentifier, Error> {
		member::identifier(&*self.read())
	}
}

impl PartialEq for AnyHandle {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other) || same_identifier(self.identifier(), other.identifier())
	}
}

impl fmt::Debug for AnyHandle {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self.resource.try_read_recursive() {
			Some(resource) => debug_identity(f, &*resource),
			None => write!(f, "AnyHandle(<locked>)"),
		}
	}
}

fn same_identifier(
	a: Result<ResourceIdentifier, Error>,
	b: Result<ResourceIdentifier, Error>,
) -> bool {
	matches!((a, b), (Ok(a), Ok(b)) if a == b)
}

fn debug_identity(f: &mut fmt::Formatter, resource: &dyn Resource) -> fmt::Result {
	match member::identifier(resource) {
		Ok(id) => write!(f, "{}({id})", resource.rust_type()),
		Err(_) => write!(f, "{}(<unidentified>)", resource.rust_type()),
	}
}

/// Value that can stand in a relationship member: a typed or erased handle.
pub trait Related: Sized {
	/// Name of the resource type accepted, for error messages.
	fn type_label() -> &'static str;

	fn from_any(handle: AnyHandle) -> Result<Self, AnyHandle>;

	fn to_any(&self) -> AnyHandle;
}

impl<T: Resource> Related for Handle<T> {
	fn type_label() -> &'static str {
		short_type_name::<T>()
	}

	fn from_any(handle: AnyHandle) -> Result<Self, AnyHandle> {
		handle.downcast().ok_or(handle)
	}

	fn to_any(&self) -> AnyHandle {
		Handle::to_any(self)
	}
}

impl Related for AnyHandle {
	fn type_label() -> &'static str {
		"dyn Resource"
	}

	fn from_any(handle: AnyHandle) -> Result<Self, AnyHandle> {
		Ok(handle)
	}

	fn to_any(&self) -> AnyHandle {
		self.clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ResourceObject;

	fn object(id: &str) -> ResourceObject {
		ResourceObject::new("things", Some(id.to_string()), None).unwrap()
	}

	#[test]
	fn downcast_checks_the_concrete_type() {
		let handle = AnyHandle::new(object("1"));

		assert!(handle.is::<ResourceObject>());
		assert_eq!(handle.rust_type(), "ResourceObject");
		assert!(handle.downcast::<ResourceObject>().is_some());
	}

	#[test]
	fn erased_and_typed_handles_share_the_resource() {
		let typed = Handle::new(object("1"));
		let erased = typed.to_any();

		assert!(erased.ptr_eq(&typed.to_any()));
		let back = erased.downcast::<ResourceObject>().unwrap();
		assert!(back.ptr_eq(&typed));

		erased.write().set_id_member("2".to_string());
		assert_eq!(typed.read().id(), Some("2"));
	}

	#[test]
	fn equality_falls_back_to_identifiers() {
		let a = Handle::new(object("1"));
		let b = Handle::new(object("1"));
		let c = Handle::new(object("2"));

		assert_eq!(a, b);
		assert_ne!(a, c);
		assert_eq!(format!("{a:?}"), "ResourceObject(things:1)");
	}

	#[test]
	fn debug_does_not_block_on_readers() {
		let handle = AnyHandle::new(object("1"));
		let _reader = handle.read();
		assert_eq!(format!("{handle:?}"), "ResourceObject(things:1)");
	}
}
