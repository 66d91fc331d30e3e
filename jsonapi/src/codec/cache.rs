use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::Error;

/// Shared cache of resolved values, keyed by request.
pub struct Cache<K, T: ?Sized> {
	index: RwLock<HashMap<K, Arc<T>>>,
}

impl<K, T: ?Sized> Default for Cache<K, T> {
	fn default() -> Self {
		Self {
			index: RwLock::new(HashMap::new()),
		}
	}
}

impl<K: Eq + Hash + Clone, T: ?Sized> Cache<K, T> {
	pub fn get(&self, key: &K) -> Option<Arc<T>> {
		self.index.read().get(key).cloned()
	}

	/// Stores `value`, unless a value was stored for `key` in the meantime,
	/// and returns the stored value.
	pub fn set(&self, key: K, value: Arc<T>) -> Arc<T> {
		self.index.write().entry(key).or_insert(value).clone()
	}

	/// Returns the cached value or initializes it.
	///
	/// No lock is held while `init` runs, so `init` may use the cache.
	pub fn get_or_insert(
		&self,
		key: &K,
		init: impl FnOnce() -> Result<Arc<T>, Error>,
	) -> Result<Arc<T>, Error> {
		match self.get(key) {
			Some(value) => Ok(value),
			None => Ok(self.set(key.clone(), init()?)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_stored_value_wins() {
		let cache: Cache<u32, str> = Cache::default();
		let a = cache.set(1, Arc::from("a"));
		let b = cache.set(1, Arc::from("b"));

		assert!(Arc::ptr_eq(&a, &b));
		assert_eq!(cache.get(&1).as_deref(), Some("a"));
	}

	#[test]
	fn initializer_may_reenter_the_cache() {
		let cache: Cache<u32, str> = Cache::default();
		let value = cache
			.get_or_insert(&2, || {
				let inner = cache.get_or_insert(&1, || Ok(Arc::from("inner")))?;
				Ok(Arc::from(format!("outer({inner})").as_str()))
			})
			.unwrap();

		assert_eq!(&*value, "outer(inner)");
		assert_eq!(cache.get(&1).as_deref(), Some("inner"));
	}

	#[test]
	fn failed_initialization_is_not_cached() {
		let cache: Cache<u32, str> = Cache::default();
		assert!(cache.get_or_insert(&1, || Err(Error::MissingData)).is_err());
		assert!(cache.get(&1).is_none());
	}
}
