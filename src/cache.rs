//! Bounded-lifetime key/value store with lazy expiry.
//!
//! [`ExpiringCache`] is a plain map whose entries carry an absolute deadline. Expired entries are
//! dropped when they are looked up, when the cache needs room, or when
//! [`ExpiringCache::purge_expired`] runs. The cache is not synchronized; owners wrap it in a
//! lock scoped to their own invariants.

// std
use std::borrow::Borrow;
// self
use crate::_prelude::*;

#[derive(Clone, Debug)]
struct CacheEntry<V> {
	value: V,
	expires_at: OffsetDateTime,
}

/// Map with a fixed per-entry time-to-live and an optional capacity.
#[derive(Clone, Debug)]
pub struct ExpiringCache<K, V> {
	entries: HashMap<K, CacheEntry<V>>,
	ttl: Duration,
	capacity: Option<usize>,
}
impl<K, V> ExpiringCache<K, V>
where
	K: Clone + Eq + Hash,
	V: Clone,
{
	/// Creates an unbounded cache; negative TTLs are clamped to zero.
	pub fn new(ttl: Duration) -> Self {
		Self {
			entries: HashMap::new(),
			ttl: if ttl.is_negative() { Duration::ZERO } else { ttl },
			capacity: None,
		}
	}

	/// Caps the number of live entries. A capacity of zero disables storage.
	pub fn with_capacity_limit(mut self, capacity: usize) -> Self {
		self.capacity = Some(capacity);

		self
	}

	/// Lifetime given to every inserted entry.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Number of stored entries, including expired ones not yet purged.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Returns the live value for `key` at `now`, dropping it if it has expired.
	pub fn get_at<Q>(&mut self, key: &Q, now: OffsetDateTime) -> Option<V>
	where
		K: Borrow<Q>,
		Q: ?Sized + Eq + Hash,
	{
		let expires_at = self.entries.get(key)?.expires_at;

		if now >= expires_at {
			self.entries.remove(key);

			return None;
		}

		self.entries.get(key).map(|entry| entry.value.clone())
	}

	/// [`get_at`](Self::get_at) against the current clock.
	pub fn get<Q>(&mut self, key: &Q) -> Option<V>
	where
		K: Borrow<Q>,
		Q: ?Sized + Eq + Hash,
	{
		self.get_at(key, OffsetDateTime::now_utc())
	}

	/// Stores `value` under `key` until `now + ttl`, replacing any previous entry.
	///
	/// When the cache is full, expired entries go first, then the entry closest to expiry.
	pub fn insert_at(&mut self, key: K, value: V, now: OffsetDateTime) {
		let Some(expires_at) = now.checked_add(self.ttl) else {
			return;
		};

		if self.capacity == Some(0) {
			return;
		}
		if !self.entries.contains_key(&key) {
			self.make_room(now);
		}

		self.entries.insert(key, CacheEntry { value, expires_at });
	}

	/// [`insert_at`](Self::insert_at) against the current clock.
	pub fn insert(&mut self, key: K, value: V) {
		self.insert_at(key, value, OffsetDateTime::now_utc());
	}

	/// Removes `key`, returning its value even when it has already expired.
	pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
	where
		K: Borrow<Q>,
		Q: ?Sized + Eq + Hash,
	{
		self.entries.remove(key).map(|entry| entry.value)
	}

	/// Drops every entry expired at `now`; returns how many were removed.
	pub fn purge_expired_at(&mut self, now: OffsetDateTime) -> usize {
		let before = self.entries.len();

		self.entries.retain(|_, entry| now < entry.expires_at);

		before - self.entries.len()
	}

	/// [`purge_expired_at`](Self::purge_expired_at) against the current clock.
	pub fn purge_expired(&mut self) -> usize {
		self.purge_expired_at(OffsetDateTime::now_utc())
	}

	fn make_room(&mut self, now: OffsetDateTime) {
		let Some(capacity) = self.capacity else {
			return;
		};

		if self.entries.len() < capacity {
			return;
		}

		self.purge_expired_at(now);

		while self.entries.len() >= capacity {
			let Some(victim) = self
				.entries
				.iter()
				.min_by_key(|(_, entry)| entry.expires_at)
				.map(|(key, _)| key.clone())
			else {
				break;
			};

			self.entries.remove(&victim);
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	const T0: OffsetDateTime = macros::datetime!(2025-01-01 00:00 UTC);

	#[test]
	fn entries_expire_lazily_on_lookup() {
		let mut cache = ExpiringCache::new(Duration::minutes(1));

		cache.insert_at("stale".to_owned(), "fresh", T0);

		assert_eq!(cache.get_at("stale", T0 + Duration::seconds(59)), Some("fresh"));
		assert_eq!(cache.len(), 1);
		assert_eq!(cache.get_at("stale", T0 + Duration::minutes(1)), None);
		assert!(cache.is_empty(), "Expired entries must be dropped on lookup.");
	}

	#[test]
	fn reinsert_extends_lifetime() {
		let mut cache = ExpiringCache::new(Duration::seconds(10));

		cache.insert_at(1, 'a', T0);
		cache.insert_at(1, 'b', T0 + Duration::seconds(8));

		assert_eq!(cache.get_at(&1, T0 + Duration::seconds(15)), Some('b'));
	}

	#[test]
	fn remove_returns_value_regardless_of_expiry() {
		let mut cache = ExpiringCache::new(Duration::seconds(1));

		cache.insert_at(7, "x", T0);

		assert_eq!(cache.remove(&7), Some("x"));
		assert_eq!(cache.remove(&7), None);
	}

	#[test]
	fn purge_reports_removed_entries() {
		let mut cache = ExpiringCache::new(Duration::seconds(30));

		cache.insert_at(1, (), T0);
		cache.insert_at(2, (), T0 + Duration::seconds(20));

		assert_eq!(cache.purge_expired_at(T0 + Duration::seconds(30)), 1);
		assert_eq!(cache.len(), 1);
		assert_eq!(cache.get_at(&2, T0 + Duration::seconds(30)), Some(()));
	}

	#[test]
	fn capacity_prefers_expired_then_oldest_victims() {
		let mut cache = ExpiringCache::new(Duration::seconds(30)).with_capacity_limit(2);

		cache.insert_at("a", 1, T0);
		cache.insert_at("b", 2, T0 + Duration::seconds(5));
		cache.insert_at("c", 3, T0 + Duration::seconds(10));

		assert_eq!(cache.len(), 2);
		assert_eq!(cache.get_at("a", T0 + Duration::seconds(10)), None);
		assert_eq!(cache.get_at("b", T0 + Duration::seconds(10)), Some(2));

		cache.insert_at("d", 4, T0 + Duration::seconds(38));

		assert_eq!(cache.len(), 2);
		assert_eq!(cache.get_at("c", T0 + Duration::seconds(39)), Some(3));
		assert_eq!(cache.get_at("d", T0 + Duration::seconds(40)), Some(4));
	}

	#[test]
	fn zero_capacity_and_negative_ttl_store_nothing_useful() {
		let mut disabled = ExpiringCache::new(Duration::minutes(1)).with_capacity_limit(0);

		disabled.insert_at(1, 1, T0);

		assert!(disabled.is_empty());

		let mut instant = ExpiringCache::new(Duration::seconds(-5));

		assert_eq!(instant.ttl(), Duration::ZERO);

		instant.insert_at(1, 1, T0);

		assert_eq!(instant.get_at(&1, T0), None);
	}
}
