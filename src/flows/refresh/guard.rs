// crates.io
use async_lock::MutexGuardArc;
// self
use crate::_prelude::*;

type Slots = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// Per-key async mutual exclusion.
///
/// Each key gets its own async mutex, created on first use and dropped once no task holds or
/// waits on it. Holders of different keys never contend.
#[derive(Clone, Default)]
pub struct KeyedGuards {
	slots: Slots,
}
impl KeyedGuards {
	/// Waits until the guard for `key` is free and takes it.
	///
	/// Dropping the returned [`KeyGuard`], or the future before it resolves, releases the slot.
	pub async fn lock(&self, key: &str) -> KeyGuard {
		let lease = SlotLease { slots: self.slots.clone(), key: key.to_owned() };
		let pending = lease.slot().lock_arc();
		let guard = pending.await;

		KeyGuard { _guard: guard, _lease: lease }
	}

	/// Number of keys currently held or awaited.
	pub fn len(&self) -> usize {
		self.slots.lock().len()
	}

	/// Returns `true` when no key is held or awaited.
	pub fn is_empty(&self) -> bool {
		self.slots.lock().is_empty()
	}
}
impl Debug for KeyedGuards {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("KeyedGuards").field("slots", &self.len()).finish()
	}
}

/// Exclusive hold on one key of a [`KeyedGuards`].
pub struct KeyGuard {
	// Field order matters: the mutex guard must drop before the lease inspects the slot.
	_guard: MutexGuardArc<()>,
	_lease: SlotLease,
}
impl Debug for KeyGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("KeyGuard(..)")
	}
}

// Holds no reference to the slot itself: only pending locks and held guards do, so the map's
// copy is the last one exactly when nobody holds or awaits the key.
struct SlotLease {
	slots: Slots,
	key: String,
}
impl SlotLease {
	fn slot(&self) -> Arc<AsyncMutex<()>> {
		self.slots
			.lock()
			.entry(self.key.clone())
			.or_insert_with(|| Arc::new(AsyncMutex::new(())))
			.clone()
	}
}
impl Drop for SlotLease {
	fn drop(&mut self) {
		let mut slots = self.slots.lock();

		if slots.get(&self.key).is_some_and(|slot| Arc::strong_count(slot) == 1) {
			slots.remove(&self.key);
		}
	}
}
