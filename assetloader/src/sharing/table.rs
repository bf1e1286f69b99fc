//! Checksum table.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

type Slot<T> = Arc<Mutex<Option<Arc<T>>>>;

/// Map from checksum to a loaded resource, with hit/load accounting.
///
/// The table never evicts; it grows for the whole session and is emptied
/// by [`ChecksumTable::clear`] at teardown.
pub struct ChecksumTable<T> {
    slots: Mutex<HashMap<String, Slot<T>>>,
    /// Statistics - using atomics for lock-free updates
    hits: AtomicU64,
    loads: AtomicU64,
}

impl<T> Default for ChecksumTable<T> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            loads: AtomicU64::new(0),
        }
    }
}

impl<T> fmt::Debug for ChecksumTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChecksumTable")
            .field("entries", &self.len())
            .field("hits", &self.hits())
            .field("loads", &self.loads())
            .finish()
    }
}

impl<T> ChecksumTable<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the resource for `checksum`, loading it on first request.
    ///
    /// The table lock is released before `loader` runs. The slot lock for
    /// this checksum is held during the load, so concurrent requests for the
    /// same checksum load it once. If `loader` fails the error is returned
    /// and no entry is stored.
    pub fn get_or_load<E>(
        &self,
        checksum: &str,
        loader: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(checksum.to_string()).or_default())
        };

        let mut guard = slot.lock();
        if let Some(existing) = guard.as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(existing));
        }

        match loader() {
            Ok(value) => {
                let value = Arc::new(value);
                *guard = Some(Arc::clone(&value));
                self.loads.fetch_add(1, Ordering::Relaxed);
                Ok(value)
            }
            Err(e) => {
                drop(guard);
                drop(slot);
                self.remove_empty(checksum);
                Err(e)
            }
        }
    }

    /// Load without consulting or writing the table.
    pub fn load_unshared<E>(&self, loader: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        let value = Arc::new(loader()?);
        self.loads.fetch_add(1, Ordering::Relaxed);
        Ok(value)
    }

    /// Drop the slot for `checksum` if it is empty and nobody else holds it.
    ///
    /// A request parked on the slot keeps it in the table, so whatever that
    /// request loads is what later requests find.
    fn remove_empty(&self, checksum: &str) {
        let mut slots = self.slots.lock();
        let unused = slots
            .get(checksum)
            .is_some_and(|slot| Arc::strong_count(slot) == 1 && slot.lock().is_none());
        if unused {
            slots.remove(checksum);
        }
    }

    /// Check if a checksum has a loaded entry.
    pub fn contains(&self, checksum: &str) -> bool {
        let slot = self.slots.lock().get(checksum).cloned();
        slot.map(|s| s.lock().is_some()).unwrap_or(false)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Requests served from the table.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Loader invocations that succeeded.
    pub fn loads(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    /// Release every entry.
    pub fn clear(&self) {
        self.slots.lock().clear();
    }
}
