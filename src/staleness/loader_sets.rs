use std::collections::HashSet;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// The double-buffered sets of stale loaders.
///
/// Producers add loaders to the incoming set at any time. At the start of each pass the worker
/// merges the incoming set into the committed set, which is the only set staleness is checked
/// against. Operations that take both locks take the incoming lock first.
pub struct StaleLoaderSets<L: Copy + Eq + Hash> {
    incoming: Mutex<HashSet<L>>,
    committed: Mutex<HashSet<L>>,
    /// The size of the committed set, readable without its lock.
    committed_len: AtomicUsize,
}

impl<L: Copy + Eq + Hash> Default for StaleLoaderSets<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Copy + Eq + Hash> StaleLoaderSets<L> {
    pub fn new() -> Self {
        Self {
            incoming: Mutex::new(HashSet::new()),
            committed: Mutex::new(HashSet::new()),
            committed_len: AtomicUsize::new(0),
        }
    }

    /// Add `loader` to the incoming set.
    pub fn add_incoming(&self, loader: L) {
        let mut incoming = self.incoming.lock().unwrap();
        incoming.insert(loader);
    }

    /// Remove `loader` from both sets. Returns true if it was in either of them.
    pub fn remove(&self, loader: L) -> bool {
        let mut incoming = self.incoming.lock().unwrap();
        let mut committed = self.committed.lock().unwrap();
        let was_incoming = incoming.remove(&loader);
        let was_committed = committed.remove(&loader);
        self.committed_len.store(committed.len(), Ordering::Release);
        was_incoming || was_committed
    }

    /// Is `loader` in the committed set?
    pub fn is_committed(&self, loader: L) -> bool {
        if self.committed_len.load(Ordering::Acquire) == 0 {
            return false;
        }
        let committed = self.committed.lock().unwrap();
        committed.contains(&loader)
    }

    /// Is the committed set empty? Checked without taking its lock.
    pub fn is_committed_empty(&self) -> bool {
        self.committed_len.load(Ordering::Acquire) == 0
    }

    /// Merge the incoming set into the committed set, clear the incoming set, and return a copy
    /// of the resulting committed set.
    pub fn commit_incoming(&self) -> HashSet<L> {
        let mut incoming = self.incoming.lock().unwrap();
        let mut committed = self.committed.lock().unwrap();
        committed.extend(incoming.drain());
        self.committed_len.store(committed.len(), Ordering::Release);
        committed.clone()
    }

    #[cfg(test)]
    pub(crate) fn is_incoming(&self, loader: L) -> bool {
        self.incoming.lock().unwrap().contains(&loader)
    }
}
