use std::collections::HashMap;

use crate::util::ObjectReference;

/// For every finalizable object seen in a pass, whether it has been reached through a path that
/// does not go through one of the VM's finalizer records.
///
/// An object reached only through finalizer records is waiting for its finalizer to run. Stale
/// references reachable from it are spared in this pass, since the finalizer may still use them.
#[derive(Debug, Default)]
pub struct FinalizableReachability {
    reached: HashMap<ObjectReference, bool>,
}

impl FinalizableReachability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sighting of the finalizable `object`. `via_real_path` is false if the sighting
    /// came through a finalizer record. A flag that is already true stays true.
    pub fn record(&mut self, object: ObjectReference, via_real_path: bool) {
        let reached = self.reached.entry(object).or_insert(via_real_path);
        if !*reached {
            *reached = via_real_path;
        }
    }

    /// Has `object` been reached through a path without finalizer records?
    /// `None` if it has not been seen at all.
    pub fn is_reached(&self, object: ObjectReference) -> Option<bool> {
        self.reached.get(&object).copied()
    }

    /// Finalizable objects seen only through finalizer records.
    pub fn only_reached_for_finalization(&self) -> Vec<ObjectReference> {
        self.reached
            .iter()
            .filter(|(_, reached)| !**reached)
            .map(|(object, _)| *object)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.reached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reached.is_empty()
    }

    pub fn clear(&mut self) {
        self.reached.clear();
    }
}
