use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;

use super::finalizable::FinalizableReachability;
use super::stale_reference::{ResetOutcome, StaleReference};
use super::StalenessEngine;
use crate::heap_walker::{HeapWalker, HeapWalkerListener};
use crate::util::log::{debug, info, trace};
use crate::util::ObjectReference;
use crate::util::VMWorkerThread;
use crate::vm::*;

/// Counters of one pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Stale objects discovered without a slot.
    pub stale_objects_found: usize,
    /// Slots recorded as candidates for clearing.
    pub candidates_recorded: usize,
    /// Stale targets skipped because they were reached through a weak reference.
    pub skipped_weak: usize,
    /// Stale targets skipped because they were reached through a finalizer record.
    pub skipped_for_finalization: usize,
    /// Candidates excluded because they are reachable from an object waiting for finalization.
    pub excluded: usize,
    /// Slots cleared.
    pub reset: usize,
    /// Slots cleared whose target had a monitor.
    pub reset_with_monitor: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SkipReason {
    WeakReference,
    Finalization,
}

/// The skip rules. A stale `target` reached through a weak reference is left for the VM's GC.
/// A stale finalizable `target` reached through a finalizer record is kept for its finalizer.
fn skip_reason<VM: VMBinding>(
    target: ObjectReference,
    referent: Option<ObjectReference>,
) -> Option<SkipReason> {
    let referent = referent?;
    if VM::VMObjectModel::is_weak_reference(referent) {
        Some(SkipReason::WeakReference)
    } else if VM::VMObjectModel::is_finalizer_record(referent)
        && VM::VMObjectModel::has_finalizer(target)
    {
        Some(SkipReason::Finalization)
    } else {
        None
    }
}

/// Check `object` against the committed loader snapshot of the running pass.
fn is_stale_in<VM: VMBinding>(
    stale_loaders: &HashSet<VM::VMLoader>,
    object: ObjectReference,
) -> bool {
    debug_assert!(
        VM::VMCollection::is_at_safepoint(),
        "The pass snapshot of stale loaders is only valid at a safepoint"
    );
    if stale_loaders.is_empty() {
        return false;
    }
    VM::VMObjectModel::loader_of(object).is_some_and(|loader| stale_loaders.contains(&loader))
}

/// The listener of one pass of the incinerator.
///
/// It classifies every discovered reference, collects the slots holding stale references, and
/// clears them in its epilogue. It reads the stale loaders from a snapshot taken in its prologue,
/// so staleness checks during the pass take no lock. Loaders unloaded while the walk runs are
/// dropped from the snapshot before anything is cleared, but in non-deferred mode a slot may
/// already have been cleared by then. A pass can only be created by the worker through
/// [`StalenessEngine::begin_pass`].
pub struct StaleReferencePass<'a, VM: VMBinding> {
    engine: &'a StalenessEngine<VM>,
    /// Walks the subgraphs of objects waiting for finalization, while the main walk is in its
    /// epilogue.
    exclusion_walker: &'a mut HeapWalker<VM>,
    defer_for_finalization: bool,
    stale_loaders: HashSet<VM::VMLoader>,
    candidates: HashMap<VM::VMSlot, StaleReference<VM::VMSlot>>,
    finalizable: FinalizableReachability,
    stats: PassStats,
}

impl<'a, VM: VMBinding> StaleReferencePass<'a, VM> {
    pub(super) fn new(
        engine: &'a StalenessEngine<VM>,
        exclusion_walker: &'a mut HeapWalker<VM>,
        defer_for_finalization: bool,
    ) -> Self {
        Self {
            engine,
            exclusion_walker,
            defer_for_finalization,
            stale_loaders: HashSet::new(),
            candidates: HashMap::new(),
            finalizable: FinalizableReachability::new(),
            stats: PassStats::default(),
        }
    }

    /// Is `object` stale according to the snapshot of this pass? Takes no lock.
    pub fn is_stale_unlocked(&self, object: ObjectReference) -> bool {
        is_stale_in::<VM>(&self.stale_loaders, object)
    }

    pub fn stats(&self) -> &PassStats {
        &self.stats
    }

    fn record_finalizable(&mut self, object: ObjectReference, referent: Option<ObjectReference>) {
        // A root or the root of a walk counts as a real path.
        let via_real_path = referent.map_or(true, |r| !VM::VMObjectModel::is_finalizer_record(r));
        self.finalizable.record(object, via_real_path);
    }

    /// Returns true if a reference to `target` found through `referent` must be cleared.
    fn classify(&mut self, target: ObjectReference, referent: Option<ObjectReference>) -> bool {
        if self.defer_for_finalization && VM::VMObjectModel::has_finalizer(target) {
            self.record_finalizable(target, referent);
        }

        if !self.is_stale_unlocked(target) {
            return false;
        }

        match skip_reason::<VM>(target, referent) {
            Some(SkipReason::WeakReference) => {
                debug!("Weak stale ref skipped: {}, referent: {:?}", target, referent);
                self.stats.skipped_weak += 1;
                false
            }
            Some(SkipReason::Finalization) => {
                debug!(
                    "Stale ref skipped for finalization: {}, referent: {:?}",
                    target, referent
                );
                self.stats.skipped_for_finalization += 1;
                false
            }
            None => true,
        }
    }

    fn slot_found(
        &mut self,
        slot: VM::VMSlot,
        target: ObjectReference,
        referent: Option<ObjectReference>,
    ) {
        if !self.classify(target, referent) {
            return;
        }
        let candidate = StaleReference::new(slot, target, referent);
        if self.defer_for_finalization {
            trace!("Stale ref recorded: {}", candidate);
            if self.candidates.insert(slot, candidate).is_none() {
                self.stats.candidates_recorded += 1;
            }
        } else {
            self.stats.candidates_recorded += 1;
            let outcome = candidate.reset::<VM>();
            self.count_reset(outcome);
        }
    }

    fn count_reset(&mut self, outcome: ResetOutcome) {
        match outcome {
            ResetOutcome::AlreadyEmpty => {}
            ResetOutcome::Cleared => self.stats.reset += 1,
            ResetOutcome::ClearedWithMonitor => {
                self.stats.reset += 1;
                self.stats.reset_with_monitor += 1;
            }
        }
    }

    /// Drop every candidate whose target is reachable from a finalizable object that has only
    /// been reached through finalizer records.
    fn exclude_stale_references_reachable_from_unreachable_finalizable_objects(
        &mut self,
        tls: VMWorkerThread,
    ) {
        for object in self.finalizable.only_reached_for_finalization() {
            info!(
                "Excluding stale refs reachable from the unreachable finalizable object {}",
                object
            );
            let mut exclude = ExcludeStaleReferences::<VM> {
                stale_loaders: &self.stale_loaders,
                candidates: &mut self.candidates,
                excluded: 0,
                phantom: PhantomData,
            };
            self.exclusion_walker.walk(tls, &mut exclude, Some(object));
            self.stats.excluded += exclude.excluded;
        }
        self.finalizable.clear();
    }

    /// Drop the loaders unloaded since the prologue from the snapshot, together with the
    /// candidates pointing to their objects.
    fn forget_unloaded_loaders(&mut self) {
        let loaders = self.engine.loaders();
        let before = self.stale_loaders.len();
        self.stale_loaders.retain(|loader| loaders.is_committed(*loader));
        if self.stale_loaders.len() == before {
            return;
        }
        debug!(
            "{} stale loaders unloaded during the pass",
            before - self.stale_loaders.len()
        );
        let stale_loaders = &self.stale_loaders;
        self.candidates
            .retain(|_, candidate| is_stale_in::<VM>(stale_loaders, candidate.target));
    }

    fn reset_stale_references(&mut self) {
        let candidates: Vec<StaleReference<VM::VMSlot>> =
            self.candidates.drain().map(|(_, candidate)| candidate).collect();
        for candidate in candidates {
            let outcome = candidate.reset::<VM>();
            self.count_reset(outcome);
        }
    }
}

impl<VM: VMBinding> HeapWalkerListener<VM> for StaleReferencePass<'_, VM> {
    fn prologue(&mut self, _tls: VMWorkerThread) {
        info!("Scanning...");
        self.stale_loaders = self.engine.loaders().commit_incoming();
        debug!("{} stale loaders in this pass", self.stale_loaders.len());
    }

    fn accepts_roots_from(&self, kind: RootKind) -> bool {
        // References held by native handles and by lock records and monitors are managed by the
        // VM itself. Clearing them would corrupt VM state.
        !matches!(
            kind,
            RootKind::GlobalHandles
                | RootKind::InflatedMonitors
                | RootKind::ThreadHandles
                | RootKind::LockRecords
        )
    }

    fn object_found(&mut self, object: ObjectReference, referent: Option<ObjectReference>) {
        if !self.classify(object, referent) {
            return;
        }
        info!("Stale object found: {}, referent: {:?}", object, referent);
        self.stats.stale_objects_found += 1;
    }

    fn reference_found(
        &mut self,
        slot: VM::VMSlot,
        target: ObjectReference,
        referent: Option<ObjectReference>,
    ) {
        self.slot_found(slot, target, referent);
    }

    fn narrow_reference_found(
        &mut self,
        slot: VM::VMSlot,
        target: ObjectReference,
        referent: Option<ObjectReference>,
    ) {
        self.slot_found(slot, target, referent);
    }

    fn epilogue(&mut self, tls: VMWorkerThread) {
        self.forget_unloaded_loaders();

        if self.defer_for_finalization {
            self.exclude_stale_references_reachable_from_unreachable_finalizable_objects(tls);
        }

        self.reset_stale_references();

        VM::VMSynchronization::deflate_idle_monitors(tls);

        let stats = &self.stats;
        info!(
            "Done. {} stale refs eliminated ({} used for synchronization), {} excluded, \
             {} weak and {} finalization refs skipped",
            stats.reset,
            stats.reset_with_monitor,
            stats.excluded,
            stats.skipped_weak,
            stats.skipped_for_finalization
        );
    }
}

/// The listener of an exclusion walk. Every stale object it discovers is spared: candidates
/// pointing to it are dropped.
struct ExcludeStaleReferences<'p, VM: VMBinding> {
    stale_loaders: &'p HashSet<VM::VMLoader>,
    candidates: &'p mut HashMap<VM::VMSlot, StaleReference<VM::VMSlot>>,
    excluded: usize,
    phantom: PhantomData<VM>,
}

impl<VM: VMBinding> ExcludeStaleReferences<'_, VM> {
    fn exclude_stale_object(&mut self, object: ObjectReference, referent: Option<ObjectReference>) {
        if !is_stale_in::<VM>(self.stale_loaders, object)
            || skip_reason::<VM>(object, referent).is_some()
        {
            return;
        }
        let before = self.candidates.len();
        self.candidates.retain(|_, candidate| {
            if candidate.target == object {
                info!("Stale reference excluded: {}", candidate);
                false
            } else {
                true
            }
        });
        self.excluded += before - self.candidates.len();
    }
}

impl<VM: VMBinding> HeapWalkerListener<VM> for ExcludeStaleReferences<'_, VM> {
    fn object_found(&mut self, object: ObjectReference, referent: Option<ObjectReference>) {
        self.exclude_stale_object(object, referent);
    }

    fn reference_found(
        &mut self,
        _slot: VM::VMSlot,
        target: ObjectReference,
        referent: Option<ObjectReference>,
    ) {
        self.exclude_stale_object(target, referent);
    }

    fn narrow_reference_found(
        &mut self,
        _slot: VM::VMSlot,
        target: ObjectReference,
        referent: Option<ObjectReference>,
    ) {
        self.exclude_stale_object(target, referent);
    }
}
