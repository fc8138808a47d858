use std::marker::PhantomData;

use enum_map::EnumMap;
use strum::IntoEnumIterator;

use super::listener::HeapWalkerListener;
use super::mark_ledger::MarkLedger;
use crate::util::log::debug;
use crate::util::ObjectReference;
use crate::util::VMWorkerThread;
use crate::vm::slot::{Slot, SlotWidth};
use crate::vm::*;

/// Counters of one heap walk.
#[derive(Clone, Debug, Default)]
pub struct WalkStats {
    /// Objects whose fields were scanned.
    pub objects_expanded: usize,
    /// Non-empty slots reported to the listener.
    pub slots_reported: usize,
    /// Slot-less object discoveries reported to the listener.
    pub objects_reported: usize,
    /// Non-empty root slots, per provider.
    pub root_slots: EnumMap<RootKind, usize>,
}

/// A worklist-based tracer over the managed heap.
///
/// A walk visits every object reachable from the roots, or from one given object, exactly once,
/// and reports each discovery to a [`HeapWalkerListener`]. Visited objects are tracked with the
/// visited marker in their headers, which is removed again before the walk returns.
///
/// A walk must run at a safepoint. [`super::HeapWalkOperation`] wraps a walk so that it can be
/// handed to [`Collection::execute_at_safepoint`].
pub struct HeapWalker<VM: VMBinding> {
    worklist: Vec<ObjectReference>,
    ledger: MarkLedger<VM>,
    stats: WalkStats,
}

impl<VM: VMBinding> HeapWalker<VM> {
    pub fn new(worklist_capacity: usize) -> Self {
        Self {
            worklist: Vec::with_capacity(worklist_capacity),
            ledger: MarkLedger::new(),
            stats: WalkStats::default(),
        }
    }

    /// Run a complete walk: exploration followed by [`HeapWalker::explore_epilogue`]. Use this
    /// when already at a safepoint.
    pub fn walk<L: HeapWalkerListener<VM>>(
        &mut self,
        tls: VMWorkerThread,
        listener: &mut L,
        root: Option<ObjectReference>,
    ) {
        self.explore(tls, listener, root);
        self.explore_epilogue();
    }

    /// Trace the heap and report every discovery to `listener`.
    ///
    /// With `root == None`, every accepted root provider is scanned and everything reachable
    /// from them is traced. With `root == Some(object)`, only the subgraph reachable from
    /// `object` is traced, and `object` itself is reported through
    /// [`HeapWalkerListener::object_found`] with no referent.
    pub fn explore<L: HeapWalkerListener<VM>>(
        &mut self,
        tls: VMWorkerThread,
        listener: &mut L,
        root: Option<ObjectReference>,
    ) {
        debug_assert!(
            VM::VMCollection::is_at_safepoint(),
            "A heap walk must run at a safepoint"
        );
        self.stats = WalkStats::default();

        listener.prologue(tls);

        VM::VMCollection::ensure_heap_parsable(tls);

        match root {
            None => {
                self.scan_global_roots(tls, listener);
                self.scan_threads_roots(tls, listener);
            }
            Some(object) => {
                let mut discovery = Discovery::new(self, listener, None, None);
                discovery.visit_object(object);
            }
        }

        while let Some(object) = self.worklist.pop() {
            if MarkLedger::<VM>::is_visited(object) {
                continue;
            }
            self.ledger.mark_visited(object);
            self.stats.objects_expanded += 1;

            let mut discovery = Discovery::new(self, listener, Some(object), None);
            VM::VMScanning::scan_object(tls, object, &mut discovery);
        }

        self.ledger.restore(tls);

        debug!(
            "Heap walk done: {} objects expanded, {} slots and {} objects reported",
            self.stats.objects_expanded,
            self.stats.slots_reported,
            self.stats.objects_reported
        );

        listener.epilogue(tls);
    }

    /// Drop what is left of the last walk. Called after the world has been resumed.
    pub fn explore_epilogue(&mut self) {
        self.worklist.clear();
        self.ledger.clear();
    }

    /// Counters of the last walk.
    pub fn stats(&self) -> &WalkStats {
        &self.stats
    }

    fn scan_global_roots<L: HeapWalkerListener<VM>>(
        &mut self,
        tls: VMWorkerThread,
        listener: &mut L,
    ) {
        for kind in RootKind::iter().filter(|k| !k.is_per_thread()) {
            if !listener.accepts_roots_from(kind) {
                continue;
            }
            let mut discovery = Discovery::new(self, listener, None, Some(kind));
            VM::VMScanning::scan_roots(tls, kind, &mut discovery);
        }
    }

    fn scan_threads_roots<L: HeapWalkerListener<VM>>(
        &mut self,
        tls: VMWorkerThread,
        listener: &mut L,
    ) {
        let kinds: Vec<RootKind> = RootKind::iter()
            .filter(|k| k.is_per_thread() && listener.accepts_roots_from(*k))
            .collect();
        if kinds.is_empty() {
            return;
        }
        for thread in VM::VMScanning::visible_threads() {
            for kind in kinds.iter().copied() {
                let mut discovery =
                    Discovery::new(self, listener, thread.thread_object, Some(kind));
                VM::VMScanning::scan_thread_roots(tls, thread.tls, kind, &mut discovery);
            }
        }
    }
}

/// The slot visitor of one expansion. It carries the referent of everything it reports.
struct Discovery<'a, VM: VMBinding, L: HeapWalkerListener<VM>> {
    worklist: &'a mut Vec<ObjectReference>,
    stats: &'a mut WalkStats,
    listener: &'a mut L,
    referent: Option<ObjectReference>,
    root_kind: Option<RootKind>,
    phantom: PhantomData<VM>,
}

impl<'a, VM: VMBinding, L: HeapWalkerListener<VM>> Discovery<'a, VM, L> {
    fn new(
        walker: &'a mut HeapWalker<VM>,
        listener: &'a mut L,
        referent: Option<ObjectReference>,
        root_kind: Option<RootKind>,
    ) -> Self {
        Self {
            worklist: &mut walker.worklist,
            stats: &mut walker.stats,
            listener,
            referent,
            root_kind,
            phantom: PhantomData,
        }
    }

    fn walk_later(&mut self, object: ObjectReference) {
        if !MarkLedger::<VM>::is_visited(object) {
            self.worklist.push(object);
        }
    }
}

impl<VM: VMBinding, L: HeapWalkerListener<VM>> SlotVisitor<VM::VMSlot> for Discovery<'_, VM, L> {
    fn visit_slot(&mut self, slot: VM::VMSlot) {
        let Some(target) = slot.load() else {
            return;
        };
        self.walk_later(target);

        self.stats.slots_reported += 1;
        if let Some(kind) = self.root_kind {
            self.stats.root_slots[kind] += 1;
        }

        match slot.width() {
            SlotWidth::Wide => self.listener.reference_found(slot, target, self.referent),
            SlotWidth::Narrow => self
                .listener
                .narrow_reference_found(slot, target, self.referent),
        }
    }

    fn visit_object(&mut self, object: ObjectReference) {
        self.walk_later(object);
        self.stats.objects_reported += 1;
        self.listener.object_found(object, self.referent);
    }
}
