use std::marker::PhantomData;

use crate::util::log::trace;
use crate::util::ObjectReference;
use crate::util::VMWorkerThread;
use crate::vm::ObjectModel;
use crate::vm::Scanning;
use crate::vm::VMBinding;

/// A header word that was overwritten by the visited marker and has to be put back.
#[derive(Copy, Clone, Debug)]
struct SavedHeader {
    object: ObjectReference,
    header: usize,
}

impl SavedHeader {
    fn restore<VM: VMBinding>(&self) {
        VM::VMObjectModel::store_header(self.object, self.header);
    }
}

/// Visited-object bookkeeping for one heap walk.
///
/// The visited marker lives in the header word of each object. Headers that carry information
/// are saved here before they are overwritten, and the whole heap is put back in order by
/// [`MarkLedger::restore`].
pub struct MarkLedger<VM: VMBinding> {
    saved: Vec<SavedHeader>,
    phantom: PhantomData<VM>,
}

impl<VM: VMBinding> Default for MarkLedger<VM> {
    fn default() -> Self {
        Self::new()
    }
}

impl<VM: VMBinding> MarkLedger<VM> {
    pub fn new() -> Self {
        Self {
            saved: Vec::with_capacity(64),
            phantom: PhantomData,
        }
    }

    /// Has `object` been visited in the current walk?
    pub fn is_visited(object: ObjectReference) -> bool {
        VM::VMObjectModel::is_marked_header(VM::VMObjectModel::load_header(object))
    }

    /// Mark `object` visited, saving its header first if the header carries information.
    pub fn mark_visited(&mut self, object: ObjectReference) {
        let header = VM::VMObjectModel::load_header(object);
        debug_assert!(
            !VM::VMObjectModel::is_marked_header(header),
            "{} is already visited",
            object
        );
        if VM::VMObjectModel::header_must_be_preserved(object, header) {
            self.saved.push(SavedHeader { object, header });
        }
        VM::VMObjectModel::store_header(object, VM::VMObjectModel::visited_header());
    }

    /// Reset the header of every marked object in the heap, then replay the saved headers.
    /// The saved headers are consumed.
    pub fn restore(&mut self, tls: VMWorkerThread) {
        let mut reset = 0usize;
        VM::VMScanning::enumerate_objects(tls, |object| {
            let header = VM::VMObjectModel::load_header(object);
            if VM::VMObjectModel::is_marked_header(header) {
                VM::VMObjectModel::store_header(object, VM::VMObjectModel::default_header(object));
                reset += 1;
            }
        });
        trace!(
            "Reset {} visited headers, restoring {} saved headers",
            reset,
            self.saved.len()
        );
        for saved in self.saved.drain(..) {
            saved.restore::<VM>();
        }
    }

    pub fn clear(&mut self) {
        self.saved.clear();
    }
}
