use super::listener::HeapWalkerListener;
use super::walker::HeapWalker;
use crate::util::ObjectReference;
use crate::util::VMWorkerThread;
use crate::vm::SafepointOperation;
use crate::vm::VMBinding;

/// A heap walk packaged as a [`SafepointOperation`], so the VM can run it with the world paused.
pub struct HeapWalkOperation<'a, VM: VMBinding, L: HeapWalkerListener<VM> + Send> {
    walker: &'a mut HeapWalker<VM>,
    listener: &'a mut L,
    root: Option<ObjectReference>,
}

impl<'a, VM: VMBinding, L: HeapWalkerListener<VM> + Send> HeapWalkOperation<'a, VM, L> {
    pub fn new(
        walker: &'a mut HeapWalker<VM>,
        listener: &'a mut L,
        root: Option<ObjectReference>,
    ) -> Self {
        Self {
            walker,
            listener,
            root,
        }
    }
}

impl<VM: VMBinding, L: HeapWalkerListener<VM> + Send> SafepointOperation
    for HeapWalkOperation<'_, VM, L>
{
    fn run(&mut self, tls: VMWorkerThread) {
        self.walker.explore(tls, &mut *self.listener, self.root);
    }

    fn epilogue(&mut self, _tls: VMWorkerThread) {
        self.walker.explore_epilogue();
    }
}
