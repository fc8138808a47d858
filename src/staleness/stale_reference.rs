use crate::util::log::info;
use crate::util::ObjectReference;
use crate::vm::slot::Slot;
use crate::vm::Synchronization;
use crate::vm::VMBinding;

/// A slot found holding a reference to a stale object, waiting to be cleared at the end of the
/// pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StaleReference<SL: Slot> {
    /// The slot to clear.
    pub slot: SL,
    /// The stale object the slot pointed to when it was discovered.
    pub target: ObjectReference,
    /// The object through which the slot was discovered.
    pub referent: Option<ObjectReference>,
}

/// What [`StaleReference::reset`] did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The slot was already empty.
    AlreadyEmpty,
    /// The slot was cleared.
    Cleared,
    /// The target had a monitor. Its owner, if any, was made to notify and exit, and the slot
    /// was cleared.
    ClearedWithMonitor,
}

impl<SL: Slot> StaleReference<SL> {
    pub fn new(slot: SL, target: ObjectReference, referent: Option<ObjectReference>) -> Self {
        Self {
            slot,
            target,
            referent,
        }
    }

    /// Clear the slot, releasing the monitor of its target first if the target has one.
    pub fn reset<VM: VMBinding<VMSlot = SL>>(&self) -> ResetOutcome {
        let Some(target) = self.slot.load() else {
            return ResetOutcome::AlreadyEmpty;
        };

        match VM::VMSynchronization::monitor_of(target) {
            None => {
                info!("Stale ref eliminated: {}", self);
                self.slot.clear();
                ResetOutcome::Cleared
            }
            Some(monitor) => {
                info!("Stale ref used for synchronization: {}", self);
                if let Some(owner) = VM::VMSynchronization::monitor_owner(monitor) {
                    VM::VMSynchronization::notify_all(monitor, owner);
                    let recursions = VM::VMSynchronization::complete_exit(monitor, owner);
                    info!(
                        "Released monitor {:?} of {} held by {:?} ({} recursions)",
                        monitor, target, owner, recursions
                    );
                }
                self.slot.clear();
                ResetOutcome::ClearedWithMonitor
            }
        }
    }
}

impl<SL: Slot> std::fmt::Display for StaleReference<SL> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.referent {
            Some(referent) => write!(
                f,
                "{:?} => {}, referent: {}",
                self.slot, self.target, referent
            ),
            None => write!(f, "{:?} => {}, referent: none", self.slot, self.target),
        }
    }
}
