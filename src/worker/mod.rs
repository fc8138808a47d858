//! The incinerator worker: one background thread that runs a pass each time it is triggered.
//!
//! Triggers are level-triggered. Any number of triggers before a pass has completed lead to a
//! single pass.

mod requester;
mod thread;

pub use self::requester::PassRequester;
pub use self::thread::IncineratorWorker;

use std::fmt;

/// The state of the incinerator worker.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting for a trigger.
    Idle,
    /// A pass has been requested and will start after the pass delay.
    Triggered,
    /// A pass is running.
    Walking,
}

/// Why the worker could not be started.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorkerStartError {
    /// A worker is already running.
    AlreadyRunning,
    /// The VM failed to set up the worker thread.
    PreparationFailed,
    /// The worker was asked to stop before it started.
    StoppedBeforeStart,
}

impl fmt::Display for WorkerStartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerStartError::AlreadyRunning => {
                write!(f, "the incinerator worker is already running")
            }
            WorkerStartError::PreparationFailed => {
                write!(f, "the VM failed to prepare the incinerator worker thread")
            }
            WorkerStartError::StoppedBeforeStart => {
                write!(f, "the incinerator worker was stopped before it started")
            }
        }
    }
}

impl std::error::Error for WorkerStartError {}
