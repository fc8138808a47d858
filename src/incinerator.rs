//! Incinerator instance.

use std::sync::Mutex;

use crate::staleness::{PassStats, StalenessEngine};
use crate::util::log::{info, warn};
use crate::util::options::Options;
use crate::util::VMThread;
use crate::vm::Collection;
use crate::vm::VMBinding;
use crate::worker::{IncineratorWorker, PassRequester, WorkerStartError, WorkerState};

/// Incinerator builder. This is used to set options before actually creating an incinerator
/// instance.
pub struct IncineratorBuilder {
    /// The options for this instance.
    pub options: Options,
}

impl Default for IncineratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IncineratorBuilder {
    /// Create an incinerator builder with options read from environment variables, or using
    /// built-in default if not overridden by environment variables.
    pub fn new() -> Self {
        let mut builder = Self::new_no_env_vars();
        builder.options.read_env_var_settings();
        builder
    }

    /// Create an incinerator builder with build-in default options, but without reading options
    /// from environment variables.
    pub fn new_no_env_vars() -> Self {
        IncineratorBuilder {
            options: Options::default(),
        }
    }

    /// Set an option.
    pub fn set_option(&mut self, name: &str, val: &str) -> bool {
        self.options.set_from_str(name, val)
    }

    /// Set multiple options by a string. The string should be key-value pairs separated by white
    /// spaces, such as `pass_delay_ms=0 defer_for_finalization=false`.
    pub fn set_options_bulk_by_str(&mut self, options: &str) -> bool {
        self.options.set_bulk_from_command_line(options)
    }

    /// Build an incinerator instance from the builder.
    pub fn build<VM: VMBinding>(&self) -> Incinerator<VM> {
        Incinerator::new(self.options.clone())
    }
}

/// An incinerator instance. It holds the stale loader sets and the state of the worker.
/// A binding creates it with [`crate::memory_manager::incinerator_init`] and usually keeps it in a
/// static, since the worker needs a `'static` reference to it.
pub struct Incinerator<VM: VMBinding> {
    pub(crate) options: Options,
    pub(crate) staleness: StalenessEngine<VM>,
    pub(crate) requester: PassRequester,
    /// The result of the first call to `initialize`.
    initialized: Mutex<Option<bool>>,
}

impl<VM: VMBinding> Incinerator<VM> {
    pub(crate) fn new(options: Options) -> Self {
        Incinerator {
            options,
            staleness: StalenessEngine::new(),
            requester: PassRequester::new(),
            initialized: Mutex::new(None),
        }
    }

    /// Start the worker, once. Later calls return the result of the first call.
    pub(crate) fn initialize(&'static self, tls: VMThread) -> bool {
        if !self.options.enabled {
            info!("The incinerator is disabled");
            return false;
        }
        let mut initialized = self.initialized.lock().unwrap();
        if let Some(result) = *initialized {
            return result;
        }
        let result = match self.start_worker(tls) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to start the incinerator worker: {}", e);
                false
            }
        };
        *initialized = Some(result);
        result
    }

    /// Ask the VM to spawn the worker thread, and block until the thread reports back.
    pub(crate) fn start_worker(&'static self, tls: VMThread) -> Result<(), WorkerStartError> {
        self.requester.on_start_requested()?;
        VM::VMCollection::spawn_worker_thread(tls, IncineratorWorker::new(self));
        self.requester.wait_for_start_report()
    }

    /// Get the run time options.
    pub fn get_options(&self) -> &Options {
        &self.options
    }

    /// Get the staleness engine.
    pub fn staleness(&self) -> &StalenessEngine<VM> {
        &self.staleness
    }

    pub fn worker_state(&self) -> WorkerState {
        self.requester.state()
    }

    pub fn passes_completed(&self) -> usize {
        self.requester.passes_completed()
    }

    /// Counters of the last pass completed by the worker.
    pub fn last_pass_stats(&self) -> Option<PassStats> {
        self.requester.last_pass_stats()
    }
}
