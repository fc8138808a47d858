use super::mock_test_prelude::*;

use crate::util::test_util::panic_after;
use crate::worker::{WorkerStartError, WorkerState};
use std::sync::Arc;
use std::time::Duration;

const LIVE: MockLoader = 1;
const RETIRED: MockLoader = 2;
const TIMEOUT_MS: u64 = 5000;

fn holder_and_stale() -> (ObjectReference, ObjectReference) {
    let live = MockType::ordinary("Holder", Some(LIVE));
    let retired = MockType::ordinary("Plugin", Some(RETIRED));
    write_mockvm(|mock| {
        let holder = mock.alloc(live, 1, 0);
        let stale = mock.alloc(retired, 0, 0);
        link(holder, 0, stale);
        mock.add_root(RootKind::Universe, SlotWidth::Wide, Some(holder));
        (holder, stale)
    })
}

#[test]
pub fn trigger_runs_a_pass() {
    with_mockvm(
        default_setup,
        || {
            let (holder, _) = holder_and_stale();
            let incinerator = mock_incinerator("");
            assert!(memory_manager::initialize(incinerator, mock_thread(0)));
            assert_eq!(memory_manager::worker_state(incinerator), WorkerState::Idle);
            assert_eq!(memory_manager::passes_completed(incinerator), 0);

            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));
            memory_manager::trigger(incinerator);

            assert!(wait_until(TIMEOUT_MS, || {
                memory_manager::passes_completed(incinerator) == 1
            }));
            assert_eq!(wide_field(holder, 0).load(), None);
            let stats = incinerator.last_pass_stats().unwrap();
            assert_eq!(stats.reset, 1);
            assert_eq!(read_mockvm(|mock| mock.safepoints), 1);
            assert!(wait_until(TIMEOUT_MS, || {
                memory_manager::worker_state(incinerator) == WorkerState::Idle
            }));
        },
        no_cleanup,
    )
}

#[test]
pub fn triggers_during_a_pass_are_merged() {
    with_mockvm(
        default_setup,
        || {
            holder_and_stale();
            let gate = Gate::new();
            let hook_gate = gate.clone();
            let hook: Arc<dyn Fn() + Send + Sync> = Arc::new(move || hook_gate.wait());
            write_mockvm(|mock| mock.safepoint_hook = Some(hook));
            let incinerator = mock_incinerator("");
            assert!(memory_manager::initialize(incinerator, mock_thread(0)));

            memory_manager::trigger(incinerator);
            assert!(wait_until(TIMEOUT_MS, || {
                memory_manager::worker_state(incinerator) == WorkerState::Walking
            }));
            for _ in 0..3 {
                memory_manager::trigger(incinerator);
            }
            assert_eq!(
                memory_manager::worker_state(incinerator),
                WorkerState::Walking
            );
            gate.open();

            assert!(wait_until(TIMEOUT_MS, || {
                memory_manager::passes_completed(incinerator) == 1
            }));
            std::thread::sleep(Duration::from_millis(50));
            assert_eq!(memory_manager::passes_completed(incinerator), 1);
            assert_eq!(memory_manager::worker_state(incinerator), WorkerState::Idle);

            // A trigger after the pass requests a new one.
            memory_manager::trigger(incinerator);
            assert!(wait_until(TIMEOUT_MS, || {
                memory_manager::passes_completed(incinerator) == 2
            }));
        },
        no_cleanup,
    )
}

#[test]
pub fn triggers_during_the_delay_are_merged() {
    with_mockvm(
        default_setup,
        || {
            let incinerator = mock_incinerator("pass_delay_ms=100");
            assert!(memory_manager::initialize(incinerator, mock_thread(0)));

            for _ in 0..5 {
                memory_manager::trigger(incinerator);
            }
            assert!(wait_until(TIMEOUT_MS, || {
                memory_manager::passes_completed(incinerator) == 1
            }));
            std::thread::sleep(Duration::from_millis(200));
            assert_eq!(memory_manager::passes_completed(incinerator), 1);
        },
        no_cleanup,
    )
}

#[test]
pub fn initialize_starts_one_worker() {
    with_mockvm(
        default_setup,
        || {
            let incinerator = mock_incinerator("");
            assert!(memory_manager::initialize(incinerator, mock_thread(0)));
            assert!(memory_manager::initialize(incinerator, mock_thread(0)));
            assert_eq!(read_mockvm(|mock| mock.spawned_workers()), 1);
            assert_eq!(
                incinerator.start_worker(mock_thread(0)),
                Err(WorkerStartError::AlreadyRunning)
            );
        },
        no_cleanup,
    )
}

#[test]
pub fn disabled_incinerator_starts_no_worker() {
    with_mockvm(
        default_setup,
        || {
            let incinerator = mock_incinerator("enabled=false");
            assert!(!memory_manager::initialize(incinerator, mock_thread(0)));
            assert_eq!(read_mockvm(|mock| mock.spawned_workers()), 0);

            memory_manager::trigger(incinerator);
            std::thread::sleep(Duration::from_millis(20));
            assert_eq!(memory_manager::passes_completed(incinerator), 0);
        },
        no_cleanup,
    )
}

#[test]
pub fn failed_preparation_stops_the_worker() {
    with_mockvm(
        || {
            let mut mock = MockVM::default();
            mock.prepare_worker_thread = false;
            mock
        },
        || {
            let incinerator = mock_incinerator("");
            assert!(!memory_manager::initialize(incinerator, mock_thread(0)));
            assert!(!incinerator.requester.is_running());
            // The first result sticks.
            assert!(!memory_manager::initialize(incinerator, mock_thread(0)));
            assert_eq!(read_mockvm(|mock| mock.spawned_workers()), 1);
        },
        no_cleanup,
    )
}

#[test]
pub fn shutdown_stops_the_worker() {
    with_mockvm(
        default_setup,
        || {
            let incinerator = mock_incinerator("");
            assert!(memory_manager::initialize(incinerator, mock_thread(0)));
            assert!(incinerator.requester.is_running());

            memory_manager::shutdown(incinerator);
            assert!(!incinerator.requester.is_running());

            memory_manager::trigger(incinerator);
            std::thread::sleep(Duration::from_millis(20));
            assert_eq!(memory_manager::passes_completed(incinerator), 0);
            // Shutting down again does nothing.
            memory_manager::shutdown(incinerator);
        },
        no_cleanup,
    )
}

#[test]
pub fn panicking_pass_does_not_block_shutdown() {
    with_mockvm(
        default_setup,
        || {
            holder_and_stale();
            let hook: Arc<dyn Fn() + Send + Sync> =
                Arc::new(|| panic!("the binding failed during a pass"));
            write_mockvm(|mock| mock.safepoint_hook = Some(hook));
            let incinerator = mock_incinerator("");
            assert!(memory_manager::initialize(incinerator, mock_thread(0)));

            memory_manager::trigger(incinerator);
            assert!(wait_until(TIMEOUT_MS, || {
                !incinerator.requester.is_running()
            }));
            assert_eq!(memory_manager::worker_state(incinerator), WorkerState::Idle);
            assert_eq!(memory_manager::passes_completed(incinerator), 0);

            panic_after(TIMEOUT_MS, move || memory_manager::shutdown(incinerator));
            let results = join_workers();
            assert_eq!(results.len(), 1);
            assert!(results[0].is_err());
        },
        no_cleanup,
    )
}
