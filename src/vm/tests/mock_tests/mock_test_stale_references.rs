use super::mock_test_prelude::*;

use crate::heap_walker::{HeapWalker, HeapWalkerListener};

const LIVE: MockLoader = 1;
const RETIRED: MockLoader = 2;

struct Graph {
    holder: ObjectReference,
    stale: ObjectReference,
    root: MockSlot,
}

/// `root -> holder -> stale`, where `stale` belongs to the retired loader.
fn holder_and_stale() -> Graph {
    let live = MockType::ordinary("Holder", Some(LIVE));
    let retired = MockType::ordinary("Plugin", Some(RETIRED));
    write_mockvm(|mock| {
        let holder = mock.alloc(live, 1, 0);
        let stale = mock.alloc(retired, 1, 0);
        link(holder, 0, stale);
        let root = mock.add_root(RootKind::Universe, SlotWidth::Wide, Some(holder));
        Graph {
            holder,
            stale,
            root,
        }
    })
}

#[test]
pub fn clears_references_to_stale_objects() {
    with_mockvm(
        default_setup,
        || {
            let graph = holder_and_stale();
            let incinerator = mock_incinerator("");
            assert!(memory_manager::mark_loader_stale(incinerator, Some(RETIRED)));

            let stats = run_pass(incinerator);

            assert_eq!(wide_field(graph.holder, 0).load(), None);
            assert_eq!(graph.root.load(), Some(graph.holder));
            assert_eq!(stats.candidates_recorded, 1);
            assert_eq!(stats.reset, 1);
            assert_eq!(stats.reset_with_monitor, 0);
            assert_eq!(header_of(graph.stale), DEFAULT_HEADER);
            assert_eq!(read_mockvm(|mock| mock.deflations), 1);

            // The reference is gone, so a second pass finds nothing.
            let stats = run_pass(incinerator);
            assert_eq!(stats.reset, 0);
            assert_eq!(stats.candidates_recorded, 0);
        },
        no_cleanup,
    )
}

#[test]
pub fn clears_root_slots() {
    with_mockvm(
        default_setup,
        || {
            let graph = holder_and_stale();
            let stale_root = write_mockvm(|mock| {
                mock.add_root(RootKind::CompiledCode, SlotWidth::Wide, Some(graph.stale))
            });
            let incinerator = mock_incinerator("");
            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));

            let stats = run_pass(incinerator);

            assert_eq!(stale_root.load(), None);
            assert_eq!(wide_field(graph.holder, 0).load(), None);
            assert_eq!(stats.reset, 2);
        },
        no_cleanup,
    )
}

#[test]
pub fn clears_narrow_slots() {
    with_mockvm(
        default_setup,
        || {
            let live = MockType::ordinary("Holder", Some(LIVE));
            let retired = MockType::ordinary("Plugin", Some(RETIRED));
            let (holder, stale) =
                write_mockvm(|mock| (mock.alloc(live, 0, 3), mock.alloc(retired, 0, 0)));
            narrow_field(holder, 1).store(Some(stale));
            write_mockvm(|mock| {
                mock.add_root(RootKind::Universe, SlotWidth::Narrow, Some(holder));
            });
            let incinerator = mock_incinerator("");
            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));

            let stats = run_pass(incinerator);

            assert_eq!(narrow_field(holder, 1).load(), None);
            assert_eq!(stats.reset, 1);
        },
        no_cleanup,
    )
}

#[test]
pub fn nothing_is_cleared_without_stale_loaders() {
    with_mockvm(
        default_setup,
        || {
            let graph = holder_and_stale();
            let incinerator = mock_incinerator("");

            let stats = run_pass(incinerator);

            assert_eq!(wide_field(graph.holder, 0).load(), Some(graph.stale));
            assert_eq!(stats, Default::default());
        },
        no_cleanup,
    )
}

#[test]
pub fn bootstrap_objects_are_never_stale() {
    with_mockvm(
        default_setup,
        || {
            let boot = MockType::ordinary("String", None);
            let live = MockType::ordinary("Holder", Some(LIVE));
            let (holder, string) =
                write_mockvm(|mock| (mock.alloc(live, 1, 0), mock.alloc(boot, 0, 0)));
            link(holder, 0, string);
            write_mockvm(|mock| {
                mock.add_root(RootKind::Universe, SlotWidth::Wide, Some(holder));
            });
            let incinerator = mock_incinerator("");
            memory_manager::mark_loader_stale(incinerator, Some(LIVE));

            let stats = run_pass(incinerator);

            // The root to the holder is cleared, its field to the bootstrap object is not.
            assert_eq!(stats.reset, 1);
            assert_eq!(wide_field(holder, 0).load(), Some(string));
            assert!(!memory_manager::is_stale(incinerator, string));
            assert!(memory_manager::is_stale(incinerator, holder));
        },
        no_cleanup,
    )
}

#[test]
pub fn weak_references_are_left_alone() {
    with_mockvm(
        default_setup,
        || {
            let graph = holder_and_stale();
            let weak_type = MockType::weak_reference();
            let weak = write_mockvm(|mock| {
                let weak = mock.alloc(weak_type, 1, 0);
                mock.add_root(RootKind::Universe, SlotWidth::Wide, Some(weak));
                weak
            });
            link(weak, 0, graph.stale);
            let incinerator = mock_incinerator("");
            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));

            let stats = run_pass(incinerator);

            assert_eq!(wide_field(weak, 0).load(), Some(graph.stale));
            assert_eq!(wide_field(graph.holder, 0).load(), None);
            assert_eq!(stats.skipped_weak, 1);
            assert_eq!(stats.reset, 1);
        },
        no_cleanup,
    )
}

#[test]
pub fn counts_stale_objects_found_without_a_slot() {
    with_mockvm(
        default_setup,
        || {
            let graph = holder_and_stale();
            let retired_mirror = MockType::ordinary("PluginMirror", Some(RETIRED));
            let mirror = write_mockvm(|mock| mock.alloc(retired_mirror, 0, 0));
            set_hidden(graph.holder, Some(mirror));
            let incinerator = mock_incinerator("");
            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));

            let stats = run_pass(incinerator);

            assert_eq!(stats.stale_objects_found, 1);
            assert_eq!(stats.reset, 1);
        },
        no_cleanup,
    )
}

#[test]
pub fn clears_immediately_without_deferral() {
    with_mockvm(
        default_setup,
        || {
            let graph = holder_and_stale();
            let incinerator = mock_incinerator("defer_for_finalization=false");
            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));

            let stats = run_pass(incinerator);

            assert_eq!(wide_field(graph.holder, 0).load(), None);
            assert_eq!(stats.candidates_recorded, 1);
            assert_eq!(stats.reset, 1);
        },
        no_cleanup,
    )
}

#[test]
pub fn staleness_takes_effect_at_the_next_pass() {
    with_mockvm(
        default_setup,
        || {
            let graph = holder_and_stale();
            let incinerator = mock_incinerator("");

            assert!(!memory_manager::mark_loader_stale(incinerator, None));
            assert!(memory_manager::mark_loader_stale(incinerator, Some(RETIRED)));
            assert!(!memory_manager::is_stale(incinerator, graph.stale));

            run_pass(incinerator);
            assert!(memory_manager::is_stale(incinerator, graph.stale));
            assert!(!memory_manager::is_stale(incinerator, graph.holder));

            memory_manager::notify_loader_unloaded(incinerator, RETIRED);
            assert!(!memory_manager::is_stale(incinerator, graph.stale));
            // Unloading again, or unloading a loader that was never stale, does nothing.
            memory_manager::notify_loader_unloaded(incinerator, RETIRED);
            memory_manager::notify_loader_unloaded(incinerator, LIVE);
            assert!(!memory_manager::is_stale(incinerator, graph.stale));
        },
        no_cleanup,
    )
}

#[test]
pub fn unloaded_before_the_pass_is_not_stale() {
    with_mockvm(
        default_setup,
        || {
            let graph = holder_and_stale();
            let incinerator = mock_incinerator("");
            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));
            memory_manager::notify_loader_unloaded(incinerator, RETIRED);

            let stats = run_pass(incinerator);

            assert_eq!(wide_field(graph.holder, 0).load(), Some(graph.stale));
            assert_eq!(stats.reset, 0);
            assert!(!memory_manager::is_stale(incinerator, graph.stale));
        },
        no_cleanup,
    )
}

#[test]
pub fn unloading_during_a_pass_spares_its_references() {
    with_mockvm(
        default_setup,
        || {
            let graph = holder_and_stale();
            let incinerator = mock_incinerator("");
            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));

            let tls = VMWorkerThread(worker_thread());
            let mut exclusion_walker = HeapWalker::<MockVM>::new(4);
            let mut pass = incinerator
                .staleness
                .begin_pass(&mut exclusion_walker, true);
            at_safepoint(|| {
                pass.prologue(tls);
                let slot = wide_field(graph.holder, 0);
                pass.reference_found(slot, graph.stale, Some(graph.holder));
                // The VM unloads the loader while the walk is still running.
                memory_manager::notify_loader_unloaded(incinerator, RETIRED);
                pass.epilogue(tls);
            });

            assert_eq!(wide_field(graph.holder, 0).load(), Some(graph.stale));
            assert_eq!(pass.stats().candidates_recorded, 1);
            assert_eq!(pass.stats().reset, 0);
        },
        no_cleanup,
    )
}
