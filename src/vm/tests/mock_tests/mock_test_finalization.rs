use super::mock_test_prelude::*;

const LIVE: MockLoader = 1;
const RETIRED: MockLoader = 2;

struct Pending {
    record: ObjectReference,
    finalizable: ObjectReference,
    stale: ObjectReference,
}

/// A finalizable object only kept alive by its finalizer record, which sits on the VM's
/// finalizer queue. The finalizable object refers to a stale object.
fn pending_finalization(finalizable_loader: MockLoader) -> Pending {
    let record_type = MockType::finalizer_record();
    let finalizable_type = MockType::finalizable("Connection", Some(finalizable_loader));
    let retired = MockType::ordinary("Plugin", Some(RETIRED));
    write_mockvm(|mock| {
        let record = mock.alloc(record_type, 1, 0);
        let finalizable = mock.alloc(finalizable_type, 1, 0);
        let stale = mock.alloc(retired, 0, 0);
        link(record, 0, finalizable);
        link(finalizable, 0, stale);
        mock.add_root(RootKind::Universe, SlotWidth::Wide, Some(record));
        Pending {
            record,
            finalizable,
            stale,
        }
    })
}

#[test]
pub fn spares_references_from_pending_finalizers() {
    with_mockvm(
        default_setup,
        || {
            let pending = pending_finalization(LIVE);
            let incinerator = mock_incinerator("");
            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));

            let stats = run_pass(incinerator);

            assert_eq!(
                wide_field(pending.finalizable, 0).load(),
                Some(pending.stale)
            );
            assert_eq!(stats.candidates_recorded, 1);
            assert_eq!(stats.excluded, 1);
            assert_eq!(stats.reset, 0);

            // The finalizer has run and stored its object in a static field, so the object is
            // now reachable through a real path, and its record has been dropped.
            wide_field(pending.record, 0).store(None);
            write_mockvm(|mock| {
                mock.add_root(
                    RootKind::Universe,
                    SlotWidth::Wide,
                    Some(pending.finalizable),
                );
            });

            let stats = run_pass(incinerator);

            assert_eq!(wide_field(pending.finalizable, 0).load(), None);
            assert_eq!(stats.excluded, 0);
            assert_eq!(stats.reset, 1);
        },
        no_cleanup,
    )
}

#[test]
pub fn a_real_path_overrides_the_finalizer_record() {
    with_mockvm(
        default_setup,
        || {
            let pending = pending_finalization(LIVE);
            // Also reachable from a thread, whichever is discovered first.
            write_mockvm(|mock| {
                let thread = mock.add_thread(None);
                mock.add_thread_root(thread, RootKind::ThreadStack, Some(pending.finalizable));
            });
            let incinerator = mock_incinerator("");
            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));

            let stats = run_pass(incinerator);

            assert_eq!(wide_field(pending.finalizable, 0).load(), None);
            assert_eq!(stats.excluded, 0);
            assert_eq!(stats.reset, 1);
        },
        no_cleanup,
    )
}

#[test]
pub fn keeps_record_of_stale_finalizable_object() {
    with_mockvm(
        default_setup,
        || {
            let pending = pending_finalization(RETIRED);
            let incinerator = mock_incinerator("");
            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));

            let stats = run_pass(incinerator);

            assert_eq!(
                wide_field(pending.record, 0).load(),
                Some(pending.finalizable)
            );
            assert_eq!(
                wide_field(pending.finalizable, 0).load(),
                Some(pending.stale)
            );
            assert_eq!(stats.skipped_for_finalization, 1);
            assert_eq!(stats.excluded, 1);
            assert_eq!(stats.reset, 0);
        },
        no_cleanup,
    )
}

#[test]
pub fn exclusion_spares_every_reference_to_the_object() {
    with_mockvm(
        default_setup,
        || {
            let pending = pending_finalization(LIVE);
            let live = MockType::ordinary("Holder", Some(LIVE));
            let holder = write_mockvm(|mock| {
                let holder = mock.alloc(live, 1, 0);
                mock.add_root(RootKind::Universe, SlotWidth::Wide, Some(holder));
                holder
            });
            link(holder, 0, pending.stale);
            let incinerator = mock_incinerator("");
            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));

            let stats = run_pass(incinerator);

            assert_eq!(wide_field(holder, 0).load(), Some(pending.stale));
            assert_eq!(stats.candidates_recorded, 2);
            assert_eq!(stats.excluded, 2);
            assert_eq!(stats.reset, 0);
        },
        no_cleanup,
    )
}

#[test]
pub fn clears_eagerly_without_deferral() {
    with_mockvm(
        default_setup,
        || {
            let pending = pending_finalization(LIVE);
            let incinerator = mock_incinerator("defer_for_finalization=false");
            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));

            let stats = run_pass(incinerator);

            assert_eq!(wide_field(pending.finalizable, 0).load(), None);
            assert_eq!(stats.excluded, 0);
            assert_eq!(stats.reset, 1);
        },
        no_cleanup,
    )
}
