use super::mock_test_prelude::*;

const LIVE: MockLoader = 1;
const RETIRED: MockLoader = 2;

/// A holder with two fields, both pointing to the same stale object.
fn holder_and_stale() -> (ObjectReference, ObjectReference) {
    let live = MockType::ordinary("Holder", Some(LIVE));
    let retired = MockType::ordinary("Lock", Some(RETIRED));
    write_mockvm(|mock| {
        let holder = mock.alloc(live, 2, 0);
        let stale = mock.alloc(retired, 0, 0);
        mock.add_root(RootKind::Universe, SlotWidth::Wide, Some(holder));
        (holder, stale)
    })
}

#[test]
pub fn releases_owned_monitor_before_clearing() {
    with_mockvm(
        default_setup,
        || {
            let (holder, stale) = holder_and_stale();
            link(holder, 0, stale);
            let owner = mock_thread(7);
            let monitor = write_mockvm(|mock| mock.inflate_monitor(stale, Some(owner), 3, 2));
            let incinerator = mock_incinerator("");
            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));

            let stats = run_pass(incinerator);

            assert_eq!(wide_field(holder, 0).load(), None);
            assert_eq!(stats.reset, 1);
            assert_eq!(stats.reset_with_monitor, 1);
            read_mockvm(|mock| {
                let state = &mock.monitors[monitor];
                assert_eq!(state.object, stale);
                assert_eq!(state.owner, None);
                assert_eq!(state.recursions, 0);
                assert_eq!(state.waiters, 0);
                assert_eq!(state.notify_all_calls, 1);
            });
        },
        no_cleanup,
    )
}

#[test]
pub fn clears_unowned_monitor_reference() {
    with_mockvm(
        default_setup,
        || {
            let (holder, stale) = holder_and_stale();
            link(holder, 0, stale);
            let monitor = write_mockvm(|mock| mock.inflate_monitor(stale, None, 0, 0));
            let incinerator = mock_incinerator("");
            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));

            let stats = run_pass(incinerator);

            assert_eq!(wide_field(holder, 0).load(), None);
            assert_eq!(stats.reset_with_monitor, 1);
            read_mockvm(|mock| assert_eq!(mock.monitors[monitor].notify_all_calls, 0));
        },
        no_cleanup,
    )
}

#[test]
pub fn releases_monitor_once_for_many_references() {
    with_mockvm(
        default_setup,
        || {
            let (holder, stale) = holder_and_stale();
            link(holder, 0, stale);
            link(holder, 1, stale);
            let owner = mock_thread(7);
            let monitor = write_mockvm(|mock| mock.inflate_monitor(stale, Some(owner), 1, 0));
            let incinerator = mock_incinerator("");
            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));

            let stats = run_pass(incinerator);

            assert_eq!(wide_field(holder, 0).load(), None);
            assert_eq!(wide_field(holder, 1).load(), None);
            assert_eq!(stats.reset, 2);
            assert_eq!(stats.reset_with_monitor, 2);
            read_mockvm(|mock| {
                assert_eq!(mock.monitors[monitor].owner, None);
                assert_eq!(mock.monitors[monitor].notify_all_calls, 1);
            });
        },
        no_cleanup,
    )
}
