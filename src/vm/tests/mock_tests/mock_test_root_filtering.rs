use super::mock_test_prelude::*;

const RETIRED: MockLoader = 2;

#[test]
pub fn leaves_vm_managed_roots_alone() {
    with_mockvm(
        default_setup,
        || {
            let retired = MockType::ordinary("Plugin", Some(RETIRED));
            let thread_type = MockType::ordinary("Thread", None);
            let (stale, thread_object) =
                write_mockvm(|mock| (mock.alloc(retired, 0, 0), mock.alloc(thread_type, 0, 0)));
            let (stack, lock_record, thread_handle, global_handle, monitor_root) =
                write_mockvm(|mock| {
                    let thread = mock.add_thread(Some(thread_object));
                    (
                        mock.add_thread_root(thread, RootKind::ThreadStack, Some(stale)),
                        mock.add_thread_root(thread, RootKind::LockRecords, Some(stale)),
                        mock.add_thread_root(thread, RootKind::ThreadHandles, Some(stale)),
                        mock.add_root(RootKind::GlobalHandles, SlotWidth::Wide, Some(stale)),
                        mock.add_root(RootKind::InflatedMonitors, SlotWidth::Wide, Some(stale)),
                    )
                });
            let incinerator = mock_incinerator("");
            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));

            let stats = run_pass(incinerator);

            assert_eq!(stack.load(), None);
            assert_eq!(lock_record.load(), Some(stale));
            assert_eq!(thread_handle.load(), Some(stale));
            assert_eq!(global_handle.load(), Some(stale));
            assert_eq!(monitor_root.load(), Some(stale));
            assert_eq!(stats.candidates_recorded, 1);
            assert_eq!(stats.reset, 1);
        },
        no_cleanup,
    )
}

#[test]
pub fn objects_only_reachable_from_skipped_roots_are_not_walked() {
    with_mockvm(
        default_setup,
        || {
            let retired = MockType::ordinary("Plugin", Some(RETIRED));
            let boot = MockType::ordinary("Handle", None);
            let (handle, stale) =
                write_mockvm(|mock| (mock.alloc(boot, 1, 0), mock.alloc(retired, 0, 0)));
            link(handle, 0, stale);
            write_mockvm(|mock| {
                mock.add_root(RootKind::GlobalHandles, SlotWidth::Wide, Some(handle));
            });
            let incinerator = mock_incinerator("");
            memory_manager::mark_loader_stale(incinerator, Some(RETIRED));

            let stats = run_pass(incinerator);

            assert_eq!(wide_field(handle, 0).load(), Some(stale));
            assert_eq!(stats.reset, 0);
        },
        no_cleanup,
    )
}
