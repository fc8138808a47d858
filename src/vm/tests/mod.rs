// All the tests with prefix 'mock_test_' use MockVM. The mock VM is a process-wide singleton,
// so each test runs under `with_mockvm`, which serializes them and resets the mock VM.
// Every incinerator created with `mock_incinerator` is shut down when its test ends.

mod mock_tests;
