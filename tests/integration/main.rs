//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the bridge against
//! mock adapters.  All tests run on the host with no board attached.

mod service_tests;
mod sync_tests;
