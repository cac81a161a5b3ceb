//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no serial
//! hardware required.

mod config_store_tests;
mod mock_link;
mod session_tests;
