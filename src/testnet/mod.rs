//! Fixtures for unit tests: throwaway chains on temporary sled databases
//! with freshly generated authority and distribution keys.

pub mod test_utils;

pub use test_utils::*;
