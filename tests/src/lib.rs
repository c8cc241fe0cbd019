//! Integration test support: an in-memory chain client and common fixtures

pub mod mock;
pub mod utils;
