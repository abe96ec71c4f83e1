//! Test support shared across the CLI crate.

mod behaviour;
