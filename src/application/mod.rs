//! Application layer containing the hall's business operations.
//!
//! `StudyHall` is the single entry point. Its operations are split by
//! concern across the submodules; each one reads through the store, stages
//! its writes in one unit of work and commits it in a single call.

pub mod assignment;
pub mod directory;
pub mod hall;
pub mod lifecycle;
pub mod onboarding;
pub mod payments;

#[cfg(test)]
pub(crate) mod testing;
