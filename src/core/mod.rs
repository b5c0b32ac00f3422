//! Core phase machine vocabulary.
//!
//! This module contains the types the rest of the crate builds on:
//! - Phase identifiers via the `Phase` trait
//! - The `phase_enum!` macro for deriving it on plain enums
//!
//! The reserved `init` and `error` phases are part of the trait itself, so
//! the runtime can start machines and route failures without knowing the
//! concrete enum.

pub mod macros;
mod phase;

pub use phase::Phase;
