//! Shared foundational types for the weir caching engine.
//!
//! This crate provides the content digest type used for record identity and
//! chain structural hashing.

#![warn(missing_docs)]

pub mod hash;

pub use hash::Digest;
