//! Integration test crate for mediaenc.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the mediaenc crates to verify they work together.

#[cfg(test)]
mod session;

#[cfg(test)]
mod settings;
