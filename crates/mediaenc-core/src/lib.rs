//! mediaenc core - Foundation types for media encoding
//!
//! This crate provides the value types shared by the encoder crates:
//! - Exact rates (MediaRational)
//! - Timestamps as tick counts over a rate (MediaTime)
//! - Packed frame buffers and pixel formats
//! - The common error type

pub mod error;
pub mod frame;
pub mod rational;
pub mod time;

pub use error::{MediaEncError, Result};
pub use frame::{FrameBuffer, PixelFormat};
pub use rational::MediaRational;
pub use time::MediaTime;
