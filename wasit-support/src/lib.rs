//! # Wasit Support
//!
//! Shared text-rendering utilities for the Wasit resolver.
//!
//! This crate provides:
//! - Resolution-chain rendering for cycle errors
//! - Type-name shortening and "did you mean?" suggestions

pub mod rendering;

pub use rendering::{render_chain, shorten_type_name, suggest_similar};
