//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the Mushaf core:
//! - Logging and tracing infrastructure
//! - Configuration management with fail-fast capability checks
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the font engine and the
//! service façade depend on. It establishes the logging conventions, the
//! configuration contract with host platforms, and the event broadcasting
//! mechanism used to surface preload progress.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
