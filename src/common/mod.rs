//! # Common Components
//!
//! Shared utilities used by the library, the worker service and the binary.
//!
//! ## Modules
//!
//! - [`config`]: Configuration parsing utilities

pub mod config;
