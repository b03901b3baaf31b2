//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types for poses and keyframes
//! - Handle-keyed collections for the engine store
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
