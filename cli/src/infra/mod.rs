//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: environment capture,
//! filesystem access, template rendering and randomness.
//!
//! Imports from `crate::domain` and `crate::application` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod env;
pub mod fs;
pub mod random;
pub mod template;
