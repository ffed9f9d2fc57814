//! Command implementations

pub mod resolve;
pub mod supply;
pub mod version;
