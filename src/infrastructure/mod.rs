//! Infrastructure Layer

pub mod adapters;
pub mod http;
pub mod memory;
pub mod persistence;
