//! Remote auth API: wire types, error normalization and the HTTP client.

pub mod api;
pub mod error;
pub mod types;
