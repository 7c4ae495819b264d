//! Application-wide session state.

pub mod auth;
