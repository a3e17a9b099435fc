//! API surface shared across feature routes

pub mod response;
