//! jsonvault Server Library
//!
//! HTTP server exposing CRUD operations for opaque JSON objects and users,
//! backed by PostgreSQL and publishing change events to Redis streams.
//!
//! # Overview
//!
//! Every resource follows the same three-layer shape:
//!
//! - **Routes**: axum handlers that parse and validate requests, then map
//!   domain errors to status codes
//! - **Service**: business logic orchestrating the uniqueness check, the
//!   write, and the change-event publish (strictly in that order)
//! - **Adapters**: a storage trait backed by sqlx/PostgreSQL and a publisher
//!   trait backed by Redis streams, each swappable for an in-memory double
//!   in tests
//!
//! # Architecture
//!
//! Resources are organized as vertical feature slices under [`features`]:
//! each slice owns its entity types, adapter traits and implementations,
//! service, and HTTP routes. The slices for `json_objects` and `users` are
//! deliberately parallel; the shared error taxonomy in [`error`] keeps the
//! HTTP status mapping identical across both.
//!
//! Writes publish an event to the resource's Redis stream only after the
//! database mutation has committed. There is no transaction spanning the
//! two systems: a publish failure is surfaced to the caller even though the
//! write is already durable. That inconsistency window is a documented
//! design decision, not a bug.
//!
//! ## Framework Stack
//!
//! - **Axum**: HTTP routing and extraction
//! - **SQLx**: asynchronous PostgreSQL access and embedded migrations
//! - **redis**: stream appends (XADD) with per-call acknowledgment

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod middleware;

// Re-export commonly used types
pub use error::{ServiceError, ServiceResult};
