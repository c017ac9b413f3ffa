//! Call gateway and shared vocabulary for a single-threaded mapping engine.
//!
//! The engine behind this crate is an opaque, non-reentrant collaborator: it
//! must only ever be driven from one thread. [`Gateway`] owns that thread and
//! marshals work onto it; [`Engine`] is the capability surface a concrete
//! backend implements; the remaining modules hold the value objects shared
//! between the engine boundary and the guided search flow built on top.

pub mod address;
pub mod api;
pub mod gateway;
pub mod place;
mod task;

pub use address::{AddressField, DetailLevel, FieldFlags};
pub use api::{Engine, SearchEvent, SearchEvents, SearchQuery, SearchReason, SearchTicket};
pub use gateway::Gateway;
pub use place::{Address, Coordinates, Place};
