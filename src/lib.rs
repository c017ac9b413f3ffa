//! Guided address search over a single-threaded mapping engine.
//!
//! The root crate re-exports the engine gateway and the search coordinator
//! so embedders can wire a session without digging through the workspace,
//! and ships a simulated gazetteer engine the demo binary (and tests) run
//! against in place of a real mapping backend.

pub mod sim;

pub use gazet_engine::{
	Address, AddressField, Coordinates, DetailLevel, Engine, FieldFlags, Gateway, Place,
	SearchEvent, SearchEvents, SearchQuery, SearchReason, SearchTicket,
};
pub use gazet_search::{AddressSearch, AddressView, Candidate, SessionError};
