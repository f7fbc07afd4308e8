//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (route lookup)
//!     → Return: ScoreLookup(address), Landing or NotFound
//!     → address.rs (prefix check on the extracted address)
//! ```
//!
//! # Design Decisions
//! - One fixed route table, nothing compiled from config
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route

pub mod address;
pub mod router;

pub use address::{validate_address, AddressError};
pub use router::{route, RouteDecision};
