//! trip-domain
//!
//! Pure domain models (places, itinerary days, trip wizard data and drafts,
//! routing backend payloads). No I/O, no storage, no timers. Only data types
//! and the small helpers that belong to them.

pub mod itinerary;
pub mod place;
pub mod route;
pub mod wizard;

pub use itinerary::*;
pub use place::*;
pub use route::*;
pub use wizard::*;
