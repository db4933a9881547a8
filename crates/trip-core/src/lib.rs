//! trip-core
//!
//! Itinerary reducer, persistence codec, wizard auto-save and draft recovery,
//! step validation, and keyboard/announcement handling for the trip planner.
//! Depends on trip-domain. Storage is reached only through [`KeyValueStore`]
//! and time only through [`Clock`], so everything here runs deterministically
//! in tests.

pub mod accessibility;
pub mod autosave;
pub mod backend;
pub mod codec;
pub mod debounce;
pub mod directions;
pub mod error;
pub mod itinerary_manager;
pub mod recovery;
pub mod reducer;
pub mod storage;
pub mod time;
pub mod validation;
pub mod wizard_form;

pub use accessibility::*;
pub use autosave::*;
pub use backend::*;
pub use codec::*;
pub use debounce::DebounceSlot;
pub use directions::*;
pub use error::CoreError;
pub use itinerary_manager::*;
pub use recovery::*;
pub use reducer::*;
pub use storage::*;
pub use time::*;
pub use validation::*;
pub use wizard_form::*;
