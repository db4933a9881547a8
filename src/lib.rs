//! Trip Planner wires the itinerary editor, the trip wizard with its draft
//! auto-save and recovery, and keyboard navigation onto on-disk storage.

pub mod clock;
pub mod errors;
pub mod session;
pub mod utils;

pub use clock::SystemClock;
pub use errors::SessionError;
pub use session::{PlannerSession, SessionTick};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        let build = utils::build_info::current();
        tracing::info!(
            version = build.version,
            git_hash = build.git_hash,
            profile = build.profile,
            "Trip planner tracing initialized."
        );
    });
}
