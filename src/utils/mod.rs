pub mod build_info;

use std::sync::Once;

use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVES: [&str; 2] = ["trip_planner=info", "trip_core=info"];

/// Installs the global fmt subscriber. `RUST_LOG` directives are kept and
/// the crate defaults are added on top.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = DEFAULT_DIRECTIVES
            .iter()
            .filter_map(|raw| raw.parse::<Directive>().ok())
            .fold(EnvFilter::from_default_env(), EnvFilter::add_directive);

        // Another subscriber may already be installed by an embedding app.
        let _ = fmt().with_env_filter(filter).try_init();
    });
}
