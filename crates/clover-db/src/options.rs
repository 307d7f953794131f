//! Database-open configuration (spec §5, ambient).

use std::time::Duration;

/// Settings for [`crate::Database::open`].
#[derive(Debug, Clone)]
pub struct Options {
    /// How often the background TTL sweep runs. `None` disables it
    /// entirely — correctness never depends on the sweep running, since
    /// every read path filters expired documents inline (spec §3.2).
    pub ttl_sweep_interval: Option<Duration>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            ttl_sweep_interval: Some(Duration::from_secs(30)),
        }
    }
}

impl Options {
    pub fn no_sweep() -> Options {
        Options {
            ttl_sweep_interval: None,
        }
    }

    pub fn with_sweep_interval(interval: Duration) -> Options {
        Options {
            ttl_sweep_interval: Some(interval),
        }
    }
}
