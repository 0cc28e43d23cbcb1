use serde::{Deserialize, Serialize};

/// Configuration for the events module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventsConfig {
    /// Capacity applied when an event is created without an explicit limit.
    #[serde(default = "default_capacity")]
    pub default_capacity: i32,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            default_capacity: default_capacity(),
        }
    }
}

fn default_capacity() -> i32 {
    100
}
