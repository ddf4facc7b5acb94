//! Order store persistence configuration.

use serde::{Deserialize, Serialize};

/// Order store persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// sqlx connection URL (`sqlite://path` or `sqlite::memory:`).
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Pool size. Forced to 1 for in-memory databases.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// How long a writer waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Run every multi-write operation in one transaction.
    #[serde(default = "default_true")]
    pub atomic_writes: bool,
    /// Create the database file when it does not exist.
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            busy_timeout_ms: default_busy_timeout_ms(),
            atomic_writes: true,
            create_if_missing: true,
        }
    }
}

impl PersistenceConfig {
    /// Configuration for a private in-memory database.
    #[must_use]
    pub fn in_memory(atomic_writes: bool) -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            atomic_writes,
            ..Self::default()
        }
    }

    /// Returns true when the URL names an in-memory database.
    ///
    /// Each connection to such a database sees its own empty schema.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

fn default_database_url() -> String {
    "sqlite://./data/orders.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_busy_timeout_ms() -> u64 {
    5000
}

const fn default_true() -> bool {
    true
}
