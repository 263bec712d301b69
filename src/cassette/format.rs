//! On-disk cassette layout: a named, ordered list of port interactions.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded call on a port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Position in the recording, assigned by the recorder.
    pub seq: u64,
    /// Port name (`"launchpad"` or `"github"`).
    pub port: String,
    /// Port method that was called.
    pub method: String,
    /// Arguments of the call.
    pub input: serde_json::Value,
    /// What the call returned, `{"Ok": ..}` or `{"Err": ".."}`.
    pub output: serde_json::Value,
}

/// A recorded session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name for this cassette.
    pub name: String,
    /// When recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Version of the tool that made the recording.
    pub tool_version: String,
    /// Ordered list of interactions.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Reads a cassette from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))
    }

    /// Writes the cassette as YAML, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let yaml = serde_yaml::to_string(self).map_err(std::io::Error::other)?;
        std::fs::write(path, yaml)
    }

    /// Number of interactions recorded for `port`.
    #[must_use]
    pub fn count_for(&self, port: &str) -> usize {
        self.interactions.iter().filter(|i| i.port == port).count()
    }
}
