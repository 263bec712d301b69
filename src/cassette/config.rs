//! Which cassette serves which port during replay.

use std::path::PathBuf;

use super::format::Cassette;
use super::replayer::CassetteReplayer;

/// Per-port cassette files. A port without one panics when called during replay.
#[derive(Debug, Clone, Default)]
pub struct CassetteConfig {
    /// Cassette for the source tracker port.
    pub launchpad: Option<PathBuf>,
    /// Cassette for the destination tracker port.
    pub github: Option<PathBuf>,
}

/// Replayers loaded from a [`CassetteConfig`].
pub struct PortReplayers {
    /// Replayer for the source tracker port.
    pub launchpad: Option<CassetteReplayer>,
    /// Replayer for the destination tracker port.
    pub github: Option<CassetteReplayer>,
}

impl CassetteConfig {
    /// Both ports served from the cassettes a [`RecordingSession`] wrote to `dir`.
    ///
    /// [`RecordingSession`]: super::session::RecordingSession
    #[must_use]
    pub fn from_session_dir(dir: &std::path::Path) -> Self {
        Self {
            launchpad: Some(dir.join("launchpad.cassette.yaml")),
            github: Some(dir.join("github.cassette.yaml")),
        }
    }

    /// Load every configured cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette cannot be read or parsed.
    pub fn load_all(&self) -> Result<PortReplayers, String> {
        let load = |path: &PathBuf| Cassette::load(path).map(|c| CassetteReplayer::new(&c));
        Ok(PortReplayers {
            launchpad: self.launchpad.as_ref().map(load).transpose()?,
            github: self.github.as_ref().map(load).transpose()?,
        })
    }
}
