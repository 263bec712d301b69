//! A recording session: one cassette per port in a timestamped directory.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::recorder::CassetteRecorder;

/// Owns the recorders shared with the recording adapters.
pub struct RecordingSession {
    /// Recorder for source tracker interactions.
    pub launchpad: Arc<Mutex<CassetteRecorder>>,
    /// Recorder for destination tracker interactions.
    pub github: Arc<Mutex<CassetteRecorder>>,
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Start a session writing to `<base>/<timestamp>/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory already exists or cannot be created.
    pub fn new(base: &Path) -> Result<Self, String> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let output_dir = base.join(&timestamp);

        if output_dir.exists() {
            return Err(format!("Cassette directory already exists: {}", output_dir.display()));
        }
        std::fs::create_dir_all(&output_dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;

        let make_recorder = |port: &str| {
            let path = output_dir.join(format!("{port}.cassette.yaml"));
            Arc::new(Mutex::new(CassetteRecorder::new(path, format!("{timestamp}-{port}"))))
        };

        Ok(Self {
            launchpad: make_recorder("launchpad"),
            github: make_recorder("github"),
            output_dir,
        })
    }

    /// Directory the cassettes are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write every cassette. The recording adapters must have been dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if an adapter still holds a recorder or a write fails.
    pub fn finish(self) -> Result<PathBuf, String> {
        fn finish_one(arc: Arc<Mutex<CassetteRecorder>>, port: &str) -> Result<(), String> {
            let recorder = Arc::try_unwrap(arc)
                .map_err(|_| format!("Recording adapter for {port} still has references"))?
                .into_inner()
                .map_err(|e| format!("Recorder lock for {port} poisoned: {e}"))?;
            recorder.finish().map_err(|e| format!("Failed to write {port} cassette: {e}"))?;
            Ok(())
        }

        finish_one(self.launchpad, "launchpad")?;
        finish_one(self.github, "github")?;
        Ok(self.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_writes_both_cassettes() {
        let base = std::env::temp_dir().join("bugmirror_session_test");
        let _ = std::fs::remove_dir_all(&base);

        let session = RecordingSession::new(&base).unwrap();
        assert!(session.output_dir().exists());

        let dir = session.finish().unwrap();
        assert!(dir.join("launchpad.cassette.yaml").exists());
        assert!(dir.join("github.cassette.yaml").exists());

        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn finish_fails_while_adapter_holds_recorder() {
        let base = std::env::temp_dir().join("bugmirror_session_held_test");
        let _ = std::fs::remove_dir_all(&base);

        let session = RecordingSession::new(&base).unwrap();
        let held = Arc::clone(&session.github);
        let err = session.finish().unwrap_err();
        assert!(err.contains("github still has references"));
        drop(held);

        let _ = std::fs::remove_dir_all(&base);
    }
}
