//! Replaying adapters that serve recorded interactions.

pub mod github;
pub mod launchpad;

pub use github::ReplayingIssueTracker;
pub use launchpad::ReplayingBugSource;

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Take the recorded output of the next `port::method` call.
///
/// # Panics
///
/// Panics if the cassette has nothing left for the call.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> serde_json::Value {
    let mut guard = replayer.lock().expect("replayer lock poisoned");
    guard.next_interaction(port, method).output
}

/// Decode an output written by `recording::record_result`.
///
/// `{"Ok": v}` becomes `Ok(v)` and `{"Err": msg}` becomes an error carrying
/// the recorded message.
///
/// # Panics
///
/// Panics if the output has neither shape or the value does not decode.
pub(crate) fn replay_result<T: DeserializeOwned>(output: serde_json::Value) -> Result<T, BoxError> {
    if let Some(ok) = output.get("Ok") {
        let value = serde_json::from_value(ok.clone())
            .unwrap_or_else(|e| panic!("Recorded Ok value does not decode: {e}"));
        return Ok(value);
    }
    if let Some(err) = output.get("Err") {
        let msg = err.as_str().map_or_else(|| err.to_string(), str::to_string);
        return Err(msg.into());
    }
    panic!("Recorded output is neither Ok nor Err: {output}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_output_decodes() {
        let value: Vec<u64> = replay_result(json!({"Ok": [1, 2]})).unwrap();
        assert_eq!(value, vec![1, 2]);
    }

    #[test]
    fn err_output_keeps_message() {
        let err = replay_result::<u64>(json!({"Err": "GitHub issue creation failed (502)"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "GitHub issue creation failed (502)");
    }

    #[test]
    fn unit_result_round_trips() {
        replay_result::<()>(json!({"Ok": null})).unwrap();
    }

    #[test]
    #[should_panic(expected = "neither Ok nor Err")]
    fn malformed_output_panics() {
        let _ = replay_result::<u64>(json!({"value": 1}));
    }
}
