//! Replaying adapters that serve recorded interactions from a cassette.

pub mod clock;
pub mod llm;

use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;

pub use clock::ReplayingClock;
pub use llm::ReplayingLlmClient;

/// Takes the next recorded output for `port::method`.
///
/// Mirror of `recording::record_result`: reads instead of writes.
pub(crate) fn next_output(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, String> {
    let mut guard = replayer.lock().map_err(|_| "replayer lock poisoned".to_string())?;
    guard.next_interaction(port, method).map(|interaction| interaction.output.clone())
}

/// Decodes an output recorded with the Ok/Err convention.
///
/// - `{"Ok": v}` deserializes `v` as `T`
/// - `{"Err": msg}` becomes an error carrying `msg`
pub(crate) fn replay_result<T: DeserializeOwned>(
    output: Result<serde_json::Value, String>,
) -> Result<T, Box<dyn std::error::Error + Send + Sync>> {
    let output = output?;
    if let Some(ok) = output.get("Ok") {
        return Ok(serde_json::from_value(ok.clone())?);
    }
    match output.get("Err") {
        Some(err) => Err(err.as_str().unwrap_or("recorded error").to_string().into()),
        None => Err(format!("recorded output is neither Ok nor Err: {output}").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_output_decodes_value() {
        let value: u32 = replay_result(Ok(json!({"Ok": 7}))).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn err_output_becomes_error_message() {
        let err = replay_result::<u32>(Ok(json!({"Err": "status 529"}))).unwrap_err();
        assert_eq!(err.to_string(), "status 529");
    }

    #[test]
    fn untagged_output_is_rejected() {
        assert!(replay_result::<u32>(Ok(json!(7))).is_err());
        assert!(replay_result::<u32>(Err("exhausted".into())).is_err());
    }
}
