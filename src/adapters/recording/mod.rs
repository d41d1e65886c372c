//! Recording adapters that capture interactions to cassettes.

pub mod clock;
pub mod llm;

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::cassette::recorder::CassetteRecorder;

/// Record an interaction with a plain (non-Result) return value.
///
/// Mirror of `replaying::next_output` - records input/output instead of reading.
pub(crate) fn record_interaction<I, O>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    output: &O,
) where
    I: Serialize,
    O: Serialize,
{
    let encoded = serde_json::to_value(input)
        .and_then(|input_json| Ok((input_json, serde_json::to_value(output)?)));
    push(recorder, port, method, encoded);
}

/// Record a `Result<T, E>` interaction using the Ok/Err JSON convention.
///
/// Mirror of `replaying::replay_result` - serializes Result for recording.
///
/// Convention:
/// - `Ok(v)` is serialized as `{"Ok": v}`
/// - `Err(e)` is serialized as `{"Err": e.to_string()}`
pub(crate) fn record_result<T, E, I>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: std::fmt::Display,
    I: Serialize,
{
    let encoded = serde_json::to_value(input).and_then(|input_json| {
        let output_json = match result {
            Ok(v) => {
                let inner = serde_json::to_value(v)?;
                serde_json::json!({ "Ok": inner })
            }
            Err(e) => serde_json::json!({ "Err": e.to_string() }),
        };
        Ok((input_json, output_json))
    });
    push(recorder, port, method, encoded);
}

/// Values that failed to serialize are logged and left out of the cassette.
fn push(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    encoded: serde_json::Result<(serde_json::Value, serde_json::Value)>,
) {
    match (encoded, recorder.lock()) {
        (Ok((input_json, output_json)), Ok(mut guard)) => {
            guard.record(port, method, input_json, output_json);
        }
        (Err(e), _) => tracing::warn!(port, method, "skipping unserializable interaction: {e}"),
        (_, Err(_)) => tracing::warn!(port, method, "recorder lock poisoned"),
    }
}
