//! Replays recorded interactions from a cassette.

use std::collections::HashMap;

use super::format::{Cassette, Interaction};

/// Key for indexing interactions by port and method.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct PortMethodKey {
    port: String,
    method: String,
}

/// Replays interactions from a loaded cassette, serving them sequentially
/// per port/method pair.
pub struct CassetteReplayer {
    /// Per port+method queue of interactions (in order).
    queues: HashMap<PortMethodKey, Vec<Interaction>>,
    /// Per port+method cursor tracking position.
    cursors: HashMap<PortMethodKey, usize>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<PortMethodKey, Vec<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            let key = PortMethodKey {
                port: interaction.port.clone(),
                method: interaction.method.clone(),
            };
            queues.entry(key).or_default().push(interaction.clone());
        }
        let cursors = queues.keys().map(|k| (k.clone(), 0)).collect();
        Self { queues, cursors }
    }

    /// Return the next interaction for the given port and method.
    ///
    /// # Errors
    ///
    /// Returns a message naming what was requested and what remains when the
    /// cassette has no (more) interactions for the port/method pair.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Result<&Interaction, String> {
        let key = PortMethodKey { port: port.to_string(), method: method.to_string() };

        let Some(queue) = self.queues.get(&key) else {
            let mut available: Vec<String> =
                self.queues.keys().map(|k| format!("{}::{}", k.port, k.method)).collect();
            available.sort();
            return Err(format!(
                "Cassette exhausted: no interactions recorded for port={port:?} method={method:?}. \
                 Available port::method pairs: [{}]",
                available.join(", ")
            ));
        };

        let cursor = self.cursors.entry(key).or_insert(0);
        if *cursor >= queue.len() {
            return Err(format!(
                "Cassette exhausted: all {count} interactions for port={port:?} method={method:?} \
                 have been consumed. Last interaction was seq={last_seq}.",
                count = queue.len(),
                last_seq = queue.last().map_or(0, |i| i.seq),
            ));
        }

        let interaction = &queue[*cursor];
        *cursor += 1;
        Ok(interaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use chrono::Utc;
    use serde_json::json;

    fn make_cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            commit: "abc".into(),
            interactions,
        }
    }

    #[test]
    fn replay_monolithic_cassette_in_order() {
        let cassette = make_cassette(vec![
            Interaction {
                seq: 0,
                port: "llm".into(),
                method: "complete".into(),
                input: json!({"prompt": "a"}),
                output: json!({"text": "1"}),
            },
            Interaction {
                seq: 1,
                port: "clock".into(),
                method: "now".into(),
                input: json!({}),
                output: json!("2024-01-01T00:00:00Z"),
            },
            Interaction {
                seq: 2,
                port: "llm".into(),
                method: "complete".into(),
                input: json!({"prompt": "b"}),
                output: json!({"text": "2"}),
            },
        ]);

        let mut replayer = CassetteReplayer::new(&cassette);

        // First llm::complete call
        let i1 = replayer.next_interaction("llm", "complete").unwrap().clone();
        assert_eq!(i1.seq, 0);
        assert_eq!(i1.output, json!({"text": "1"}));

        // clock::now call
        let i2 = replayer.next_interaction("clock", "now").unwrap().clone();
        assert_eq!(i2.seq, 1);
        assert_eq!(i2.output, json!("2024-01-01T00:00:00Z"));

        // Second llm::complete call
        let i3 = replayer.next_interaction("llm", "complete").unwrap().clone();
        assert_eq!(i3.seq, 2);
        assert_eq!(i3.output, json!({"text": "2"}));
    }

    #[test]
    fn exhausted_queue_reports_last_seq() {
        let cassette = make_cassette(vec![Interaction {
            seq: 4,
            port: "llm".into(),
            method: "complete".into(),
            input: json!({}),
            output: json!({}),
        }]);

        let mut replayer = CassetteReplayer::new(&cassette);
        assert!(replayer.next_interaction("llm", "complete").is_ok());
        let err = replayer.next_interaction("llm", "complete").unwrap_err();
        assert!(err.contains("Cassette exhausted"));
        assert!(err.contains("seq=4"));
    }

    #[test]
    fn unknown_port_lists_available_pairs() {
        let cassette = make_cassette(vec![Interaction {
            seq: 0,
            port: "clock".into(),
            method: "now".into(),
            input: json!({}),
            output: json!("2024-01-01T00:00:00Z"),
        }]);
        let mut replayer = CassetteReplayer::new(&cassette);
        let err = replayer.next_interaction("llm", "complete").unwrap_err();
        assert!(err.contains("no interactions recorded"));
        assert!(err.contains("clock::now"));
    }
}
