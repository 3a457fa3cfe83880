use serde::Deserialize;

/// One inbound protocol message, discriminated by the `type` field.
///
/// Unknown fields (e.g. the backend attaches a `latency` to objection
/// messages) are ignored; an unknown `type` fails to parse and is dropped
/// by the transport like any other malformed message.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// One utterance update. Repeated updates for the same utterance
    /// share (approximately) the same start time.
    Transcript {
        /// Start time of the utterance in seconds
        start: f64,
        text: String,
        #[serde(default)]
        is_final: bool,
    },

    /// Derived insight snapshot. Absent fields mean "unchanged".
    Analysis {
        #[serde(default)]
        script_location: Option<String>,
        #[serde(default)]
        key_points: Option<Vec<String>>,
        #[serde(default)]
        suggestion: Option<String>,
    },

    /// Detected objection plus a suggested rebuttal.
    Objection { text: String, response: String },

    /// Synchronous failure report from the backend. Non-fatal.
    Error { error: String },
}

/// Build the backend WebSocket URL, upgrading the scheme when the session
/// runs over an encrypted page.
pub fn endpoint_url(host: &str, port: u16, path: &str, tls: bool) -> String {
    let scheme = if tls { "wss" } else { "ws" };
    format!("{}://{}:{}{}", scheme, host, port, path)
}
