//! Live-reload wire messages.
//!
//! Outbound frames follow the LiveReload protocol (`command` tag). Inbound
//! frames are classified into handshake, informational, or custom payloads
//! that are relayed to the other clients.

use serde::Serialize;
use serde_json::Value;

/// Protocol advertised in the hello handshake.
pub const LIVERELOAD_PROTOCOL: &str = "http://livereload.com/protocols/official-7";

/// Name advertised in the hello handshake.
pub const SERVER_NAME: &str = "devserve";

/// Frame sent from the server to a live-reload client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum ServerFrame {
    /// Ask the client to reload `path`.
    Reload { path: String },
    /// Handshake reply.
    Hello {
        protocols: Vec<String>,
        #[serde(rename = "serverName")]
        server_name: String,
    },
}

impl ServerFrame {
    pub fn reload(path: impl Into<String>) -> Self {
        Self::Reload { path: path.into() }
    }

    pub fn hello() -> Self {
        Self::Hello {
            protocols: vec![LIVERELOAD_PROTOCOL.to_string()],
            server_name: SERVER_NAME.to_string(),
        }
    }

    /// Serialize to the JSON text sent on the socket.
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Frame received from a live-reload client.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Protocol handshake.
    Hello,
    /// Client status report; logged only.
    Info(Value),
    /// Anything else; relayed to every other client.
    Custom(Value),
}

impl Inbound {
    /// Classify a text frame. Fails when the text is not JSON.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        let command = value.get("command").and_then(Value::as_str);

        Ok(match command {
            Some("hello") => Inbound::Hello,
            Some("info") => Inbound::Info(value),
            _ => Inbound::Custom(value),
        })
    }
}
