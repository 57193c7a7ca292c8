// src/serve/reload.rs

//! Live-reload WebSocket hub.
//!
//! Connected dev clients are tracked as sessions; on a change notification
//! every session gets a JSON message. Style changes hot-swap stylesheets
//! without a page reload, everything else reloads the page.

use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tungstenite::{Message, WebSocket};

use crate::errors::PipelineError;
use crate::pipeline::category::AssetCategory;

/// Message pushed to dev clients over the WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Full page reload.
    Reload {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Stylesheet hot-swap; `paths` are the changed sources, informational.
    Css { paths: Vec<String> },
    /// Handshake acknowledgement.
    Connected { version: String },
}

impl ReloadMessage {
    pub fn reload(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Message for a completed rebuild of `category`.
    pub fn for_change(category: AssetCategory, paths: &[String]) -> Self {
        match category {
            AssetCategory::Style => Self::Css {
                paths: paths.to_vec(),
            },
            _ => Self::reload(format!("{category} changed")),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}

/// Session list shared between the acceptor thread and the notifying side.
#[derive(Clone, Default)]
pub struct ReloadHub {
    sessions: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
}

impl ReloadHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().expect("session list poisoned").len()
    }

    /// Perform the WebSocket handshake on an accepted TCP stream and track
    /// the resulting session.
    pub fn attach(&self, stream: TcpStream) -> Result<()> {
        let mut ws = tungstenite::accept(stream)
            .map_err(|e| anyhow::anyhow!("websocket handshake failed: {e}"))?;
        ws.send(Message::text(ReloadMessage::connected().to_json()))
            .context("sending connected message")?;

        self.sessions.lock().expect("session list poisoned").push(ws);
        debug!(sessions = self.session_count(), "reload client connected");
        Ok(())
    }

    /// Push a change notification for `category` to every session.
    ///
    /// Sessions whose send fails are dropped. With no sessions this is a
    /// no-op, not an error.
    pub fn notify(&self, category: AssetCategory, affected: &[String]) {
        self.broadcast(ReloadMessage::for_change(category, affected));
    }

    pub fn broadcast(&self, message: ReloadMessage) {
        let mut sessions = self.sessions.lock().expect("session list poisoned");
        if sessions.is_empty() {
            return;
        }

        let json = message.to_json();
        let before = sessions.len();
        sessions.retain_mut(|ws| ws.send(Message::text(json.clone())).is_ok());

        let dropped = before - sessions.len();
        if dropped > 0 {
            debug!(dropped, "dropped disconnected reload clients");
        }
        debug!(sessions = sessions.len(), message = %json, "pushed reload message");
    }
}

/// Bind the WebSocket listener and spawn the acceptor thread.
///
/// Fails with [`PipelineError::PortInUse`] if the configured port is taken.
pub fn spawn_reload_server(host: &str, port: u16, hub: ReloadHub) -> Result<()> {
    // Same resolution rules as the HTTP side: hostnames are fine.
    let addr: SocketAddr = (host, port)
        .to_socket_addrs()
        .with_context(|| format!("resolving websocket address {host}:{port}"))?
        .next()
        .with_context(|| format!("websocket address {host}:{port} resolved to nothing"))?;

    let listener = TcpListener::bind(addr).map_err(|err| {
        if err.kind() == std::io::ErrorKind::AddrInUse {
            anyhow::Error::from(PipelineError::PortInUse { addr })
        } else {
            anyhow::Error::from(err).context(format!("binding websocket listener on {addr}"))
        }
    })?;

    debug!("reload websocket listening on ws://{addr}");

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(err) = hub.attach(stream) {
                        warn!(error = %err, "failed to attach reload client");
                    }
                }
                Err(err) => {
                    warn!(error = %err, "reload accept error");
                }
            }
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_changes_hot_swap_other_categories_reload() {
        let msg = ReloadMessage::for_change(AssetCategory::Style, &["src/sass/app.scss".into()]);
        assert_eq!(
            msg,
            ReloadMessage::Css {
                paths: vec!["src/sass/app.scss".into()]
            }
        );

        let msg = ReloadMessage::for_change(AssetCategory::Markup, &[]);
        assert!(matches!(msg, ReloadMessage::Reload { .. }));
    }

    #[test]
    fn messages_serialize_with_a_type_tag() {
        let json = ReloadMessage::Css {
            paths: vec!["a.scss".into()],
        }
        .to_json();
        assert!(json.contains(r#""type":"css""#), "got: {json}");
        assert!(json.contains(r#""a.scss""#), "got: {json}");

        let json = ReloadMessage::reload("markup changed").to_json();
        assert!(json.contains(r#""type":"reload""#), "got: {json}");
        assert!(json.contains("markup changed"), "got: {json}");
    }

    #[test]
    fn notify_without_sessions_is_a_noop() {
        let hub = ReloadHub::new();
        assert_eq!(hub.session_count(), 0);
        hub.notify(AssetCategory::Markup, &[]);
    }
}
