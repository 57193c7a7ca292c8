// src/serve/mod.rs

//! Development server: static HTTP plus live-reload WebSocket hub.

pub mod http;
pub mod reload;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::serve::reload::ReloadMessage;
use crate::task::context::TaskContext;

pub use http::spawn_http_server;
pub use reload::{spawn_reload_server, ReloadHub};

/// Start the dev server: bind the WebSocket hub and the HTTP listener.
///
/// Both run on background threads; this returns as soon as the sockets are
/// bound so the caller can continue into watch mode.
pub fn start(ctx: &Arc<TaskContext>) -> Result<()> {
    let serve = &ctx.config().serve;

    spawn_reload_server(&serve.host, serve.ws_port, ctx.reload().clone())?;
    let addr = spawn_http_server(ctx.root().to_path_buf(), serve.clone())?;

    if serve.notify_on_start {
        ctx.reload().broadcast(ReloadMessage::reload("server restarted"));
    }

    info!(
        "serving {:?} on http://{addr} (reload on ws port {})",
        serve.dirs, serve.ws_port
    );
    Ok(())
}
