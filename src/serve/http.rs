// src/serve/http.rs

//! Static file server for the build output.
//!
//! Serves the configured directories with a tiny reload script injected into
//! HTML responses so the browser connects back to the WebSocket hub.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use tiny_http::{Header, Request, Response, Server};
use tracing::{debug, info, warn};

use crate::config::model::ServeSection;
use crate::errors::PipelineError;

/// Client-side reload script. `__WS_PORT__` is replaced at injection time.
const RELOAD_SCRIPT: &str = r#"<script>
(function () {
  var ws = new WebSocket("ws://" + location.hostname + ":__WS_PORT__");
  ws.onmessage = function (e) {
    var msg = JSON.parse(e.data);
    if (msg.type === "css") {
      document.querySelectorAll("link[rel=stylesheet]").forEach(function (link) {
        var url = new URL(link.href);
        url.searchParams.set("v", Date.now());
        link.href = url.href;
      });
    } else if (msg.type === "reload") {
      location.reload();
    }
  };
})();
</script>"#;

/// Bind the HTTP listener and spawn the request loop thread.
///
/// Fails with [`PipelineError::PortInUse`] if the configured port is taken.
pub fn spawn_http_server(root: PathBuf, serve: ServeSection) -> Result<SocketAddr> {
    // The host may be a name (`localhost`, an /etc/hosts alias), not just an
    // IP literal; resolve it and bind the first address.
    let addr: SocketAddr = (serve.host.as_str(), serve.port)
        .to_socket_addrs()
        .with_context(|| format!("resolving server address {}:{}", serve.host, serve.port))?
        .next()
        .with_context(|| {
            format!("server address {}:{} resolved to nothing", serve.host, serve.port)
        })?;

    let server = Server::http(addr).map_err(|err| {
        match err.downcast::<std::io::Error>() {
            Ok(io_err) if io_err.kind() == std::io::ErrorKind::AddrInUse => {
                anyhow::Error::from(PipelineError::PortInUse { addr })
            }
            Ok(io_err) => anyhow::Error::from(*io_err).context(format!("binding http server on {addr}")),
            Err(other) => anyhow::anyhow!("binding http server on {addr}: {other}"),
        }
    })?;

    let dirs: Vec<PathBuf> = serve.dirs.iter().map(|d| root.join(d)).collect();
    let ws_port = serve.ws_port;

    info!("dev server listening on http://{addr}");

    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            if let Err(err) = handle_request(request, &dirs, ws_port) {
                warn!(error = %err, "request error");
            }
        }
    });

    Ok(addr)
}

fn handle_request(request: Request, dirs: &[PathBuf], ws_port: u16) -> Result<()> {
    let url = request.url().split('?').next().unwrap_or("/").to_string();

    let Some(rel) = sanitize_url_path(&url) else {
        debug!(url = %url, "rejected request path");
        return respond_status(request, 404);
    };

    for dir in dirs {
        let mut candidate = dir.join(&rel);
        if candidate.is_dir() {
            candidate = candidate.join("index.html");
        }
        if candidate.is_file() {
            return respond_file(request, &candidate, ws_port);
        }
    }

    debug!(url = %url, "not found");
    respond_status(request, 404)
}

fn respond_file(request: Request, path: &Path, ws_port: u16) -> Result<()> {
    let content_type = content_type_for(path);

    let mut body =
        std::fs::read(path).with_context(|| format!("reading served file {:?}", path))?;
    if content_type == "text/html" {
        body = inject_reload_script(body, ws_port);
    }

    let response = Response::from_data(body).with_header(header("Content-Type", content_type));
    request.respond(response).context("sending response")?;
    Ok(())
}

fn respond_status(request: Request, status: u16) -> Result<()> {
    request
        .respond(Response::empty(status))
        .context("sending status response")?;
    Ok(())
}

fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("static header is valid")
}

/// Turn a request URL into a safe relative path: no parent components, no
/// absolute escapes.
fn sanitize_url_path(url: &str) -> Option<PathBuf> {
    let trimmed = url.trim_start_matches('/');
    let path = Path::new(trimmed);

    let mut rel = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => rel.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(rel)
}

/// Append the reload script just before `</body>` (or at the end when the
/// document has no closing tag).
fn inject_reload_script(body: Vec<u8>, ws_port: u16) -> Vec<u8> {
    let script = RELOAD_SCRIPT.replace("__WS_PORT__", &ws_port.to_string());
    let text = match String::from_utf8(body) {
        Ok(text) => text,
        // Mislabelled binary; serve untouched.
        Err(err) => return err.into_bytes(),
    };

    let injected = match text.rfind("</body>") {
        Some(pos) => {
            let mut out = String::with_capacity(text.len() + script.len());
            out.push_str(&text[..pos]);
            out.push_str(&script);
            out.push_str(&text[pos..]);
            out
        }
        None => {
            let mut out = text;
            out.push_str(&script);
            out
        }
    };
    injected.into_bytes()
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") | Some("mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_components_are_rejected() {
        assert!(sanitize_url_path("/../etc/passwd").is_none());
        assert!(sanitize_url_path("/a/../../b").is_none());
        assert_eq!(
            sanitize_url_path("/css/app.css"),
            Some(PathBuf::from("css/app.css"))
        );
        assert_eq!(sanitize_url_path("/"), Some(PathBuf::new()));
    }

    #[test]
    fn reload_script_lands_before_closing_body() {
        let html = b"<html><body><p>hi</p></body></html>".to_vec();
        let out = String::from_utf8(inject_reload_script(html, 35729)).unwrap();

        assert!(out.contains("35729"), "ws port templated in: {out}");
        let script_pos = out.find("<script>").unwrap();
        let body_pos = out.find("</body>").unwrap();
        assert!(script_pos < body_pos);
    }

    #[test]
    fn documents_without_body_get_script_appended() {
        let html = b"<p>fragment</p>".to_vec();
        let out = String::from_utf8(inject_reload_script(html, 4000)).unwrap();
        assert!(out.ends_with("</script>"));
    }
}
