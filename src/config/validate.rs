// src/config/validate.rs

use std::net::ToSocketAddrs;

use anyhow::{anyhow, Context, Result};
use globset::Glob;

use crate::config::model::ConfigFile;

/// Run semantic validation against a loaded configuration.
///
/// This checks:
/// - every category has non-empty `src`, `watch` and `dest`
/// - all globs compile
/// - no two categories share the same output directory (sibling tasks may run
///   concurrently, so output paths must be disjoint by construction; nesting
///   like `build/` + `build/css/` is fine because each task only writes its
///   own relative layout)
/// - the HTTP and WebSocket ports differ
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_path_table(cfg)?;
    validate_globs(cfg)?;
    validate_dest_distinct(cfg)?;
    validate_serve(cfg)?;
    Ok(())
}

fn validate_path_table(cfg: &ConfigFile) -> Result<()> {
    for (category, paths) in cfg.paths.iter() {
        if paths.src.trim().is_empty() {
            return Err(anyhow!("[paths.{category}] has an empty `src` glob"));
        }
        if paths.watch.trim().is_empty() {
            return Err(anyhow!("[paths.{category}] has an empty `watch` glob"));
        }
        if paths.dest.as_os_str().is_empty() {
            return Err(anyhow!("[paths.{category}] has an empty `dest` directory"));
        }
    }
    Ok(())
}

fn validate_globs(cfg: &ConfigFile) -> Result<()> {
    for (category, paths) in cfg.paths.iter() {
        Glob::new(&paths.src)
            .with_context(|| format!("invalid `src` glob for [paths.{category}]: {}", paths.src))?;
        Glob::new(&paths.watch).with_context(|| {
            format!("invalid `watch` glob for [paths.{category}]: {}", paths.watch)
        })?;
    }
    Ok(())
}

fn validate_dest_distinct(cfg: &ConfigFile) -> Result<()> {
    let dests: Vec<_> = cfg.paths.iter().collect();

    for (i, (cat_a, paths_a)) in dests.iter().enumerate() {
        for (cat_b, paths_b) in dests.iter().skip(i + 1) {
            let a: Vec<_> = paths_a.dest.components().collect();
            let b: Vec<_> = paths_b.dest.components().collect();
            if a == b {
                return Err(anyhow!(
                    "[paths.{cat_a}] and [paths.{cat_b}] share the output directory {:?}",
                    paths_a.dest
                ));
            }
        }
    }
    Ok(())
}

fn validate_serve(cfg: &ConfigFile) -> Result<()> {
    if cfg.serve.port == cfg.serve.ws_port {
        return Err(anyhow!(
            "[serve] port and ws_port must differ (both are {})",
            cfg.serve.port
        ));
    }
    if cfg.serve.host.trim().is_empty() {
        return Err(anyhow!("[serve] host must not be empty"));
    }
    // Hostnames are as valid as IP literals (a dev box alias like `localhost`
    // or an /etc/hosts entry); only a host that resolves to nothing is wrong.
    (cfg.serve.host.as_str(), cfg.serve.port)
        .to_socket_addrs()
        .with_context(|| format!("[serve] host does not resolve: {}", cfg.serve.host))?;
    if cfg.serve.dirs.is_empty() {
        return Err(anyhow!("[serve] dirs must list at least one directory"));
    }
    Ok(())
}
