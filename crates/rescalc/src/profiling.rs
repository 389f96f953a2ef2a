//! `--profile <path>` support.
//!
//! Search spans (`find`, `search`) are written as Chrome trace events,
//! viewable in `chrome://tracing` or https://ui.perfetto.dev/

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::span::EnteredSpan;
use tracing_subscriber::prelude::*;

/// Keeps the trace open. The root span closes before the file is flushed.
pub struct ProfileGuard {
    _root: EnteredSpan,
    _flush: tracing_chrome::FlushGuard,
}

/// Start tracing into `output_path`, wrapping everything in a `rescalc`
/// span tagged with the subcommand. `None` disables profiling.
pub fn init(output_path: Option<&Path>, command: &str) -> Result<Option<ProfileGuard>> {
    let Some(output_path) = output_path else {
        return Ok(None);
    };

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    log::debug!("Writing {command} trace to {}", output_path.display());

    let (chrome_layer, flush) = tracing_chrome::ChromeLayerBuilder::new()
        .file(output_path)
        .include_args(true)
        .build();

    // `log` already belongs to env_logger, so only the tracing dispatcher is set
    let subscriber = tracing_subscriber::registry().with(chrome_layer);
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        log::warn!("Profile may be empty: {e}");
    }

    let root = tracing::info_span!("rescalc", command).entered();
    Ok(Some(ProfileGuard {
        _root: root,
        _flush: flush,
    }))
}
