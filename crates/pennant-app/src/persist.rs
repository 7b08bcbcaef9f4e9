// Result persistence: whole-file JSON overwrite via temp file + rename.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pennant_core::SyncResult;
use tracing::debug;

/// Serialize `result` and replace `path` with it.
///
/// The JSON is written to a sibling `.tmp` file first and renamed into place,
/// so readers see either the previous result or the new one, never a partial
/// file. Parent directories are created as needed.
pub async fn write_result(path: &Path, result: &SyncResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result).context("failed to serialize sync result")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let tmp = temp_path(path);
    tokio::fs::write(&tmp, json.as_bytes())
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e).with_context(|| format!("failed to move {} into place", tmp.display()));
    }

    debug!("wrote {} bytes to {}", json.len(), path.display());
    Ok(())
}

/// Read a previously written result back.
pub async fn read_result(path: &Path) -> Result<SyncResult> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid result JSON in {}", path.display()))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
