//! Separated-directory layout: one subdirectory per item.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use super::MaterializeError;

/// Suffix appended to a relocated file whose name is already taken.
const COLLISION_SUFFIX: &str = "_1";

/// Ensures `<root>/<base_name>/` exists and moves flat-layout files of the
/// item (`<root>/<base_name>.*`) into it.
///
/// A file whose target name is taken is moved under `<base_name>_1.*`
/// instead; when that is taken too it is left in place. Returns the item
/// directory.
///
/// # Errors
///
/// Returns [`MaterializeError::Io`] when the directory cannot be created or
/// the root cannot be read. Failures moving individual files are logged.
pub async fn relocate_into_item_dir(
    root: &Path,
    base_name: &str,
) -> Result<PathBuf, MaterializeError> {
    let item_dir = root.join(base_name);
    fs::create_dir_all(&item_dir)
        .await
        .map_err(|e| MaterializeError::io(&item_dir, e))?;

    let prefix = format!("{base_name}.");
    let mut entries = fs::read_dir(root)
        .await
        .map_err(|e| MaterializeError::io(root, e))?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        let Some(rest) = name.to_str().and_then(|name| name.strip_prefix(&prefix)) else {
            continue;
        };
        if !entry.file_type().await.is_ok_and(|t| t.is_file()) {
            continue;
        }

        let source = entry.path();
        let Some(target) = free_target(&item_dir, base_name, rest).await else {
            warn!(path = %source.display(), "no free name in item directory; leaving file in place");
            continue;
        };
        match fs::rename(&source, &target).await {
            Ok(()) => debug!(from = %source.display(), to = %target.display(), "relocated file"),
            Err(error) => warn!(path = %source.display(), error = %error, "could not relocate file"),
        }
    }

    Ok(item_dir)
}

async fn free_target(item_dir: &Path, base_name: &str, extension: &str) -> Option<PathBuf> {
    for name in [
        format!("{base_name}.{extension}"),
        format!("{base_name}{COLLISION_SUFFIX}.{extension}"),
    ] {
        let candidate = item_dir.join(name);
        if !fs::try_exists(&candidate).await.unwrap_or(true) {
            return Some(candidate);
        }
    }
    None
}
