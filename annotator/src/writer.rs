//! Writes updated contexts to an output directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{AnnotateError, Result};
use crate::model::Context;

/// Suffix of the sibling file a target is staged in before it is renamed.
const STAGING_SUFFIX: &str = ".tmp";

/// Writes each context as pretty-printed JSON to `out_dir/<context name>`,
/// creating `out_dir` if needed. Returns the written paths.
///
/// Every context is serialized and staged before the first one replaces its
/// target, so a failure while staging leaves the directory as it was.
///
/// # Errors
///
/// Returns [`AnnotateError::Io`] if the directory cannot be created or a file
/// cannot be written.
pub fn write_contexts(out_dir: &Path, contexts: &BTreeMap<String, Context>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::with_capacity(contexts.len());
    for (name, context) in contexts {
        let path = out_dir.join(name);
        let json = serde_json::to_string_pretty(&context.to_value())
            .map_err(|e| AnnotateError::parse(&path, e))?;
        files.push((path, json.into_bytes()));
    }

    if !out_dir.is_dir() {
        info!("Creating new output directory: {}", out_dir.display());
        fs::create_dir_all(out_dir).map_err(|e| AnnotateError::io(out_dir, e))?;
    }
    replace_files(&files)?;
    info!("Wrote {} context files to {}", files.len(), out_dir.display());
    Ok(files.into_iter().map(|(path, _)| path).collect())
}

/// Stages every file next to its target, then renames them into place.
/// Staged files are removed again if staging or a rename fails.
pub(crate) fn replace_files(files: &[(PathBuf, Vec<u8>)]) -> Result<()> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());
    for (path, content) in files {
        let staging = staging_path(path);
        if let Err(e) = fs::write(&staging, content) {
            discard(staged.iter().map(|(s, _)| s.as_path()).chain([staging.as_path()]));
            return Err(AnnotateError::io(&staging, e));
        }
        staged.push((staging, path.as_path()));
    }

    for (done, (staging, path)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(staging, path) {
            discard(staged[done..].iter().map(|(s, _)| s.as_path()));
            return Err(AnnotateError::io(path, e));
        }
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(STAGING_SUFFIX);
    path.with_file_name(name)
}

fn discard<'a>(paths: impl Iterator<Item = &'a Path>) {
    for path in paths {
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                warn!("Could not remove {}: {e}", path.display());
            }
        }
    }
}
