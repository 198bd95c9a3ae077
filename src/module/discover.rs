//! Header enumeration for a module.

use crate::config::ParserSettings;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Headers of `module` directly under `prefix`, sorted by file name.
///
/// A header belongs to module `M` when it is named `M.<ext>` or `M_*.<ext>`.
/// Returned paths are relative to `prefix`. Headers listed in the module's
/// `skip_headers` are left out.
pub fn discover_headers(
    prefix: &Path,
    module: &str,
    settings: &ParserSettings,
) -> std::io::Result<Vec<PathBuf>> {
    let exact = format!("{module}.{}", settings.header_extension);
    let stem_prefix = format!("{module}_");
    let suffix = format!(".{}", settings.header_extension);

    let mut headers = Vec::new();
    for entry in WalkDir::new(prefix).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };

        let matches = file_name == exact
            || (file_name.starts_with(&stem_prefix) && file_name.ends_with(&suffix));
        if !matches {
            continue;
        }
        if settings.skips_header(module, file_name) {
            debug!("Skipping {file_name} for module {module}");
            continue;
        }
        headers.push(PathBuf::from(file_name));
    }

    headers.sort();
    Ok(headers)
}
