//! Mapping header dependencies to module names.
//!
//! Headers follow the `<Module>_<Symbol>.hxx` naming convention, so the owning
//! module of a header is recoverable from its file name alone. Headers that do
//! not follow the convention simply resolve to nothing.

use std::collections::{BTreeSet, HashSet};
use tracing::trace;

/// Candidate module name for a header path or symbol path.
///
/// Final path segment, extension stripped, cut at the first underscore.
pub fn module_name_of(dependency: &str) -> Option<&str> {
    let file_name = dependency.rsplit(['/', '\\']).next()?;
    let stem = file_name.split('.').next()?;
    let candidate = stem.split('_').next()?;

    if candidate.is_empty() {
        None
    } else {
        Some(candidate)
    }
}

/// Reduce raw dependencies to the set of other known modules
pub fn resolve_module_dependencies<'a>(
    module: &str,
    dependencies: impl IntoIterator<Item = &'a String>,
    known_modules: &HashSet<String>,
) -> BTreeSet<String> {
    let mut resolved = BTreeSet::new();

    for dependency in dependencies {
        match module_name_of(dependency) {
            Some(name) if known_modules.contains(name) => {
                resolved.insert(name.to_string());
            }
            _ => trace!("Dropping unresolved dependency {dependency} of {module}"),
        }
    }

    resolved.remove(module);
    resolved
}
