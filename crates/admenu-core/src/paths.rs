use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::error::Result;
use crate::io::ensure_dir;

/// Resolve a user-entered file path against `cwd`.
///
/// - `file.txt` (no separator) → `<cwd>/file.txt`
/// - `sub/file.txt` (relative, with separator) → `<cwd>/sub/file.txt`, and the
///   parent directories are created if absent
/// - `/abs/file.txt` (absolute) → unchanged
pub fn resolve_path(cwd: &Path, input: &str) -> Result<PathBuf> {
    if !input.contains(MAIN_SEPARATOR) {
        return Ok(cwd.join(input));
    }
    if input.starts_with(MAIN_SEPARATOR) {
        return Ok(PathBuf::from(input));
    }

    let resolved = cwd.join(input);
    if let Some(parent) = resolved.parent() {
        ensure_dir(parent)?;
    }
    Ok(resolved)
}
