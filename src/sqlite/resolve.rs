//! Connection descriptor resolution.
//!
//! A descriptor is either a bare filesystem path or one of the URI-like
//! forms `sqlite:path`, `sqlite://path` and `sqlite:///abs/path`. Only local
//! files are addressed; there is no host component.

use std::path::{Path, PathBuf};

const SCHEME_WITH_SLASHES: &str = "sqlite://";
const SCHEME: &str = "sqlite:";

/// Descriptor that selects the bundled sample database.
pub const SAMPLE_DESCRIPTOR: &str = "sample";

/// Resolve a connection descriptor to an absolute filesystem path.
///
/// Strips `sqlite://` if present, otherwise `sqlite:`, then anchors a
/// relative remainder at the current working directory. The path is not
/// checked for existence.
pub fn resolve(descriptor: &str) -> PathBuf {
    let raw = descriptor
        .strip_prefix(SCHEME_WITH_SLASHES)
        .or_else(|| descriptor.strip_prefix(SCHEME))
        .unwrap_or(descriptor);
    absolutize(Path::new(raw))
}

/// Format a path as a connection string that [`resolve`] maps back to it.
pub fn connection_string(path: &Path) -> String {
    format!("{SCHEME_WITH_SLASHES}{}", path.display())
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    // An empty remainder names the working directory itself.
    let absolute = if path.as_os_str().is_empty() {
        std::env::current_dir()
    } else {
        std::path::absolute(path)
    };
    // Both only fail when the cwd was removed; keep the relative form then.
    absolute.unwrap_or_else(|_| path.to_path_buf())
}
