// Path utilities (absolute resolution, extension rewriting)

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub fn is_absolute(path: &Path) -> bool {
    path.is_absolute()
}

/// Resolve `path` against `base` unless it is already absolute
pub fn to_absolute(path: &Path, base: &Path) -> PathBuf {
    if is_absolute(path) {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Replace the final extension of `path`, or append one if it has none
pub fn replace_extension(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext)
}

/// Append `.ext` without touching any dots already in the file name
pub fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}

/// Path as a string for identities and manifests (non-UTF-8 bytes replaced)
pub fn lossy(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Drop `.ext` from `path` if that is its extension; otherwise return it unchanged
pub fn strip_extension(path: &Path, ext: &str) -> PathBuf {
    match path.extension() {
        Some(current) if current == ext => path.with_extension(""),
        _ => path.to_path_buf(),
    }
}
