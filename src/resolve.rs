use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::error::ServeError;

/// Classification of a resolved filesystem path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
}

/// Result of resolving a client-supplied request path against the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Absolute path, guaranteed to lie within the root
    pub path: PathBuf,
    /// Decoded path relative to the root (empty string for the root itself)
    pub relative: String,
    /// Directory or file
    pub kind: PathKind,
}

/// Resolve a raw request path against `root` and classify the result.
///
/// `request_path` is the raw, still percent-encoded request path; it is
/// decoded exactly once here, before any joining. Decoding before
/// validation is load-bearing: `%2e%2e` must be rejected the same way as
/// a literal `..`.
pub fn resolve(root: &Path, request_path: &str) -> Result<Resolved, ServeError> {
    let (path, relative) = confine(root, request_path)?;

    let metadata = fs::metadata(&path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => ServeError::NotFound(relative.clone()),
        _ => ServeError::Io(err),
    })?;

    let kind = if metadata.is_dir() {
        PathKind::Directory
    } else {
        PathKind::File
    };

    Ok(Resolved {
        path,
        relative,
        kind,
    })
}

/// Decode and lexically join `request_path` under `root`, rejecting
/// anything that escapes it.
///
/// `..` segments are resolved lexically (popping the joined path), so a
/// path may dip into `..` and come back as long as the final result stays
/// under the root. Containment is a lexical check only: symlinks inside
/// the root can still point outside it. That gap is accepted; see the
/// design notes.
fn confine(root: &Path, request_path: &str) -> Result<(PathBuf, String), ServeError> {
    let decoded = urlencoding::decode(request_path)
        .map_err(|_| ServeError::InvalidPath(request_path.to_string()))?;

    if decoded.contains('\0') {
        warn!("Request path contains a null byte: {:?}", request_path);
        return Err(ServeError::InvalidPath(request_path.to_string()));
    }

    // A leading slash means "relative to the served root", not absolute.
    let trimmed = decoded.trim_start_matches('/');

    let mut joined = root.to_path_buf();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(name) => joined.push(name),
            Component::ParentDir => {
                joined.pop();
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => {}
        }
    }

    if !joined.starts_with(root) {
        warn!(
            "Traversal attempt: {:?} resolves outside the served directory",
            request_path
        );
        return Err(ServeError::Forbidden);
    }

    let relative = joined
        .strip_prefix(root)
        .unwrap_or_else(|_| Path::new(""))
        .to_string_lossy()
        .into_owned();

    Ok((joined, relative))
}
