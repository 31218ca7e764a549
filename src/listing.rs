use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ServeError;

/// One entry in a directory listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub name: String,
    pub is_directory: bool,
    /// Byte size, files only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Last modification time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

/// Listing of a single directory
#[derive(Debug, Serialize)]
pub struct Listing {
    /// Path relative to the served root (empty string for the root)
    pub path: String,
    pub files: Vec<DirectoryEntry>,
    /// Parent relative path, absent at the root
    pub parent: Option<String>,
}

/// Enumerate the immediate children of `dir` as a listing.
///
/// `relative` is the directory's decoded path relative to the served
/// root, as produced by the resolver. Entries are sorted directories
/// first, then case-insensitively by name.
pub fn build_listing(dir: &Path, relative: &str) -> Result<Listing, ServeError> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_directory = metadata.is_dir();

        files.push(DirectoryEntry {
            name,
            is_directory,
            size: (!is_directory).then(|| metadata.len()),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        });
    }

    files.sort_by(|a, b| match (a.is_directory, b.is_directory) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });

    let relative = relative.trim_matches('/');
    let parent = if relative.is_empty() {
        None
    } else {
        Some(parent_path(relative).to_string())
    };

    Ok(Listing {
        path: relative.to_string(),
        files,
        parent,
    })
}

/// Parent of a relative path; the empty string denotes the root.
fn parent_path(relative: &str) -> &str {
    relative.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lists_files_and_directories_with_metadata() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("x.txt"), "0123456789").unwrap();
        std::fs::create_dir(dir.path().join("y")).unwrap();

        let listing = build_listing(dir.path(), "sub").unwrap();
        assert_eq!(listing.files.len(), 2);

        // Directories sort first.
        let y = &listing.files[0];
        assert_eq!(y.name, "y");
        assert!(y.is_directory);
        assert_eq!(y.size, None);

        let x = &listing.files[1];
        assert_eq!(x.name, "x.txt");
        assert!(!x.is_directory);
        assert_eq!(x.size, Some(10));
        assert!(x.modified.is_some());

        assert_eq!(listing.path, "sub");
        assert_eq!(listing.parent, Some("".to_string()));
    }

    #[test]
    fn root_listing_has_no_parent() {
        let dir = TempDir::new().unwrap();
        let listing = build_listing(dir.path(), "").unwrap();
        assert_eq!(listing.parent, None);
        assert_eq!(listing.path, "");
    }

    #[test]
    fn nested_parent_is_the_enclosing_directory() {
        let dir = TempDir::new().unwrap();
        let listing = build_listing(dir.path(), "a/b/c").unwrap();
        assert_eq!(listing.parent, Some("a/b".to_string()));
    }

    #[test]
    fn sorts_directories_first_then_case_insensitive_names() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("B.txt"), "").unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("zdir")).unwrap();

        let listing = build_listing(dir.path(), "").unwrap();
        let names: Vec<_> = listing.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["zdir", "a.txt", "B.txt"]);
    }

    #[test]
    fn entries_serialize_with_camel_case_keys() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("x.txt"), "abc").unwrap();

        let listing = build_listing(dir.path(), "").unwrap();
        let json = serde_json::to_value(&listing).unwrap();
        let entry = &json["files"][0];
        assert_eq!(entry["name"], "x.txt");
        assert_eq!(entry["isDirectory"], false);
        assert_eq!(entry["size"], 3);
        assert!(entry["modified"].is_string());
        assert!(json["parent"].is_null());
    }
}
