use std::path::Path;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::error::ServeError;
use crate::listing::{self, Listing};
use crate::resolve::{self, PathKind, Resolved};
use crate::{AppState, ServerInfo};

// ============================================================================
// Helper functions
// ============================================================================

/// Strip a route prefix from a raw request path.
///
/// Handlers work on the raw (still percent-encoded) URI path so the
/// resolver can own decoding; axum's `Path` captures would pre-decode.
fn strip_route_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    path.strip_prefix(prefix).unwrap_or(path)
}

/// Run the listing builder for a resolved directory on a blocking thread.
async fn listing_for(resolved: Resolved) -> Result<Listing, ServeError> {
    let Resolved { path, relative, .. } = resolved;
    tokio::task::spawn_blocking(move || listing::build_listing(&path, &relative))
        .await
        .map_err(|err| {
            ServeError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                err.to_string(),
            ))
        })?
}

/// Stream a file response with guessed MIME type and content length.
async fn stream_file(path: &Path, disposition: &str) -> Result<Response, ServeError> {
    debug!("Streaming file: {}", path.display());

    let metadata = fs::metadata(path).await?;
    let file_size = metadata.len();

    let file = fs::File::open(path).await?;
    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    let mime = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    // Sanitize filename for Content-Disposition header
    let safe_filename = file_name.replace('"', "'");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime),
            (header::CONTENT_LENGTH, file_size.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("{}; filename=\"{}\"", disposition, safe_filename),
            ),
        ],
        body,
    )
        .into_response())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/server-info - Startup snapshot
pub async fn server_info(State(state): State<AppState>) -> Json<ServerInfo> {
    Json((*state.info).clone())
}

/// GET /api/browse and /api/browse/*path - Directory listing as JSON
pub async fn api_browse(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Json<Listing>, ServeError> {
    let request_path = strip_route_prefix(uri.path(), "/api/browse");
    let resolved = resolve::resolve(&state.root_dir, request_path)?;

    if resolved.kind != PathKind::Directory {
        return Err(ServeError::NotADirectory);
    }

    let listing = listing_for(resolved).await?;
    Ok(Json(listing))
}

/// GET /download and /download/*path - File download as attachment
pub async fn download(State(state): State<AppState>, uri: Uri) -> Result<Response, ServeError> {
    let request_path = strip_route_prefix(uri.path(), "/download");
    let resolved = resolve::resolve(&state.root_dir, request_path)?;

    if resolved.kind == PathKind::Directory {
        return Err(ServeError::NotAFile);
    }

    stream_file(&resolved.path, "attachment").await
}

/// GET / and /*path - Browser-facing variant
///
/// Directories render as an HTML listing page, files are streamed inline.
/// Same resolver as the JSON API, different presentation.
pub async fn browse_page(State(state): State<AppState>, uri: Uri) -> Result<Response, ServeError> {
    let request_path = uri.path();
    let resolved = resolve::resolve(&state.root_dir, request_path)?;

    match resolved.kind {
        PathKind::Directory => {
            let listing = listing_for(resolved).await?;
            Ok(Html(render_listing_page(&listing)).into_response())
        }
        PathKind::File => stream_file(&resolved.path, "inline").await,
    }
}

// ============================================================================
// HTML rendering
// ============================================================================

const PAGE_STYLE: &str = "\
body { font-family: sans-serif; margin: 40px; background: #f5f5f5; }\
.container { background: white; padding: 30px; border-radius: 8px; }\
h1 { color: #333; }\
ul { list-style: none; padding: 0; }\
li { margin: 4px 0; padding: 6px; border-radius: 4px; }\
li:hover { background: #f0f0f0; }\
a { text-decoration: none; color: #0066cc; }\
.folder a { color: #cc6600; font-weight: bold; }\
.size { color: #666; font-size: 12px; margin-left: 12px; }\
.download { font-size: 12px; margin-left: 12px; }";

/// Render a directory listing page.
fn render_listing_page(listing: &Listing) -> String {
    let display_path = format!("/{}", listing.path);

    let mut items = String::new();
    if let Some(parent) = &listing.parent {
        items.push_str(&format!(
            "<li class=\"folder\"><a href=\"/{}\">../</a></li>\n",
            encode_path(parent)
        ));
    }

    for entry in &listing.files {
        let href = encode_path(&join_relative(&listing.path, &entry.name));
        let name = html_escape(&entry.name);
        if entry.is_directory {
            items.push_str(&format!(
                "<li class=\"folder\"><a href=\"/{}\">{}/</a></li>\n",
                href, name
            ));
        } else {
            let size = entry.size.map(format_size).unwrap_or_default();
            items.push_str(&format!(
                "<li><a href=\"/{href}\">{name}</a>\
                 <span class=\"size\">{size}</span>\
                 <a class=\"download\" href=\"/download/{href}\">download</a></li>\n",
            ));
        }
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<title>Directory listing for {title}</title>\n\
         <style>{style}</style>\n</head>\n<body>\n<div class=\"container\">\n\
         <h1>Directory listing for {title}</h1>\n<ul>\n{items}</ul>\n</div>\n</body>\n</html>\n",
        title = html_escape(&display_path),
        style = PAGE_STYLE,
        items = items,
    )
}

/// Join a listing path and an entry name into a relative path.
fn join_relative(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}

/// Percent-encode each segment of a relative path for use in an href.
fn encode_path(relative: &str) -> String {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn html_escape(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::DirectoryEntry;

    #[test]
    fn strip_route_prefix_keeps_remainder() {
        assert_eq!(strip_route_prefix("/api/browse/a/b", "/api/browse"), "/a/b");
        assert_eq!(strip_route_prefix("/api/browse", "/api/browse"), "");
        assert_eq!(strip_route_prefix("/download/x.txt", "/download"), "/x.txt");
    }

    #[test]
    fn encode_path_escapes_segments_not_separators() {
        assert_eq!(encode_path("a b/c.txt"), "a%20b/c.txt");
        assert_eq!(encode_path(""), "");
        assert_eq!(encode_path("plain"), "plain");
    }

    #[test]
    fn html_escape_covers_markup_characters() {
        assert_eq!(html_escape("<a&\"'>"), "&lt;a&amp;&quot;&#39;&gt;");
        assert_eq!(html_escape("plain.txt"), "plain.txt");
    }

    #[test]
    fn format_size_picks_sensible_units() {
        assert_eq!(format_size(10), "10 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn listing_page_links_entries_and_parent() {
        let listing = Listing {
            path: "docs".to_string(),
            files: vec![
                DirectoryEntry {
                    name: "sub".to_string(),
                    is_directory: true,
                    size: None,
                    modified: None,
                },
                DirectoryEntry {
                    name: "a b.txt".to_string(),
                    is_directory: false,
                    size: Some(10),
                    modified: None,
                },
            ],
            parent: Some("".to_string()),
        };

        let page = render_listing_page(&listing);
        assert!(page.contains("Directory listing for /docs"));
        assert!(page.contains("href=\"/\">../"));
        assert!(page.contains("href=\"/docs/sub\""));
        assert!(page.contains("href=\"/docs/a%20b.txt\""));
        assert!(page.contains("href=\"/download/docs/a%20b.txt\""));
        assert!(page.contains("10 B"));
    }

    #[test]
    fn root_listing_page_has_no_parent_link() {
        let listing = Listing {
            path: "".to_string(),
            files: vec![],
            parent: None,
        };

        let page = render_listing_page(&listing);
        assert!(!page.contains("../"));
    }
}
