/*!
 * Bundled static assets (icons, stylesheets, logo)
 */

use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::Result;
use crate::path_guard::PathGuard;

/// Cache directive sent with every asset; assets only change between deployments
pub const ASSET_CACHE_CONTROL: &str = "public, max-age=1209600";

/// Content type for extensions not in the table
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Extension to content type table
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("ico", "image/vnd.microsoft.icon"),
    ("png", "image/png"),
    ("css", "text/css"),
];

/// A loaded asset, ready to be written into a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Content-Type header value
    pub content_type: &'static str,
    /// Content-Length header value
    pub content_length: u64,
    /// Cache-Control header value
    pub cache_control: &'static str,
    /// File contents
    pub body: Vec<u8>,
}

/// Content type for an asset name, decided by extension only
pub fn content_type_for(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

    extension
        .and_then(|ext| {
            CONTENT_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, content_type)| *content_type)
        })
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

/// Serves files from the asset directory
#[derive(Debug, Clone)]
pub struct AssetServer {
    guard: PathGuard,
}

impl AssetServer {
    /// Create an asset server rooted at `root`
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            guard: PathGuard::new(root)?,
        })
    }

    /// Load an asset by name
    ///
    /// Unknown names and names escaping the asset directory both fail with
    /// the same `NotFound`.
    pub fn serve(&self, name: &str) -> Result<Asset> {
        let path = self.guard.resolve_file(name).map_err(|e| {
            warn!(asset = name, "rejected asset request");
            e
        })?;

        let body = fs::read(&path)?;
        Ok(Asset {
            content_type: content_type_for(name),
            content_length: body.len() as u64,
            cache_control: ASSET_CACHE_CONTROL,
            body,
        })
    }
}
