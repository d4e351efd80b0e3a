/*!
 * Configuration handling for davbrowse
 */

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use clap_complete::Shell;
use serde::Deserialize;

use crate::error::Result;
use crate::types::QName;
use crate::{ensure, error};

/// Command-line arguments for davbrowse
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "davbrowse",
    version = env!("CARGO_PKG_VERSION"),
    about = "Render a browsable HTML index for a directory",
    long_about = "Renders the HTML directory index a WebDAV browser plugin would serve for a path inside a local directory, or prints one of the bundled assets."
)]
pub struct Args {
    /// Directory used as the root of the resource tree
    #[clap(default_value = ".")]
    pub directory_path: String,

    /// Path inside the tree to render (empty for the root)
    #[clap(default_value = "")]
    pub path: String,

    /// Write output to this file instead of stdout
    #[clap(long, short)]
    pub output: Option<String>,

    /// Print a bundled asset instead of an index page
    #[clap(long)]
    pub asset: Option<String>,

    /// Base URI the tree is served under
    #[clap(long)]
    pub base_uri: Option<String>,

    /// Directory holding the bundled assets
    #[clap(long)]
    pub asset_root: Option<String>,

    /// JSON configuration file
    #[clap(long)]
    pub config: Option<String>,

    /// Disable the create-folder and upload actions
    #[clap(long)]
    pub no_post: bool,

    /// Do not show the version in generated pages
    #[clap(long)]
    pub hide_version: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Namespace URI to display prefix mapping
///
/// Used for display only; names are always compared by full namespace.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct NamespaceMap {
    prefixes: HashMap<String, String>,
}

impl NamespaceMap {
    /// An empty mapping
    pub fn empty() -> Self {
        Self {
            prefixes: HashMap::new(),
        }
    }

    /// Register a prefix for a namespace
    pub fn insert(&mut self, namespace: impl Into<String>, prefix: impl Into<String>) {
        self.prefixes.insert(namespace.into(), prefix.into());
    }

    /// Prefix registered for a namespace
    pub fn prefix(&self, namespace: &str) -> Option<&str> {
        self.prefixes.get(namespace).map(String::as_str)
    }

    /// Short display form, `prefix:local`, or the Clark form when unmapped
    pub fn display(&self, name: &QName) -> String {
        match self.prefix(&name.namespace) {
            Some(prefix) => format!("{}:{}", prefix, name.local_name),
            None => name.clark(),
        }
    }
}

impl Default for NamespaceMap {
    fn default() -> Self {
        let mut map = Self::empty();
        map.insert("DAV:", "d");
        map.insert("http://sabredav.org/ns", "s");
        map.insert("urn:ietf:params:xml:ns:caldav", "cal");
        map.insert("urn:ietf:params:xml:ns:carddav", "card");
        map.insert("http://calendarserver.org/ns/", "cs");
        map
    }
}

/// Application configuration
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URI of the host server, ending in a slash
    pub base_uri: String,

    /// Directory the bundled assets are served from
    pub asset_root: PathBuf,

    /// Accept folder creation and uploads
    pub enable_post: bool,

    /// Show the crate version in generated pages
    pub expose_version: bool,

    /// Prefixes used when displaying qualified names
    pub namespaces: NamespaceMap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_uri: "/".to_string(),
            asset_root: default_asset_root(),
            enable_post: true,
            expose_version: true,
            namespaces: NamespaceMap::default(),
        }
    }
}

/// Assets shipped with the crate
pub fn default_asset_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(base_uri) = &args.base_uri {
            config.base_uri = base_uri.clone();
        }
        if let Some(asset_root) = &args.asset_root {
            config.asset_root = PathBuf::from(asset_root);
        }
        if args.no_post {
            config.enable_post = false;
        }
        if args.hide_version {
            config.expose_version = false;
        }

        Ok(config.normalized())
    }

    /// Load configuration from a JSON file; missing keys take defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| error!(Config, "cannot read {}: {}", path.display(), e))?;
        let config: Config = serde_json::from_str(&raw)?;
        Ok(config.normalized())
    }

    /// Ensure the base URI ends in a slash
    pub fn normalized(mut self) -> Self {
        if !self.base_uri.ends_with('/') {
            self.base_uri.push('/');
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.asset_root.is_dir(),
            Config,
            "Asset directory not found: {}",
            self.asset_root.display()
        );

        let has_scheme = self
            .base_uri
            .split_once(':')
            .map_or(false, |(scheme, _)| {
                !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric())
            });
        ensure!(
            self.base_uri.starts_with('/') || has_scheme,
            Config,
            "Base URI must be absolute: {}",
            self.base_uri
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BrowserError;
    use std::io::Write;

    use tempfile::NamedTempFile;

    #[test]
    fn test_namespace_display() {
        let map = NamespaceMap::default();
        assert_eq!(map.display(&QName::dav("displayname")), "d:displayname");
        assert_eq!(
            map.display(&QName::new("urn:example", "thing")),
            "{urn:example}thing"
        );
    }

    #[test]
    fn test_from_file_uses_defaults() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"{{ "base_uri": "/dav", "enable_post": false, "namespaces": {{ "urn:example": "ex" }} }}"#
        )?;

        let config = Config::from_file(file.path())?;
        assert_eq!(config.base_uri, "/dav/");
        assert!(!config.enable_post);
        assert!(config.expose_version);
        assert_eq!(config.namespaces.prefix("urn:example"), Some("ex"));
        assert_eq!(config.namespaces.prefix("DAV:"), None);
        Ok(())
    }

    #[test]
    fn test_from_args_overrides() -> Result<()> {
        let args = Args::parse_from([
            "davbrowse",
            "/srv/files",
            "docs",
            "--base-uri",
            "/remote.php/dav",
            "--no-post",
            "--hide-version",
        ]);
        let config = Config::from_args(&args)?;
        assert_eq!(config.base_uri, "/remote.php/dav/");
        assert!(!config.enable_post);
        assert!(!config.expose_version);
        Ok(())
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.base_uri = "relative/".into();
        assert!(config.validate().is_err());

        config.base_uri = "https://example.com/dav/".into();
        assert!(config.validate().is_ok());

        config.asset_root = PathBuf::from("/definitely/not/here");
        assert!(matches!(config.validate(), Err(BrowserError::Config(_))));
    }
}
