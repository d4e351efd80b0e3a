/*!
 * Form actions submitted from the index page
 *
 * Two mutations are supported, creating a folder and uploading a file. Both
 * only ever use the last path segment of user supplied names, so a name can
 * never place the new node outside the collection the form was posted to.
 */

use std::fs::File;
use std::path::PathBuf;

use strum::{AsRefStr, Display, EnumString};
use tracing::info;
use url::form_urlencoded;

use crate::error::{BrowserError, Result};
use crate::{bail, ensure};
use crate::tree::ResourceTree;
use crate::types::{PropertySet, PropertyValue, QName, ResourceTypeSet};
use crate::utils::{basename, join_path};

/// Query and form parameter carrying the action token
pub const ACTION_PARAM: &str = "sabreAction";

/// Placeholder browsers cannot mangle, standing in for `.` in property field names
const DOT_PLACEHOLDER: &str = "*DOT*";

/// Action tokens understood by the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum BrowserAction {
    /// Serve a bundled asset (GET)
    Asset,
    /// Show the index page for a file-like node (GET)
    Info,
    /// Create a folder (POST)
    Mkcol,
    /// Upload a file (POST)
    Put,
}

/// Whether a POST body with this content type may carry an action
pub fn is_form_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/x-www-form-urlencoded" || mime == "multipart/form-data"
}

/// Fails with `UnsupportedMediaType` unless the content type is a form post
pub fn require_form_content_type(content_type: &str) -> Result<()> {
    if is_form_content_type(content_type) {
        Ok(())
    } else {
        Err(BrowserError::UnsupportedMediaType(content_type.to_string()))
    }
}

/// Decoded form fields, in submission order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<(String, String)>,
}

impl FormData {
    /// Parse an `application/x-www-form-urlencoded` body or query string
    pub fn from_urlencoded(input: &[u8]) -> Self {
        Self {
            fields: form_urlencoded::parse(input).into_owned().collect(),
        }
    }

    /// Append a field
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// First value submitted for a field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over all fields
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Whether no fields were submitted
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A file received through a multipart upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Original file name sent by the client
    pub file_name: String,
    /// Temporary file holding the upload
    pub temp_path: PathBuf,
    /// Whether the host verified this is a genuine upload, not a client supplied path
    pub verified: bool,
}

/// Parse a clark name typed into a form; bad input skips the action
fn submitted_name(raw: &str) -> Result<QName> {
    raw.parse::<QName>()
        .map_err(|e| BrowserError::ValidationSkip(e.to_string()))
}

/// A validated request to create a folder
#[derive(Debug, Clone, PartialEq)]
pub struct MkcolRequest {
    /// Path of the collection to create
    pub path: String,
    /// Resource types of the new collection
    pub resource_types: ResourceTypeSet,
    /// Initial properties
    pub properties: PropertySet,
}

impl MkcolRequest {
    /// Build the request from the submitted form
    ///
    /// Fails with `ValidationSkip` when no usable name was given, or when a
    /// resource type or property field is not a valid clark name.
    pub fn from_form(collection: &str, form: &FormData) -> Result<Self> {
        let name = basename(form.get("name").unwrap_or_default());
        ensure!(!name.is_empty(), ValidationSkip, "folder name is blank");

        let resource_types = match form.get("resourceType") {
            Some(raw) => raw
                .split(',')
                .filter(|t| !t.trim().is_empty())
                .map(|t| submitted_name(t.trim()))
                .collect::<Result<ResourceTypeSet>>()?,
            None => std::iter::once(QName::dav("collection")).collect(),
        };

        // any field named in clark notation becomes an initial property
        let mut properties = PropertySet::new();
        for (field, value) in form.iter().filter(|(f, _)| f.starts_with('{')) {
            let name = submitted_name(&field.replace(DOT_PLACEHOLDER, "."))?;
            properties.insert(name, PropertyValue::Text(value.to_string()));
        }

        Ok(Self {
            path: join_path(collection, name),
            resource_types,
            properties,
        })
    }

    /// Create the collection in the tree
    pub fn execute<T: ResourceTree + ?Sized>(&self, tree: &T) -> Result<()> {
        tree.create_collection(&self.path, &self.resource_types, &self.properties)?;
        info!(path = %self.path, "created collection");
        Ok(())
    }
}

/// A validated request to store an uploaded file
#[derive(Debug, Clone, PartialEq)]
pub struct PutRequest {
    /// Path of the file to create
    pub path: String,
    /// Temporary file holding the upload
    pub source: PathBuf,
}

impl PutRequest {
    /// Build the request from the form and the uploaded files
    ///
    /// Uses the first upload. The optional `name` field overrides the
    /// uploaded file name. Fails with `ValidationSkip` when there is no
    /// upload, no usable name, or the upload is not verified by the host.
    pub fn from_form(collection: &str, form: &FormData, files: &[UploadedFile]) -> Result<Self> {
        let Some(upload) = files.first() else {
            bail!(ValidationSkip, "no file uploaded");
        };

        let mut name = basename(&upload.file_name);
        if let Some(override_name) = form.get("name").map(basename) {
            if !override_name.is_empty() {
                name = override_name;
            }
        }
        ensure!(!name.is_empty(), ValidationSkip, "file name is blank");
        ensure!(upload.verified, ValidationSkip, "upload was not verified by the host");

        Ok(Self {
            path: join_path(collection, name),
            source: upload.temp_path.clone(),
        })
    }

    /// Stream the upload into the tree
    pub fn execute<T: ResourceTree + ?Sized>(&self, tree: &T) -> Result<()> {
        let mut file = File::open(&self.source)?;
        tree.create_file(&self.path, &mut file)?;
        info!(path = %self.path, "stored uploaded file");
        Ok(())
    }
}
