/*!
 * Resource tree access
 *
 * The browser never owns the tree it renders. Hosts implement
 * [`ResourceTree`]; [`FsTree`] exposes a local directory through the same
 * interface for the command-line tool and for tests.
 */

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use crate::assets::content_type_for;
use crate::error::Result;
use crate::{ensure, error};
use crate::path_guard::PathGuard;
use crate::types::{
    ChildEntry, ComplexValue, NodeInfo, NodeKind, PropertySet, PropertyValue, QName,
    ResourceTypeSet,
};
use crate::utils::{join_path, split_path};

/// Content types for common document extensions; anything else falls back
/// to the asset table
const FILE_CONTENT_TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("pdf", "application/pdf"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("ics", "text/calendar"),
    ("vcf", "text/vcard"),
];

/// Content type of a file, decided by its extension
pub fn file_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    FILE_CONTENT_TYPES
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, content_type)| *content_type)
        .unwrap_or_else(|| content_type_for(&path.to_string_lossy()))
}

/// The host resource tree, as seen by the browser
pub trait ResourceTree {
    /// Resolve a path to a node, failing with `NotFound` when it does not exist
    fn node(&self, path: &str) -> Result<NodeInfo>;

    /// Children of a collection, each with the requested properties it has
    fn children(&self, path: &str, properties: &[QName]) -> Result<Vec<ChildEntry>>;

    /// Every property of one node
    fn properties(&self, path: &str) -> Result<PropertySet>;

    /// Create a collection; the host owns atomicity
    fn create_collection(
        &self,
        path: &str,
        resource_types: &ResourceTypeSet,
        properties: &PropertySet,
    ) -> Result<()>;

    /// Create a file from a stream; the host owns atomicity
    fn create_file(&self, path: &str, data: &mut dyn Read) -> Result<()>;
}

/// A resource tree backed by a local directory
#[derive(Debug, Clone)]
pub struct FsTree {
    /// Containment guard for the root directory
    guard: PathGuard,
}

impl FsTree {
    /// Expose `root` as a resource tree
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        ensure!(root.is_dir(), Config, "Target directory not found: {}", root.display());
        Ok(Self {
            guard: PathGuard::new(root)?,
        })
    }

    /// Canonical root directory
    pub fn root(&self) -> &Path {
        self.guard.root()
    }

    fn locate(&self, path: &str) -> Result<PathBuf> {
        self.guard
            .resolve(path.trim_matches('/'))
            .map_err(|_| error!(NotFound, "node {} does not exist", path))
    }

    /// Location for a node that does not exist yet
    fn locate_new(&self, path: &str) -> Result<PathBuf> {
        let (parent, name) = split_path(path);
        ensure!(
            !matches!(name, "" | "." | ".."),
            InvalidArgument,
            "invalid name for new node: {:?}",
            name
        );
        let parent_path = self.locate(parent)?;
        ensure!(parent_path.is_dir(), InvalidArgument, "{} is not a collection", parent);
        Ok(parent_path.join(name))
    }

    fn node_kind(&self, abs_path: &Path) -> io::Result<NodeKind> {
        let metadata = fs::metadata(abs_path)?;
        Ok(if metadata.is_dir() {
            NodeKind::Collection
        } else if metadata.is_file() {
            NodeKind::File
        } else {
            NodeKind::Other
        })
    }

    /// Live properties derived from filesystem metadata
    fn read_properties(&self, abs_path: &Path) -> io::Result<PropertySet> {
        let metadata = fs::metadata(abs_path)?;
        let mut properties = PropertySet::new();

        let mut resource_types = ResourceTypeSet::new();
        if metadata.is_dir() {
            resource_types.insert(QName::dav("collection"));
        }
        properties.insert(QName::dav("resourcetype"), resource_types.into());

        if metadata.is_file() {
            properties.insert(
                QName::dav("getcontenttype"),
                PropertyValue::Text(file_content_type(abs_path).to_string()),
            );
            properties.insert(
                QName::dav("getcontentlength"),
                PropertyValue::Text(metadata.len().to_string()),
            );
        }

        let modified: DateTime<Utc> = metadata.modified()?.into();
        properties.insert(
            QName::dav("getlastmodified"),
            PropertyValue::Complex(ComplexValue::LastModified(modified)),
        );

        Ok(properties)
    }
}

impl ResourceTree for FsTree {
    fn node(&self, path: &str) -> Result<NodeInfo> {
        let abs_path = self.locate(path)?;
        Ok(NodeInfo {
            path: path.trim_matches('/').to_string(),
            kind: self.node_kind(&abs_path)?,
        })
    }

    fn children(&self, path: &str, properties: &[QName]) -> Result<Vec<ChildEntry>> {
        let abs_path = self.locate(path)?;
        let mut children = Vec::new();

        for entry in WalkDir::new(&abs_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let name = entry.file_name().to_string_lossy().to_string();
            let child_path = join_path(path, &name);

            // links pointing out of the root are not part of the tree
            let Ok(child_abs) = self.guard.resolve(&child_path) else {
                continue;
            };

            let all = self.read_properties(&child_abs)?;
            let selected = properties
                .iter()
                .filter_map(|wanted| all.get(wanted).map(|value| (wanted.clone(), value.clone())))
                .collect();

            children.push(ChildEntry {
                node: NodeInfo {
                    path: child_path,
                    kind: self.node_kind(&child_abs)?,
                },
                properties: selected,
            });
        }

        Ok(children)
    }

    fn properties(&self, path: &str) -> Result<PropertySet> {
        let abs_path = self.locate(path)?;
        Ok(self.read_properties(&abs_path)?)
    }

    fn create_collection(
        &self,
        path: &str,
        resource_types: &ResourceTypeSet,
        properties: &PropertySet,
    ) -> Result<()> {
        let plain = resource_types.iter().all(|t| *t == QName::dav("collection"));
        ensure!(
            plain && properties.is_empty(),
            InvalidArgument,
            "filesystem trees only support plain collections"
        );
        fs::create_dir(self.locate_new(path)?)?;
        Ok(())
    }

    fn create_file(&self, path: &str, data: &mut dyn Read) -> Result<()> {
        let target = self.locate_new(path)?;
        let mut file: File = OpenOptions::new().write(true).create_new(true).open(target)?;
        io::copy(data, &mut file)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use filetime::{set_file_mtime, FileTime};
    use tempfile::{tempdir, TempDir};

    fn setup_tree() -> io::Result<(TempDir, FsTree)> {
        let temp_dir = tempdir()?;
        fs::create_dir(temp_dir.path().join("docs"))?;
        let mut file = File::create(temp_dir.path().join("notes.txt"))?;
        write!(file, "hello")?;
        set_file_mtime(
            temp_dir.path().join("notes.txt"),
            FileTime::from_unix_time(1_700_000_000, 0),
        )?;

        let tree = FsTree::new(temp_dir.path()).map_err(io::Error::from)?;
        Ok((temp_dir, tree))
    }

    #[test]
    fn test_node_kinds() -> Result<()> {
        let (_dir, tree) = setup_tree()?;
        assert!(tree.node("")?.is_collection());
        assert!(tree.node("/docs/")?.is_collection());
        assert_eq!(tree.node("docs")?.path, "docs");
        assert!(tree.node("notes.txt")?.is_file());
        assert!(tree.node("missing").unwrap_err().is_not_found());
        assert!(tree.node("../").unwrap_err().is_not_found());
        Ok(())
    }

    #[test]
    fn test_children_are_sorted_and_filtered() -> Result<()> {
        let (_dir, tree) = setup_tree()?;
        let wanted = [QName::dav("getcontentlength"), QName::dav("displayname")];
        let children = tree.children("", &wanted)?;

        let paths: Vec<_> = children.iter().map(|c| c.node.path.as_str()).collect();
        assert_eq!(paths, ["docs", "notes.txt"]);

        assert!(children[0].properties.is_empty());
        assert_eq!(children[1].properties.len(), 1);
        assert_eq!(
            children[1].properties.get(&QName::dav("getcontentlength")),
            Some(&PropertyValue::Text("5".into()))
        );
        Ok(())
    }

    #[test]
    fn test_all_properties() -> Result<()> {
        let (_dir, tree) = setup_tree()?;
        let props = tree.properties("notes.txt")?;
        let modified = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(
            props.get(&QName::dav("getlastmodified")),
            Some(&PropertyValue::Complex(ComplexValue::LastModified(modified)))
        );
        assert!(props.resource_types().is_empty());
        assert_eq!(
            props.get(&QName::dav("getcontenttype")),
            Some(&PropertyValue::Text("text/plain".into()))
        );
        assert!(tree
            .properties("docs")?
            .resource_types()
            .contains(&QName::dav("collection")));
        Ok(())
    }

    #[test]
    fn test_create_nodes() -> Result<()> {
        let (dir, tree) = setup_tree()?;
        let collection: ResourceTypeSet = std::iter::once(QName::dav("collection")).collect();

        tree.create_collection("docs/new", &collection, &PropertySet::new())?;
        assert!(dir.path().join("docs").join("new").is_dir());

        tree.create_file("docs/new/a.txt", &mut "content".as_bytes())?;
        assert_eq!(
            fs::read_to_string(dir.path().join("docs/new/a.txt"))?,
            "content"
        );

        // existing files are not overwritten
        assert!(tree.create_file("docs/new/a.txt", &mut "x".as_bytes()).is_err());
        assert!(tree
            .create_collection("missing/new", &collection, &PropertySet::new())
            .is_err());
        assert!(tree.create_collection("..", &collection, &PropertySet::new()).is_err());
        Ok(())
    }

    #[test]
    fn test_file_content_types() {
        assert_eq!(file_content_type(Path::new("notes.TXT")), "text/plain");
        assert_eq!(file_content_type(Path::new("a/b/logo.png")), "image/png");
        assert_eq!(file_content_type(Path::new("style.css")), "text/css");
        assert_eq!(
            file_content_type(Path::new("archive.tar.zst")),
            "application/octet-stream"
        );
        assert_eq!(file_content_type(Path::new("README")), "application/octet-stream");
    }

    #[cfg(unix)]
    #[test]
    fn test_escaping_links_are_hidden() -> Result<()> {
        let (dir, tree) = setup_tree()?;
        let outside = tempdir()?;
        std::os::unix::fs::symlink(outside.path(), dir.path().join("elsewhere"))?;

        let children = tree.children("", &[])?;
        assert!(children.iter().all(|c| c.node.path != "elsewhere"));
        assert!(tree.node("elsewhere").unwrap_err().is_not_found());
        Ok(())
    }
}
