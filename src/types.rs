/*!
 * Core types and data structures for davbrowse
 */

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::BrowserError;
use crate::{bail, ensure};

/// Namespace of the core WebDAV vocabulary
pub const DAV_NS: &str = "DAV:";

/// A namespaced name in Clark notation, `{namespace}local`
///
/// Identity always uses both parts; prefixes are a display concern only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    /// Namespace URI, empty when the name is not namespaced
    pub namespace: String,
    /// Local part of the name
    pub local_name: String,
}

impl QName {
    /// Create a qualified name from its parts
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    /// Create a name in the `DAV:` namespace
    pub fn dav(local_name: impl Into<String>) -> Self {
        Self::new(DAV_NS, local_name)
    }

    /// The Clark notation form of this name
    pub fn clark(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local_name)
        }
    }
}

impl FromStr for QName {
    type Err = BrowserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ensure!(!s.is_empty(), InvalidArgument, "empty qualified name");
        let Some(rest) = s.strip_prefix('{') else {
            return Ok(QName::new("", s));
        };
        match rest.split_once('}') {
            Some((namespace, local)) if !local.is_empty() => Ok(QName::new(namespace, local)),
            _ => bail!(InvalidArgument, "'{}' is not valid clark notation", s),
        }
    }
}

/// Resource type tags attached to a node
///
/// Duplicates are ignored; members keep the order the host reported them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTypeSet {
    types: Vec<QName>,
}

impl ResourceTypeSet {
    /// Create an empty (untyped) set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag unless already present
    pub fn insert(&mut self, name: QName) {
        if !self.contains(&name) {
            self.types.push(name);
        }
    }

    /// Whether the tag is a member
    pub fn contains(&self, name: &QName) -> bool {
        self.types.iter().any(|t| t == name)
    }

    /// Whether the node is untyped
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Iterate over the tags
    pub fn iter(&self) -> impl Iterator<Item = &QName> {
        self.types.iter()
    }
}

impl FromIterator<QName> for ResourceTypeSet {
    fn from_iter<I: IntoIterator<Item = QName>>(iter: I) -> Self {
        let mut set = ResourceTypeSet::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

/// Typed values that do not map onto any display shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplexValue {
    /// `{DAV:}getlastmodified` style timestamp
    LastModified(DateTime<Utc>),
    /// Any other structured value, identified by its kind
    Other(String),
}

impl ComplexValue {
    /// Name of the concrete kind, shown as a tooltip
    pub fn kind(&self) -> &str {
        match self {
            ComplexValue::LastModified(_) => "GetLastModified",
            ComplexValue::Other(kind) => kind,
        }
    }
}

/// A property value, tagged with its rendering shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// Plain text
    Text(String),
    /// A single link target, relative to the host base URI
    Href(String),
    /// A list of link targets, relative or absolute
    HrefList(Vec<String>),
    /// A list of qualified names
    QNameList(Vec<QName>),
    /// A list of plain values
    ValueList(Vec<String>),
    /// A structured value that is not printed
    Complex(ComplexValue),
    /// A value the host could not type
    Unknown,
}

impl PropertyValue {
    /// Text content, when the value is plain text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<ResourceTypeSet> for PropertyValue {
    fn from(value: ResourceTypeSet) -> Self {
        PropertyValue::QNameList(value.types)
    }
}

/// Properties of one node, in the order the host returned them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySet {
    entries: Vec<(QName, PropertyValue)>,
}

impl PropertySet {
    /// Create an empty property set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing an existing value in place
    pub fn insert(&mut self, name: QName, value: PropertyValue) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a property by name
    pub fn get(&self, name: &QName) -> Option<&PropertyValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in host order
    pub fn iter(&self) -> impl Iterator<Item = (&QName, &PropertyValue)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    /// Resource types carried by `{DAV:}resourcetype`, empty when absent
    pub fn resource_types(&self) -> ResourceTypeSet {
        match self.get(&QName::dav("resourcetype")) {
            Some(PropertyValue::QNameList(names)) => names.iter().cloned().collect(),
            _ => ResourceTypeSet::new(),
        }
    }
}

impl FromIterator<(QName, PropertyValue)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (QName, PropertyValue)>>(iter: I) -> Self {
        let mut set = PropertySet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

/// Basic capability of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Node can enumerate children
    Collection,
    /// File-like node with content
    File,
    /// Neither of the above
    Other,
}

/// A resolved node of the host tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// Path relative to the base URI, without leading or trailing slash
    pub path: String,
    /// Node capability
    pub kind: NodeKind,
}

impl NodeInfo {
    /// Whether the node has enumerable children
    pub fn is_collection(&self) -> bool {
        self.kind == NodeKind::Collection
    }

    /// Whether the node is file-like
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }
}

/// A child of a collection with the requested subset of its properties
#[derive(Debug, Clone)]
pub struct ChildEntry {
    /// Resolved child node
    pub node: NodeInfo,
    /// Properties returned for the child
    pub properties: PropertySet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clark_notation() {
        let name: QName = "{urn:ietf:params:xml:ns:caldav}calendar".parse().unwrap();
        assert_eq!(name.namespace, "urn:ietf:params:xml:ns:caldav");
        assert_eq!(name.local_name, "calendar");
        assert_eq!(name.clark(), "{urn:ietf:params:xml:ns:caldav}calendar");

        let bare: QName = "plain".parse().unwrap();
        assert_eq!(bare.namespace, "");
        assert_eq!(bare.to_string(), "plain");

        assert!("{DAV:}".parse::<QName>().is_err());
        assert!("{DAV:displayname".parse::<QName>().is_err());
        assert!("".parse::<QName>().is_err());
    }

    #[test]
    fn test_resource_type_set_dedups_in_order() {
        let set: ResourceTypeSet = vec![
            QName::dav("collection"),
            QName::dav("principal"),
            QName::dav("collection"),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
        let names: Vec<_> = set.iter().map(|q| q.local_name.as_str()).collect();
        assert_eq!(names, ["collection", "principal"]);
    }

    #[test]
    fn test_property_set_keeps_host_order() {
        let mut props = PropertySet::new();
        props.insert(QName::dav("b"), "1".into());
        props.insert(QName::dav("a"), "2".into());
        props.insert(QName::dav("b"), "3".into());

        let order: Vec<_> = props.iter().map(|(n, _)| n.local_name.clone()).collect();
        assert_eq!(order, ["b", "a"]);
        assert_eq!(props.get(&QName::dav("b")), Some(&PropertyValue::Text("3".into())));
    }

    #[test]
    fn test_resource_types_from_properties() {
        let mut props = PropertySet::new();
        assert!(props.resource_types().is_empty());

        props.insert(
            QName::dav("resourcetype"),
            PropertyValue::QNameList(vec![QName::dav("collection")]),
        );
        assert!(props.resource_types().contains(&QName::dav("collection")));
    }
}
