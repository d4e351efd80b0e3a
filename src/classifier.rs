/*!
 * Resource type classification for the index listing
 *
 * A node may carry several resource type tags. Every tag is reported in the
 * label, but only one icon is shown: the one of the first table entry the
 * node matches, so the table order is the priority order.
 */

use crate::types::{QName, ResourceTypeSet};

const CALDAV: &str = "urn:ietf:params:xml:ns:caldav";
const CARDDAV: &str = "urn:ietf:params:xml:ns:carddav";
const CALENDARSERVER: &str = "http://calendarserver.org/ns/";
const DAV: &str = "DAV:";

/// Icon used when nothing more specific applies
pub const DEFAULT_ICON: &str = "cog";

/// One row of the classification table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationEntry {
    /// Namespace of the resource type
    pub namespace: &'static str,
    /// Local name of the resource type
    pub local_name: &'static str,
    /// Human readable label
    pub label: &'static str,
    /// Icon glyph, `None` when the entry never decides the icon
    pub icon: Option<&'static str>,
}

impl ClassificationEntry {
    const fn new(
        namespace: &'static str,
        local_name: &'static str,
        label: &'static str,
        icon: Option<&'static str>,
    ) -> Self {
        Self {
            namespace,
            local_name,
            label,
            icon,
        }
    }

    fn matches(&self, name: &QName) -> bool {
        name.namespace == self.namespace && name.local_name == self.local_name
    }
}

/// Known resource types, highest icon priority first
pub const CLASSIFICATION_TABLE: &[ClassificationEntry] = &[
    ClassificationEntry::new(CALENDARSERVER, "calendar-proxy-write", "Proxy-Write", Some("people")),
    ClassificationEntry::new(CALENDARSERVER, "calendar-proxy-read", "Proxy-Read", Some("people")),
    ClassificationEntry::new(CALDAV, "schedule-outbox", "Outbox", Some("inbox")),
    ClassificationEntry::new(CALDAV, "schedule-inbox", "Inbox", Some("inbox")),
    ClassificationEntry::new(CALDAV, "calendar", "Calendar", Some("calendar")),
    ClassificationEntry::new(CALENDARSERVER, "shared-owner", "Shared", None),
    ClassificationEntry::new(CALENDARSERVER, "subscribed", "Subscription", None),
    ClassificationEntry::new(CARDDAV, "directory", "Directory", Some("globe")),
    ClassificationEntry::new(CARDDAV, "addressbook", "Address book", Some("book")),
    ClassificationEntry::new(DAV, "principal", "Principal", Some("person")),
    ClassificationEntry::new(DAV, "collection", "Collection", Some("folder")),
];

/// Display label and icon for a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Comma separated labels for every resource type
    pub label: String,
    /// Icon glyph name
    pub icon: &'static str,
}

fn lookup(name: &QName) -> Option<&'static ClassificationEntry> {
    CLASSIFICATION_TABLE.iter().find(|entry| entry.matches(name))
}

/// Classify a node from its resource types and whether it is file-like
pub fn classify(resource_types: &ResourceTypeSet, is_file: bool) -> Classification {
    if resource_types.is_empty() {
        return if is_file {
            Classification {
                label: "File".to_string(),
                icon: "file",
            }
        } else {
            Classification {
                label: "Unknown".to_string(),
                icon: DEFAULT_ICON,
            }
        };
    }

    let label = resource_types
        .iter()
        .map(|name| match lookup(name) {
            Some(entry) => entry.label.to_string(),
            None => name.clark(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    let icon = CLASSIFICATION_TABLE
        .iter()
        .filter(|entry| resource_types.iter().any(|name| entry.matches(name)))
        .find_map(|entry| entry.icon)
        .unwrap_or(DEFAULT_ICON);

    Classification { label, icon }
}
