/*!
 * davbrowse - Browsable HTML front end for WebDAV-style resource trees
 *
 * This library renders collection listings and property tables as HTML,
 * serves the bundled stylesheets and icons those pages use, and handles the
 * create-folder and upload forms they offer.
 */

pub mod actions;
pub mod assets;
pub mod classifier;
pub mod config;
pub mod error;
pub mod handler;
pub mod hooks;
pub mod index;
pub mod path_guard;
pub mod property;
pub mod tree;
pub mod types;
pub mod utils;


// Re-export main components for easier access
pub use actions::{BrowserAction, FormData, UploadedFile};
pub use assets::{Asset, AssetServer};
pub use classifier::{classify, Classification};
pub use config::{Config, NamespaceMap};
pub use error::{BrowserError, Result};
pub use handler::{Browser, Method, Request, Response};
pub use hooks::{BrowserHooks, HookChain, NoHooks};
pub use index::DirectoryIndexGenerator;
pub use path_guard::PathGuard;
pub use property::PropertyRowRenderer;
pub use tree::{FsTree, ResourceTree};
pub use types::{
    ChildEntry, ComplexValue, NodeInfo, NodeKind, PropertySet, PropertyValue, QName,
    ResourceTypeSet,
};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
