/*!
 * HTML directory index generation
 */

use std::fmt::Write as _;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::classifier::classify;
use crate::config::Config;
use crate::error::Result;
use crate::hooks::BrowserHooks;
use crate::property::PropertyRowRenderer;
use crate::tree::ResourceTree;
use crate::types::{ChildEntry, ComplexValue, NodeInfo, PropertyValue, QName};
use crate::utils::{encode_path, escape_html, format_long_date, split_path};

/// Content-Security-Policy sent with every index page
pub const CONTENT_SECURITY_POLICY: &str =
    "default-src 'none'; img-src 'self'; style-src 'self' 'unsafe-inline'; font-src 'self';";

/// Properties fetched for each child in the listing
pub static CHILD_PROPERTIES: Lazy<Vec<QName>> = Lazy::new(|| {
    vec![
        QName::dav("displayname"),
        QName::dav("resourcetype"),
        QName::dav("getcontenttype"),
        QName::dav("getcontentlength"),
        QName::dav("getlastmodified"),
    ]
});

/// Forms the browser itself contributes to a collection's actions panel
const BUILTIN_ACTIONS: &str = r#"<form method="post" action="">
<h3>Create new folder</h3>
<input type="hidden" name="sabreAction" value="mkcol" />
<label>Name:</label> <input type="text" name="name" /><br />
<input type="submit" value="create" />
</form>
<form method="post" action="" enctype="multipart/form-data">
<h3>Upload file</h3>
<input type="hidden" name="sabreAction" value="put" />
<label>Name (optional):</label> <input type="text" name="name" /><br />
<label>File:</label> <input type="file" name="file" /><br />
<input type="submit" value="upload" />
</form>
"#;

/// Builds the HTML page for one node of the tree
pub struct DirectoryIndexGenerator<'a, T: ?Sized, H: ?Sized> {
    /// Tree the page describes
    tree: &'a T,
    /// Contributors to the actions panel
    hooks: &'a H,
    /// Browser configuration
    config: &'a Config,
}

impl<'a, T, H> DirectoryIndexGenerator<'a, T, H>
where
    T: ResourceTree + ?Sized,
    H: BrowserHooks + ?Sized,
{
    /// Create a generator
    pub fn new(tree: &'a T, hooks: &'a H, config: &'a Config) -> Self {
        Self {
            tree,
            hooks,
            config,
        }
    }

    /// URL of a bundled asset, routed through the browser itself
    pub fn asset_url(&self, name: &str) -> String {
        format!(
            "{}?sabreAction=asset&assetName={}",
            self.config.base_uri,
            urlencoding::encode(name)
        )
    }

    /// Generate the page for `path`
    ///
    /// The node must exist; callers decline the request on `NotFound`
    /// before anything is rendered.
    pub fn generate(&self, path: &str) -> Result<String> {
        let path = path.trim_matches('/');
        let node = self.tree.node(path)?;

        let mut html = String::new();
        self.write_header(&mut html, path);
        self.write_nav(&mut html, path);

        let mut child_count = 0;
        if node.is_collection() {
            let children = self.tree.children(path, &CHILD_PROPERTIES)?;
            child_count = children.len();
            self.write_children(&mut html, &children);
        }

        let properties = self.tree.properties(path)?;
        let renderer = PropertyRowRenderer::new(&self.config.base_uri, &self.config.namespaces);
        html.push_str("<section><h1>Properties</h1>\n<table class=\"propTable\">\n");
        for (name, value) in properties.iter() {
            html.push_str(&renderer.render(name, value));
        }
        html.push_str("</table>\n</section>\n");

        let actions = self.actions_panel(&node);
        if !actions.is_empty() {
            html.push_str("<section><h1>Actions</h1>\n<div class=\"actions\">\n");
            html.push_str(&actions);
            html.push_str("</div>\n</section>\n");
        }

        self.write_footer(&mut html);

        debug!(
            path,
            children = child_count,
            properties = properties.len(),
            "generated directory index"
        );
        Ok(html)
    }

    /// Combined actions panel; empty when posting is disabled
    fn actions_panel(&self, node: &NodeInfo) -> String {
        if !self.config.enable_post {
            return String::new();
        }
        let mut output = String::new();
        if node.is_collection() {
            output.push_str(BUILTIN_ACTIONS);
        }
        if let Some(fragment) = self.hooks.actions_panel(node) {
            output.push_str(&fragment);
        }
        output
    }

    fn product(&self) -> String {
        if self.config.expose_version {
            format!("davbrowse {}", crate::VERSION)
        } else {
            "davbrowse".to_string()
        }
    }

    fn write_header(&self, html: &mut String, path: &str) {
        let display_path = escape_html(&format!("/{}", path));
        let _ = write!(
            html,
            r#"<!DOCTYPE html>
<html>
<head>
<title>Index for {path} - {product}</title>
<meta charset="utf-8" />
<link rel="stylesheet" href="{css}" type="text/css" />
<link rel="stylesheet" href="{icons}" type="text/css" />
<link rel="shortcut icon" href="{favicon}" type="image/vnd.microsoft.icon" />
</head>
<body>
<header>
<div class="logo">
<a href="{base}"><img src="{logo}" alt="davbrowse" /> {path}</a>
</div>
</header>
"#,
            path = display_path,
            product = escape_html(&self.product()),
            css = escape_html(&self.asset_url("sabredav.css")),
            icons = escape_html(&self.asset_url("openiconic/open-iconic.css")),
            favicon = escape_html(&self.asset_url("favicon.ico")),
            base = escape_html(&self.config.base_uri),
            logo = escape_html(&self.asset_url("sabredav.png")),
        );
    }

    fn write_nav(&self, html: &mut String, path: &str) {
        html.push_str("<nav>\n");
        if path.is_empty() {
            html.push_str("<span class=\"btn disabled\">⇤ Go to parent</span>\n");
        } else {
            let (parent, _) = split_path(path);
            let href = format!("{}{}", self.config.base_uri, encode_path(parent));
            let _ = writeln!(
                html,
                "<a href=\"{}\" class=\"btn\">⇤ Go to parent</a>",
                escape_html(&href)
            );
        }
        html.push_str("</nav>\n");
    }

    fn write_children(&self, html: &mut String, children: &[ChildEntry]) {
        html.push_str("<section><h1>Nodes</h1>\n<table class=\"nodeTable\">\n");

        for child in children {
            let props = &child.properties;
            let (_, name) = split_path(&child.node.path);
            let display_name = props
                .get(&QName::dav("displayname"))
                .and_then(PropertyValue::as_text)
                .unwrap_or(name);

            let classification = classify(&props.resource_types(), child.node.is_file());
            let mut type_label = classification.label;
            if let Some(content_type) = props
                .get(&QName::dav("getcontenttype"))
                .and_then(PropertyValue::as_text)
            {
                let _ = write!(type_label, " ({})", content_type);
            }

            let size = props
                .get(&QName::dav("getcontentlength"))
                .and_then(PropertyValue::as_text)
                .map(|length| format!("{} bytes", escape_html(length)))
                .unwrap_or_default();

            let last_modified = match props.get(&QName::dav("getlastmodified")) {
                Some(PropertyValue::Complex(ComplexValue::LastModified(time))) => {
                    format_long_date(time)
                }
                _ => String::new(),
            };

            let href = format!("{}{}", self.config.base_uri, encode_path(&child.node.path));
            let _ = write!(
                html,
                "<tr>\n<td class=\"nameColumn\"><a href=\"{href}\"><span class=\"oi\" data-glyph=\"{icon}\"></span> {name}</a></td>\n\
                 <td class=\"typeColumn\">{label}</td>\n\
                 <td class=\"sizeColumn\">{size}</td>\n\
                 <td class=\"lastModifiedColumn\">{modified}</td>\n</tr>\n",
                href = escape_html(&href),
                icon = classification.icon,
                name = escape_html(display_name),
                label = escape_html(&type_label),
                size = size,
                modified = escape_html(&last_modified),
            );
        }

        html.push_str("</table>\n</section>\n");
    }

    fn write_footer(&self, html: &mut String) {
        let _ = write!(
            html,
            "<footer>Generated by {}</footer>\n</body>\n</html>\n",
            escape_html(&self.product())
        );
    }
}

