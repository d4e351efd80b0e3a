/*!
 * Rendering of property values as table rows
 */

use crate::config::NamespaceMap;
use crate::types::{PropertyValue, QName};
use crate::utils::{escape_html, is_absolute_href};

/// Renders one `<tr>` per property for the property table
#[derive(Debug, Clone, Copy)]
pub struct PropertyRowRenderer<'a> {
    /// Base URI prepended to relative link targets
    base_uri: &'a str,
    /// Prefixes for displaying qualified names
    namespaces: &'a NamespaceMap,
}

impl<'a> PropertyRowRenderer<'a> {
    /// Create a renderer
    pub fn new(base_uri: &'a str, namespaces: &'a NamespaceMap) -> Self {
        Self {
            base_uri,
            namespaces,
        }
    }

    /// Render a full table row for one property
    pub fn render(&self, name: &QName, value: &PropertyValue) -> String {
        format!(
            "<tr>\n<th>{}</th>\n<td>{}</td>\n</tr>\n",
            self.qualified_name(name),
            self.render_value(value)
        )
    }

    /// Short display form of a name with the Clark form as its tooltip
    pub fn qualified_name(&self, name: &QName) -> String {
        format!(
            "<span title=\"{}\">{}</span>",
            escape_html(&name.clark()),
            escape_html(&self.namespaces.display(name))
        )
    }

    /// Render the value cell contents
    pub fn render_value(&self, value: &PropertyValue) -> String {
        match value {
            PropertyValue::Text(text) => escape_html(text),
            PropertyValue::Href(href) => {
                let url = format!("{}{}", self.base_uri, href);
                anchor(&url, &url)
            }
            PropertyValue::HrefList(hrefs) => hrefs
                .iter()
                .map(|href| {
                    let url = if is_absolute_href(href) {
                        href.clone()
                    } else {
                        format!("{}{}", self.base_uri, href)
                    };
                    anchor(&url, &url)
                })
                .collect::<Vec<_>>()
                .join("<br />"),
            PropertyValue::QNameList(names) => names
                .iter()
                .map(|name| self.qualified_name(name))
                .collect::<Vec<_>>()
                .join(", "),
            PropertyValue::ValueList(values) => values
                .iter()
                .map(|v| escape_html(v))
                .collect::<Vec<_>>()
                .join(", "),
            PropertyValue::Complex(complex) => {
                format!("<em title=\"{}\">complex</em>", escape_html(complex.kind()))
            }
            PropertyValue::Unknown => "<em>unknown</em>".to_string(),
        }
    }
}

/// An anchor with escaped target and label
pub fn anchor(href: &str, label: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape_html(href), escape_html(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ComplexValue;

    const MARKUP: &str = r#"<script>alert("x" & 'y')</script>"#;

    fn renderer(namespaces: &NamespaceMap) -> PropertyRowRenderer<'_> {
        PropertyRowRenderer::new("/dav/", namespaces)
    }

    fn assert_no_raw_markup(html: &str) {
        assert!(!html.contains("<script"), "unescaped markup in {}", html);
        assert!(!html.contains("'y'"), "unescaped quote in {}", html);
        assert!(!html.contains("\"x\""), "unescaped quote in {}", html);
        assert!(!html.contains(" & "), "unescaped ampersand in {}", html);
    }

    #[test]
    fn test_text_value() {
        let ns = NamespaceMap::default();
        assert_eq!(
            renderer(&ns).render_value(&PropertyValue::Text("a < b".into())),
            "a &lt; b"
        );
    }

    #[test]
    fn test_single_href_uses_base_uri() {
        let ns = NamespaceMap::default();
        let html = renderer(&ns).render_value(&PropertyValue::Href("principals/admin".into()));
        assert_eq!(
            html,
            "<a href=\"/dav/principals/admin\">/dav/principals/admin</a>"
        );
    }

    #[test]
    fn test_href_list() {
        let ns = NamespaceMap::default();
        let html = renderer(&ns).render_value(&PropertyValue::HrefList(vec![
            "MAILTO:admin@example.org".into(),
            "/absolute/path".into(),
            "relative/path".into(),
        ]));
        assert_eq!(
            html,
            "<a href=\"MAILTO:admin@example.org\">MAILTO:admin@example.org</a><br />\
             <a href=\"/absolute/path\">/absolute/path</a><br />\
             <a href=\"/dav/relative/path\">/dav/relative/path</a>"
        );
    }

    #[test]
    fn test_qname_list_keeps_full_name() {
        let ns = NamespaceMap::default();
        let names = vec![
            QName::dav("collection"),
            QName::new("urn:ietf:params:xml:ns:caldav", "calendar"),
            QName::new("urn:example", "unmapped"),
        ];
        let html = renderer(&ns).render_value(&PropertyValue::QNameList(names.clone()));

        assert_eq!(
            html,
            "<span title=\"{DAV:}collection\">d:collection</span>, \
             <span title=\"{urn:ietf:params:xml:ns:caldav}calendar\">cal:calendar</span>, \
             <span title=\"{urn:example}unmapped\">{urn:example}unmapped</span>"
        );

        // every original name is recoverable from its tooltip
        let recovered: Vec<QName> = html
            .split("title=\"")
            .skip(1)
            .map(|rest| rest.split('"').next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(recovered, names);
    }

    #[test]
    fn test_value_list() {
        let ns = NamespaceMap::default();
        let html = renderer(&ns).render_value(&PropertyValue::ValueList(vec![
            "VEVENT".into(),
            "VTODO & more".into(),
        ]));
        assert_eq!(html, "VEVENT, VTODO &amp; more");
    }

    #[test]
    fn test_complex_and_unknown() {
        let ns = NamespaceMap::default();
        let r = renderer(&ns);
        assert_eq!(
            r.render_value(&PropertyValue::Complex(ComplexValue::Other(
                "SupportedPrivilegeSet".into()
            ))),
            "<em title=\"SupportedPrivilegeSet\">complex</em>"
        );
        assert_eq!(r.render_value(&PropertyValue::Unknown), "<em>unknown</em>");
    }

    #[test]
    fn test_row_header() {
        let ns = NamespaceMap::default();
        let row = renderer(&ns).render(&QName::dav("displayname"), &"Home".into());
        assert_eq!(
            row,
            "<tr>\n<th><span title=\"{DAV:}displayname\">d:displayname</span></th>\n<td>Home</td>\n</tr>\n"
        );
    }

    #[test]
    fn test_every_branch_escapes() {
        let mut ns = NamespaceMap::empty();
        ns.insert("urn:x", MARKUP);
        let r = renderer(&ns);
        let name = QName::new("urn:x", MARKUP);

        let values = vec![
            PropertyValue::Text(MARKUP.into()),
            PropertyValue::Href(MARKUP.into()),
            PropertyValue::HrefList(vec![MARKUP.into(), format!("/{}", MARKUP)]),
            PropertyValue::QNameList(vec![name.clone()]),
            PropertyValue::ValueList(vec![MARKUP.into()]),
            PropertyValue::Complex(ComplexValue::Other(MARKUP.into())),
            PropertyValue::Unknown,
        ];

        for value in &values {
            let row = r.render(&name, value);
            assert_no_raw_markup(&row);
        }
    }
}
