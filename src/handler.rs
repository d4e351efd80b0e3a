/*!
 * Request handling entry point
 *
 * [`Browser`] is what a host server calls for every request. It either
 * produces a response or declines (`Ok(None)`), in which case the host lets
 * its next handler try.
 */

use tracing::debug;

use crate::actions::{
    require_form_content_type, BrowserAction, FormData, MkcolRequest, PutRequest, UploadedFile,
    ACTION_PARAM,
};
use crate::assets::AssetServer;
use crate::config::Config;
use crate::error::{BrowserError, Result};
use crate::hooks::{BrowserHooks, NoHooks};
use crate::index::{DirectoryIndexGenerator, CONTENT_SECURITY_POLICY};
use crate::tree::ResourceTree;
use crate::utils::encode_path;

/// HTTP method of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// Anything else
    Other(String),
}

/// A request as handed over by the host
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Path relative to the base URI
    pub path: String,
    /// Decoded query parameters
    pub query: FormData,
    /// Content-Type header, if any
    pub content_type: Option<String>,
    /// Decoded body fields
    pub form: FormData,
    /// Files received with a multipart body
    pub files: Vec<UploadedFile>,
    /// Full request URL, used as the redirect target after a post
    pub url: Option<String>,
}

impl Request {
    fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.trim_matches('/').to_string(),
            query: FormData::default(),
            content_type: None,
            form: FormData::default(),
            files: Vec::new(),
            url: None,
        }
    }

    /// A GET request for `path`
    pub fn get(path: &str) -> Self {
        Self::new(Method::Get, path)
    }

    /// A POST request for `path` with the given content type
    pub fn post(path: &str, content_type: &str) -> Self {
        let mut request = Self::new(Method::Post, path);
        request.content_type = Some(content_type.to_string());
        request
    }

    /// Set the query string (without the leading `?`)
    pub fn with_query(mut self, query: &str) -> Self {
        self.query = FormData::from_urlencoded(query.trim_start_matches('?').as_bytes());
        self
    }

    /// Set form fields from an urlencoded body
    pub fn with_urlencoded_body(mut self, body: &[u8]) -> Self {
        self.form = FormData::from_urlencoded(body);
        self
    }

    /// Add one decoded form field
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.form.push(name, value);
        self
    }

    /// Attach an uploaded file
    pub fn with_file(mut self, file: UploadedFile) -> Self {
        self.files.push(file);
        self
    }

    /// Set the original request URL
    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    fn query_action(&self) -> Option<BrowserAction> {
        self.query.get(ACTION_PARAM)?.parse().ok()
    }
}

/// A response for the host to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: u16,
    /// Headers in the order they were set
    pub headers: Vec<(String, String)>,
    /// Body bytes
    pub body: Vec<u8>,
}

impl Response {
    fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// First value of a header, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The browser plugin: index pages, assets and form actions for one tree
pub struct Browser<T, H = NoHooks> {
    /// Tree being browsed
    tree: T,
    /// Extension hooks
    hooks: H,
    /// Browser configuration
    config: Config,
    /// Bundled asset server
    assets: AssetServer,
}

impl<T: ResourceTree> Browser<T, NoHooks> {
    /// Create a browser without extension hooks
    pub fn new(tree: T, config: Config) -> Result<Self> {
        Self::with_hooks(tree, NoHooks, config)
    }
}

impl<T: ResourceTree, H: BrowserHooks> Browser<T, H> {
    /// Create a browser with extension hooks
    pub fn with_hooks(tree: T, hooks: H, config: Config) -> Result<Self> {
        let config = config.normalized();
        let assets = AssetServer::new(&config.asset_root)?;
        Ok(Self {
            tree,
            hooks,
            config,
            assets,
        })
    }

    /// Tree being browsed
    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle a request, or decline it with `Ok(None)`
    pub fn handle(&self, request: &Request) -> Result<Option<Response>> {
        match request.method {
            Method::Get => self.handle_get(request),
            Method::Post => self.handle_post(request),
            Method::Other(_) => Ok(None),
        }
    }

    /// Serve an asset or an index page
    ///
    /// Missing assets fail with `NotFound`; missing nodes and file-like
    /// nodes without `sabreAction=info` are declined.
    pub fn handle_get(&self, request: &Request) -> Result<Option<Response>> {
        let action = request.query_action();

        if action == Some(BrowserAction::Asset) {
            if let Some(name) = request.query.get("assetName") {
                return self.serve_asset(name).map(Some);
            }
        }

        let node = match self.tree.node(&request.path) {
            Ok(node) => node,
            Err(e) if e.is_not_found() => {
                debug!(path = %request.path, "no node, declining");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        // plain GETs of files are the host's business
        if !node.is_collection() && action != Some(BrowserAction::Info) {
            return Ok(None);
        }

        let html = self.generate_index(&request.path)?;
        Ok(Some(
            Response::new(200)
                .with_header("Content-Type", "text/html; charset=utf-8")
                .with_header("Content-Security-Policy", CONTENT_SECURITY_POLICY)
                .with_body(html.into_bytes()),
        ))
    }

    /// Generate the index page for a path
    pub fn generate_index(&self, path: &str) -> Result<String> {
        DirectoryIndexGenerator::new(&self.tree, &self.hooks, &self.config).generate(path)
    }

    /// Serve a bundled asset
    pub fn serve_asset(&self, name: &str) -> Result<Response> {
        let asset = self.assets.serve(name)?;
        Ok(Response::new(200)
            .with_header("Content-Type", asset.content_type)
            .with_header("Content-Length", asset.content_length.to_string())
            .with_header("Cache-Control", asset.cache_control)
            .with_body(asset.body))
    }

    /// Run a form action and redirect back
    ///
    /// Requests that are not form posts or carry no action are declined.
    /// Blank fields and vetoed actions still redirect, without changes.
    pub fn handle_post(&self, request: &Request) -> Result<Option<Response>> {
        if !self.config.enable_post {
            return Ok(None);
        }

        let content_type = request.content_type.as_deref().unwrap_or_default();
        if let Err(e) = require_form_content_type(content_type) {
            debug!(error = %e, "ignoring post");
            return Ok(None);
        }
        let Some(token) = request.form.get(ACTION_PARAM) else {
            return Ok(None);
        };

        match self.run_action(request, token) {
            Ok(()) => {}
            Err(BrowserError::ValidationSkip(reason)) => {
                debug!(path = %request.path, %reason, "action skipped");
            }
            Err(e) => return Err(e),
        }

        let location = match &request.url {
            Some(url) => url.clone(),
            None => format!("{}{}", self.config.base_uri, encode_path(&request.path)),
        };
        Ok(Some(Response::new(302).with_header("Location", location)))
    }

    fn run_action(&self, request: &Request, token: &str) -> Result<()> {
        if !self.hooks.before_action(&request.path, token, &request.form) {
            debug!(path = %request.path, action = token, "action vetoed by hook");
            return Ok(());
        }

        match token.parse::<BrowserAction>() {
            Ok(BrowserAction::Mkcol) => {
                MkcolRequest::from_form(&request.path, &request.form)?.execute(&self.tree)
            }
            Ok(BrowserAction::Put) => {
                PutRequest::from_form(&request.path, &request.form, &request.files)?
                    .execute(&self.tree)
            }
            _ => Ok(()),
        }
    }
}
