/*!
 * Extension points other plugins can use to take part in browsing
 */

use crate::actions::FormData;
use crate::types::NodeInfo;

/// Callbacks invoked while rendering pages and handling form posts
pub trait BrowserHooks {
    /// HTML to append to the actions panel of a collection page
    fn actions_panel(&self, _node: &NodeInfo) -> Option<String> {
        None
    }

    /// Called before a form action runs; returning `false` cancels it
    fn before_action(&self, _path: &str, _action: &str, _form: &FormData) -> bool {
        true
    }
}

/// Hooks that contribute nothing and approve everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl BrowserHooks for NoHooks {}

/// Several hooks invoked in registration order
#[derive(Default)]
pub struct HookChain {
    hooks: Vec<Box<dyn BrowserHooks>>,
}

impl HookChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook at the end of the chain
    pub fn push(&mut self, hook: impl BrowserHooks + 'static) -> &mut Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Number of registered hooks
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hooks are registered
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl BrowserHooks for HookChain {
    fn actions_panel(&self, node: &NodeInfo) -> Option<String> {
        let fragments: Vec<String> = self
            .hooks
            .iter()
            .filter_map(|hook| hook.actions_panel(node))
            .collect();
        if fragments.is_empty() {
            None
        } else {
            Some(fragments.concat())
        }
    }

    // the first veto wins; later hooks are not consulted
    fn before_action(&self, path: &str, action: &str, form: &FormData) -> bool {
        self.hooks
            .iter()
            .all(|hook| hook.before_action(path, action, form))
    }
}

impl<H: BrowserHooks + ?Sized> BrowserHooks for &H {
    fn actions_panel(&self, node: &NodeInfo) -> Option<String> {
        (**self).actions_panel(node)
    }

    fn before_action(&self, path: &str, action: &str, form: &FormData) -> bool {
        (**self).before_action(path, action, form)
    }
}
