use std::cell::Cell;
use std::fmt;

use tracing::info;
use url::Url;

/// The context hosting a multiplexer.
///
/// A page supplies the location the endpoint is derived from and performs
/// the reload the server can request.
pub trait Page {
    /// Where the page was loaded from.
    fn location(&self) -> &Url;

    /// Discard page state and reload from the current location.
    fn reload(&self);
}

/// A page with a fixed location and an optional reload hook.
///
/// Reloads are counted and logged; the hook, if any, does the actual work.
pub struct StaticPage {
    location: Url,
    reloads: Cell<usize>,
    on_reload: Option<Box<dyn Fn(&Url)>>,
}

impl StaticPage {
    pub fn new(location: Url) -> Self {
        Self {
            location,
            reloads: Cell::new(0),
            on_reload: None,
        }
    }

    /// Run `hook` on every reload request.
    pub fn with_reload_hook(mut self, hook: impl Fn(&Url) + 'static) -> Self {
        self.on_reload = Some(Box::new(hook));
        self
    }

    /// Number of reloads requested so far.
    pub fn reload_count(&self) -> usize {
        self.reloads.get()
    }
}

impl Page for StaticPage {
    fn location(&self) -> &Url {
        &self.location
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
        info!(location = %self.location, "page reload requested");
        if let Some(hook) = &self.on_reload {
            hook(&self.location);
        }
    }
}

impl<P: Page + ?Sized> Page for std::rc::Rc<P> {
    fn location(&self) -> &Url {
        (**self).location()
    }

    fn reload(&self) {
        (**self).reload()
    }
}

impl fmt::Debug for StaticPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticPage")
            .field("location", &self.location.as_str())
            .field("reloads", &self.reloads.get())
            .field("on_reload", &self.on_reload.is_some())
            .finish()
    }
}
