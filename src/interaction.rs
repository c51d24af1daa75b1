//! Tile activation.
//!
//! A caller-supplied click handler always wins. Without one, an item carrying
//! a `link_target` is handed to the injected [`LinkOpener`]. Anything else is
//! ignored. The dispatcher has no other side effects.

use crate::types::GalleryItem;

/// Callback invoked with the activated item.
pub type ClickHandler = Box<dyn FnMut(&GalleryItem)>;

/// Opens a URL in a new browsing context (tab, window, external browser).
pub trait LinkOpener {
    fn open_new_context(&mut self, url: &str);
}

/// Opener that only logs. Used when the host has no browser to hand off to.
#[derive(Debug, Default)]
pub struct LogOpener;

impl LinkOpener for LogOpener {
    fn open_new_context(&mut self, url: &str) {
        tracing::info!(url, "open link in new context");
    }
}

/// What an activation did, plus the item's position for a lightbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub item_id: String,
    /// Position in the current item list.
    pub index: usize,
    /// Length of the current item list.
    pub count: usize,
    pub outcome: ActivationOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    Handler,
    OpenedLink(String),
    Ignored,
}

pub struct Dispatcher {
    on_item_click: Option<ClickHandler>,
    opener: Box<dyn LinkOpener>,
}

impl Dispatcher {
    pub fn new(on_item_click: Option<ClickHandler>, opener: Box<dyn LinkOpener>) -> Self {
        Self {
            on_item_click,
            opener,
        }
    }

    pub fn set_click_handler(&mut self, handler: Option<ClickHandler>) {
        self.on_item_click = handler;
    }

    pub fn activate(&mut self, item: &GalleryItem) -> ActivationOutcome {
        if let Some(handler) = self.on_item_click.as_mut() {
            handler(item);
            return ActivationOutcome::Handler;
        }
        match &item.link_target {
            Some(url) => {
                self.opener.open_new_context(url);
                ActivationOutcome::OpenedLink(url.clone())
            }
            None => ActivationOutcome::Ignored,
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(None, Box::new(LogOpener))
    }
}
