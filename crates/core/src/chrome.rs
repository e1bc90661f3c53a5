//! Scroll-linked page chrome: the auto-hiding navbar, the progress bar and
//! smooth-scroll targets.

use folio_protocol::{DomCommand, ElementId};

#[derive(Debug, Clone)]
pub struct ScrollChrome {
    navbar: Option<ElementId>,
    progress: Option<ElementId>,
    hide_after: f64,
    header_offset: f64,
    last_scroll_y: f64,
    navbar_hidden: bool,
}

impl ScrollChrome {
    pub fn new(
        navbar: Option<ElementId>,
        progress: Option<ElementId>,
        hide_after: f64,
        header_offset: f64,
    ) -> Self {
        Self {
            navbar,
            progress,
            hide_after,
            header_offset,
            last_scroll_y: 0.0,
            navbar_hidden: false,
        }
    }

    pub fn navbar_hidden(&self) -> bool {
        self.navbar_hidden
    }

    /// React to a raw scroll position. Runs on every scroll event; it only
    /// emits commands when the navbar flips.
    pub fn on_scroll(&mut self, scroll_y: f64) -> Vec<DomCommand> {
        let previous = std::mem::replace(&mut self.last_scroll_y, scroll_y);
        let Some(navbar) = &self.navbar else {
            return Vec::new();
        };
        if scroll_y <= self.hide_after {
            return Vec::new();
        }
        let hide = scroll_y > previous;
        if hide == self.navbar_hidden {
            return Vec::new();
        }
        self.navbar_hidden = hide;
        if hide {
            vec![DomCommand::add_class(navbar, "hidden")]
        } else {
            vec![DomCommand::remove_class(navbar, "hidden")]
        }
    }

    /// Width of the progress indicator for the current scroll depth.
    pub fn progress(&self, scroll_y: f64, document_height: f64, viewport_height: f64) -> Option<DomCommand> {
        let bar = self.progress.as_ref()?;
        let scrollable = document_height - viewport_height;
        let fraction = if scrollable > 0.0 {
            (scroll_y / scrollable).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Some(DomCommand::set_style(bar, "width", format!("{:.1}%", fraction * 100.0)))
    }

    /// Page offset to scroll to so `section_top` lands just below the
    /// sticky header.
    pub fn scroll_target(&self, section_top: f64) -> f64 {
        (section_top - self.header_offset).max(0.0)
    }
}
