//! Pure core of the folio portfolio page.
//!
//! Nothing here touches a DOM. Controllers consume [`app::PageEvent`]s and
//! layout snapshots and return [`folio_protocol::DomCommand`] and
//! [`folio_protocol::RenderCommand`] lists for a host to apply.

pub mod activation;
pub mod animator;
pub mod app;
pub mod chrome;
pub mod config;
pub mod content;
pub mod counter;
pub mod debounce;
pub mod error;
pub mod fade_in;
pub mod pipeline_steps;
pub mod scheduler;
pub mod timeline;
pub mod tooltip;
pub mod tracker;
pub mod typing;

pub use app::{Controller, Effects, LayoutSnapshot, PageEvent, PageInventory, Portfolio, ScrollTo};
pub use config::FolioConfig;
pub use error::{ConfigError, FolioError};
