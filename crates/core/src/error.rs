use thiserror::Error;

/// Problems with a [`crate::config::FolioConfig`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid root margin {value:?}: {reason}")]
    InvalidMargin { value: String, reason: &'static str },
    #[error("threshold {0} is outside 0..=1")]
    ThresholdOutOfRange(f64),
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
}

/// Failures the page degrades around. None of these are fatal: the owning
/// controller or content section is skipped and the rest keeps running.
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("{controller}: required element {selector} not found")]
    MissingElement {
        controller: &'static str,
        selector: String,
    },
    #[error("content section {section}: missing {key}")]
    MissingData { section: &'static str, key: String },
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("content: {0}")]
    Content(#[from] serde_json::Error),
}

impl FolioError {
    pub fn missing_element(controller: &'static str, selector: impl Into<String>) -> Self {
        Self::MissingElement {
            controller,
            selector: selector.into(),
        }
    }

    pub fn missing_data(section: &'static str, key: impl Into<String>) -> Self {
        Self::MissingData {
            section,
            key: key.into(),
        }
    }
}
