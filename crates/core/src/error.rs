//! Domain errors surfaced to the UI.

use thiserror::Error;

/// The one failure the storefront knows about: the catalog load failed.
///
/// The message is shown to the user verbatim, so both variants carry
/// the underlying description rather than a structured code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The HTTP request itself failed (connect, DNS, non-success status).
    #[error("{0}")]
    Http(String),
    /// The response body could not be decoded as a catalog payload.
    #[error("{0}")]
    Decode(String),
}

impl CatalogError {
    /// Human-readable message, identical to the `Display` output.
    pub fn message(&self) -> &str {
        match self {
            CatalogError::Http(msg) | CatalogError::Decode(msg) => msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_message_verbatim() {
        let err = CatalogError::Http("Network Error".to_string());
        assert_eq!(err.to_string(), "Network Error");
        assert_eq!(err.message(), "Network Error");
    }
}
