//! Session Sources
//!
//! A session is a text resource fetched by name. Where it lives (a local
//! directory, a web endpoint, memory) is up to the source.

mod directory;
mod http;
mod memory;

pub use directory::DirectorySource;
pub use http::HttpSource;
pub use memory::MemorySource;

use std::future::Future;

use crate::error::FetchError;

/// Anything that can return the raw text of a session by name
pub trait SessionSource {
    /// Fetch the full session text, header lines included
    fn fetch(&self, name: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Reject names that could escape the source's namespace
pub(crate) fn validate_name(name: &str) -> Result<(), FetchError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(|c: char| c == '/' || c == '\\')
        || trimmed.contains('\0')
    {
        return Err(FetchError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("session_2024-05-01.csv").is_ok());
        assert!(validate_name("..").is_err());
        assert!(validate_name("../etc/passwd").is_err());
        assert!(validate_name("a\\b.csv").is_err());
        assert!(validate_name("   ").is_err());
    }
}
