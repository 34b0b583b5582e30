//! Credential types
//!
//! A credential is an opaque API key plus a stable display name. The key
//! itself never appears in `Debug` output or logs; the name is used instead.

use std::fmt;

// ============================================================================
// API Key Credential
// ============================================================================

/// An API key used for outbound generation calls
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKeyCredential {
    /// Credential name for identification in logs (e.g. `gemini_key_2`)
    name: String,
    /// The API key
    api_key: String,
}

impl ApiKeyCredential {
    /// Create a new API key credential
    pub fn new(api_key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_key: api_key.into(),
        }
    }

    /// Build the credential for the key at `index` (0-based) in the configured list
    pub fn indexed(api_key: impl Into<String>, index: usize) -> Self {
        Self::new(api_key, format!("gemini_key_{}", index + 1))
    }

    /// Get the credential name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for ApiKeyCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyCredential")
            .field("name", &self.name)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
