//! Credential Pool Implementation
//!
//! An ordered, fixed-size list of credentials with a shared rotating cursor.
//! The cursor is process-wide: every request observes and advances the same
//! position, so concurrent failures interleave their rotations. Only the
//! per-request attempt bound is deterministic under concurrency.

use super::credential::ApiKeyCredential;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Errors raised by the credential pool
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Error: Gemini API keys not configured. Please set GEMINI_API_KEYS environment variable.")]
    NotConfigured,
}

// ============================================================================
// Credential Pool
// ============================================================================

/// A pool of interchangeable credentials with round-robin rotation
#[derive(Debug)]
pub struct CredentialPool {
    /// The credentials in configuration order
    credentials: Vec<ApiKeyCredential>,
    /// Index of the current credential, always `< credentials.len()` when non-empty
    cursor: AtomicUsize,
}

impl CredentialPool {
    /// Create a pool from already-built credentials, cursor at the first one
    pub fn new(credentials: Vec<ApiKeyCredential>) -> Self {
        Self {
            credentials,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Create a pool from raw key strings, naming them by position
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let credentials = keys
            .into_iter()
            .enumerate()
            .map(|(idx, key)| ApiKeyCredential::indexed(key, idx))
            .collect();
        Self::new(credentials)
    }

    /// Get the credential under the cursor
    pub fn current(&self) -> Result<&ApiKeyCredential, PoolError> {
        if self.credentials.is_empty() {
            return Err(PoolError::NotConfigured);
        }
        let idx = self.cursor.load(Ordering::SeqCst) % self.credentials.len();
        Ok(&self.credentials[idx])
    }

    /// Advance the cursor to the next credential, wrapping at the end
    ///
    /// Returns the new cursor position. A no-op on an empty pool.
    pub fn rotate(&self) -> usize {
        let len = self.credentials.len();
        if len == 0 {
            return 0;
        }
        let previous = self
            .cursor
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| Some((c + 1) % len))
            .unwrap_or_else(|c| c);
        let next = (previous + 1) % len;
        tracing::info!(key_index = next, "Rotating to next API key");
        next
    }

    /// Current cursor position
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    /// Get the number of credentials
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Check if the pool is empty
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Get pool statistics
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total: self.credentials.len(),
            cursor: self.cursor(),
        }
    }
}

// ============================================================================
// Pool Statistics
// ============================================================================

/// Snapshot of a credential pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PoolStats {
    /// Total number of credentials
    pub total: usize,
    /// Current cursor position
    pub cursor: usize,
}

impl PoolStats {
    /// A pool is usable once at least one credential is configured
    pub fn is_configured(&self) -> bool {
        self.total > 0
    }
}

// ============================================================================
// Tests
// ============================================================================
