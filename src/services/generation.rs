//! Generation request handling
//!
//! Runs a prompt against the credential pool with flat round-robin failover:
//! one attempt per configured key at most, starting from wherever the shared
//! cursor currently sits, rotating after every failure. The first successful
//! answer is sanitized and returned; no further keys are tried.
//!
//! Failures are not classified for retry purposes. Authentication, quota,
//! network and parse errors all rotate the same way, without backoff.

use crate::services::backend_pool::{ApiKeyCredential, CredentialPool, PoolError};
use crate::services::sanitizer::SanitizerMode;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// External Call Contract
// ============================================================================

/// Why an external generation call failed
///
/// The retry loop treats every reason the same; the code is kept for logs
/// and for a future backoff policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Key rejected (invalid, revoked, wrong project)
    Authentication,
    /// Quota or rate limit exhausted
    Quota,
    /// Connection, TLS or timeout failure
    Network,
    /// Response body could not be interpreted
    MalformedResponse,
    /// Any other non-success answer from the service
    Upstream,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Quota => "quota",
            Self::Network => "network",
            Self::MalformedResponse => "malformed_response",
            Self::Upstream => "upstream",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call to the generative-text service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ExternalCallError {
    pub reason: FailureReason,
    pub message: String,
}

impl ExternalCallError {
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

/// The outbound generation call
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate raw (unsanitized) text for `prompt` using `credential`
    async fn generate(
        &self,
        credential: &ApiKeyCredential,
        prompt: &str,
    ) -> Result<String, ExternalCallError>;
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors returned by [`GenerationService::generate`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// No credentials configured; no call was made
    #[error(transparent)]
    Configuration(#[from] PoolError),

    /// Every credential was tried once and failed
    #[error("{last_error}")]
    Exhausted {
        attempts: usize,
        last_error: ExternalCallError,
    },
}

// ============================================================================
// Generation Service
// ============================================================================

/// Prompt-to-plain-text generation over a rotating credential pool
pub struct GenerationService {
    pool: Arc<CredentialPool>,
    backend: Arc<dyn GenerationBackend>,
    mode: SanitizerMode,
}

impl GenerationService {
    pub fn new(
        pool: Arc<CredentialPool>,
        backend: Arc<dyn GenerationBackend>,
        mode: SanitizerMode,
    ) -> Self {
        Self {
            pool,
            backend,
            mode,
        }
    }

    /// Generate sanitized text for `prompt`
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let max_attempts = self.pool.len();
        if max_attempts == 0 {
            return Err(PoolError::NotConfigured.into());
        }

        let mut attempts = 0;
        loop {
            let credential = self.pool.current()?;

            tracing::debug!(
                credential = %credential.name(),
                attempt = attempts + 1,
                max_attempts,
                "Calling generation backend"
            );

            match self.backend.generate(credential, prompt).await {
                Ok(raw) => {
                    tracing::debug!(
                        credential = %credential.name(),
                        raw_len = raw.len(),
                        "Generation succeeded"
                    );
                    return Ok(self.mode.apply(&raw));
                }
                Err(err) => {
                    attempts += 1;
                    tracing::warn!(
                        credential = %credential.name(),
                        attempt = attempts,
                        max_attempts,
                        reason = %err.reason,
                        error = %err.message,
                        "Generation attempt failed"
                    );

                    if attempts >= max_attempts {
                        return Err(GenerationError::Exhausted {
                            attempts,
                            last_error: err,
                        });
                    }
                    self.pool.rotate();
                }
            }
        }
    }

    /// The shared credential pool
    pub fn pool(&self) -> &Arc<CredentialPool> {
        &self.pool
    }

    /// Sanitizer applied to successful answers
    pub fn mode(&self) -> SanitizerMode {
        self.mode
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Fails for listed keys, answers with markdown otherwise; records every call
    struct ScriptedBackend {
        failing: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn failing(keys: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                failing: keys.iter().map(|k| k.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        async fn generate(
            &self,
            credential: &ApiKeyCredential,
            prompt: &str,
        ) -> Result<String, ExternalCallError> {
            self.calls
                .lock()
                .unwrap()
                .push(credential.api_key().to_string());
            if self.failing.contains(credential.api_key()) {
                return Err(ExternalCallError::new(
                    FailureReason::Quota,
                    format!("quota exceeded for {}", credential.api_key()),
                ));
            }
            Ok(format!("**{}** answered by {}", prompt, credential.api_key()))
        }
    }

    fn service(keys: &[&str], backend: Arc<ScriptedBackend>) -> GenerationService {
        let pool = Arc::new(CredentialPool::from_keys(keys.iter().copied()));
        GenerationService::new(pool, backend, SanitizerMode::Full)
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let backend = ScriptedBackend::failing(&[]);
        let svc = service(&["k1", "k2", "k3"], backend.clone());

        let text = svc.generate("Hi").await.unwrap();

        assert_eq!(text, "Hi answered by k1");
        assert_eq!(backend.calls(), vec!["k1"]);
        assert_eq!(svc.pool().cursor(), 0);
    }

    #[tokio::test]
    async fn test_kth_attempt_success_rotates_k_minus_one_times() {
        let backend = ScriptedBackend::failing(&["k1", "k2"]);
        let svc = service(&["k1", "k2", "k3"], backend.clone());

        let text = svc.generate("Hi").await.unwrap();

        assert_eq!(text, "Hi answered by k3");
        assert_eq!(backend.calls(), vec!["k1", "k2", "k3"]);
        assert_eq!(svc.pool().cursor(), 2);
    }

    #[tokio::test]
    async fn test_all_fail_after_exactly_n_attempts() {
        let backend = ScriptedBackend::failing(&["k1", "k2", "k3"]);
        let svc = service(&["k1", "k2", "k3"], backend.clone());

        let err = svc.generate("Hi").await.unwrap_err();

        assert_eq!(backend.calls().len(), 3);
        match &err {
            GenerationError::Exhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(*attempts, 3);
                assert_eq!(last_error.reason, FailureReason::Quota);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.to_string(), "quota exceeded for k3");
        // Rotated after the first two failures only
        assert_eq!(svc.pool().cursor(), 2);
    }

    #[tokio::test]
    async fn test_empty_pool_makes_no_calls() {
        let backend = ScriptedBackend::failing(&[]);
        let svc = service(&[], backend.clone());

        let err = svc.generate("Hi").await.unwrap_err();

        assert_eq!(err, GenerationError::Configuration(PoolError::NotConfigured));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cursor_persists_across_requests() {
        let backend = ScriptedBackend::failing(&["k1"]);
        let svc = service(&["k1", "k2", "k3"], backend.clone());

        svc.generate("first").await.unwrap();
        let second = svc.generate("second").await.unwrap();

        assert_eq!(second, "second answered by k2");
        assert_eq!(backend.calls(), vec!["k1", "k2", "k2"]);
    }

    #[tokio::test]
    async fn test_attempts_start_from_current_cursor_and_wrap() {
        let backend = ScriptedBackend::failing(&["k3", "k1"]);
        let svc = service(&["k1", "k2", "k3"], backend.clone());
        svc.pool().rotate();
        svc.pool().rotate();

        let text = svc.generate("Hi").await.unwrap();

        assert_eq!(text, "Hi answered by k2");
        assert_eq!(backend.calls(), vec!["k3", "k1", "k2"]);
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_each_bounded() {
        let backend = ScriptedBackend::failing(&["k1", "k2", "k3"]);
        let svc = Arc::new(service(&["k1", "k2", "k3"], backend.clone()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move { svc.generate(&format!("prompt {}", i)).await })
            })
            .collect();

        for handle in handles {
            let result = handle.await.unwrap();
            assert!(matches!(
                result,
                Err(GenerationError::Exhausted { attempts: 3, .. })
            ));
        }
        assert_eq!(backend.calls().len(), 8 * 3);
        assert!(svc.pool().cursor() < 3);
    }

    #[tokio::test]
    async fn test_minimal_mode_is_applied() {
        let backend = ScriptedBackend::failing(&[]);
        let pool = Arc::new(CredentialPool::from_keys(["k1"]));
        let svc = GenerationService::new(pool, backend, SanitizerMode::Minimal);

        let text = svc.generate("- item").await.unwrap();

        assert_eq!(text, "- item answered by k1");
        assert_eq!(svc.mode(), SanitizerMode::Minimal);
    }
}
