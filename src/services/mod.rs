//! Services module
//!
//! Contains business logic and external service integrations.

pub mod backend_pool;
pub mod extraction;
pub mod gemini;
pub mod generation;
pub mod prompts;
pub mod sanitizer;

pub use backend_pool::{ApiKeyCredential, CredentialPool, PoolError, PoolStats};
pub use extraction::{DocumentExtractor, DocumentKind, ExtractionError, ExtractionService};
pub use gemini::{GeminiClient, GeminiConfig};
pub use generation::{
    ExternalCallError, FailureReason, GenerationBackend, GenerationError, GenerationService,
};
pub use prompts::{build_prompt, StudyAction};
pub use sanitizer::{sanitize, SanitizerMode};
