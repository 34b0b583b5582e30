//! Application state container
//!
//! This module defines the shared application state that is passed
//! to all request handlers via Axum's state extraction.

use crate::config::Settings;
use crate::services::backend_pool::{CredentialPool, PoolStats};
use crate::services::extraction::{ExtractionService, OfficeExtractor};
use crate::services::gemini::{GeminiClient, GeminiConfig};
use crate::services::generation::GenerationService;
use anyhow::Context;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
///
/// Cheap to clone; every handler sees the same credential pool and cursor.
#[derive(Clone)]
pub struct AppState {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Prompt generation over the rotating key pool
    pub generation: Arc<GenerationService>,

    /// Upload staging and text extraction
    pub extraction: Arc<ExtractionService>,

    /// Application start time (for uptime calculation)
    pub start_time: Instant,
}

impl AppState {
    /// Create a new application state backed by the Gemini API
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let pool = Arc::new(CredentialPool::from_keys(settings.gemini.api_keys.iter().cloned()));
        tracing::info!(credentials = pool.len(), "Credential pool initialized");
        if pool.is_empty() {
            tracing::warn!("No Gemini API keys configured; generation requests will fail");
        }

        let mut gemini_config = GeminiConfig::default()
            .with_model(settings.gemini.model.clone())
            .with_timeout(settings.gemini.timeout_seconds);
        if let Some(base_url) = &settings.gemini.base_url {
            gemini_config = gemini_config.with_base_url(base_url.clone());
        }
        let backend = Arc::new(
            GeminiClient::new(gemini_config).context("Failed to build Gemini HTTP client")?,
        );

        let generation = Arc::new(GenerationService::new(pool, backend, settings.sanitizer_mode));

        tokio::fs::create_dir_all(&settings.upload_dir)
            .await
            .with_context(|| {
                format!("Failed to create upload directory {}", settings.upload_dir.display())
            })?;
        let extraction = Arc::new(ExtractionService::new(
            Arc::new(OfficeExtractor::new()),
            settings.upload_dir.clone(),
        ));

        tracing::info!("Application state initialized successfully");

        Ok(Self::with_services(settings, generation, extraction))
    }

    /// Assemble state from already-built services
    pub fn with_services(
        settings: Settings,
        generation: Arc<GenerationService>,
        extraction: Arc<ExtractionService>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            generation,
            extraction,
            start_time: Instant::now(),
        }
    }

    /// Get the application uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Snapshot of the credential pool
    pub fn pool_stats(&self) -> PoolStats {
        self.generation.pool().stats()
    }
}
