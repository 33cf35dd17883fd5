//! LLM agent module: the summarization pipeline.
//!
//! A run issues six requests to the reasoning service in three stages:
//!
//! ```text
//! A: framework | core | layers      (concurrent)
//! B: structure(framework)
//! C: counter(thesis) | steelman(thesis)   (concurrent)
//! ```
//!
//! Requests inside a stage are launched together and all run to completion
//! before the stage's result is inspected. Any failure aborts the run and no
//! partial gist is returned.

pub use crate::summary::GistResult;

use crate::content::ExtractedContent;
use crate::prompts::{self, StagePrompt};
use crate::reasoning::{ReasoningError, ReasoningService, Stage};
use crate::summary::{self, Framework, SchemaError, Structure, SummaryLayer};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("{stage} stage failed: {source}")]
    Reasoning {
        stage: Stage,
        #[source]
        source: ReasoningError,
    },
    #[error("{stage} stage returned malformed output: {source}")]
    Malformed {
        stage: Stage,
        #[source]
        source: SchemaError,
    },
    #[error("{stage} stage returned an empty response")]
    EmptyResponse { stage: Stage },
}

impl GenerationError {
    pub fn stage(&self) -> Stage {
        match self {
            GenerationError::Reasoning { stage, .. }
            | GenerationError::Malformed { stage, .. }
            | GenerationError::EmptyResponse { stage } => *stage,
        }
    }
}

/// Runs the summarization pipeline against a reasoning service.
#[derive(Clone)]
pub struct Summarizer {
    reasoning: Arc<dyn ReasoningService>,
}

impl Summarizer {
    pub fn new(reasoning: Arc<dyn ReasoningService>) -> Self {
        Self { reasoning }
    }

    /// Produce the complete gist of `content`.
    pub async fn summarize(&self, content: &ExtractedContent) -> Result<GistResult, GenerationError> {
        let span = info_span!(
            "summarize",
            source_type = %content.content_type(),
            words = content.word_count()
        );
        self.run(content).instrument(span).await
    }

    async fn run(&self, content: &ExtractedContent) -> Result<GistResult, GenerationError> {
        let started = Instant::now();

        // Stage A: independent analyses
        let (framework, core, layers) = tokio::join!(
            self.detect_framework(content),
            self.generate_core(content),
            self.generate_layers(content),
        );
        let framework = framework?;
        let core = core?;
        let layers = layers?;
        info!(%framework, "framework selected");

        // Stage B: framework-specific structure
        let structure = self.analyze_structure(content, framework).await?;
        let thesis = structure.thesis();

        // Stage C: critical thinking on the derived thesis
        let (counter_argument, steelman) = tokio::join!(
            self.generate_counter_argument(content, thesis),
            self.generate_steelman(content, thesis),
        );
        let counter_argument = counter_argument?;
        let steelman = steelman?;

        let gist = GistResult::assemble(content, core, layers, structure, counter_argument, steelman);
        info!(
            id = %gist.id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "gist assembled"
        );
        Ok(gist)
    }

    async fn detect_framework(&self, content: &ExtractedContent) -> Result<Framework, GenerationError> {
        let raw = self.call(prompts::framework_detection(content)).await?;
        let framework = Framework::classify(&raw);
        if framework == Framework::Argument && !raw.trim().eq_ignore_ascii_case("argument") {
            debug!(raw = %raw.trim(), "unrecognised classifier output, defaulting to argument");
        }
        Ok(framework)
    }

    async fn generate_core(&self, content: &ExtractedContent) -> Result<String, GenerationError> {
        self.call_prose(prompts::core_summary(content)).await
    }

    async fn generate_layers(
        &self,
        content: &ExtractedContent,
    ) -> Result<Vec<SummaryLayer>, GenerationError> {
        let raw = self.call(prompts::layers(content)).await?;
        summary::parse_layers(&raw).map_err(|source| malformed(Stage::Layers, source))
    }

    async fn analyze_structure(
        &self,
        content: &ExtractedContent,
        framework: Framework,
    ) -> Result<Structure, GenerationError> {
        let raw = self.call(prompts::structure(content, framework)).await?;
        summary::parse_structure(framework, &raw).map_err(|source| malformed(Stage::Structure, source))
    }

    async fn generate_counter_argument(
        &self,
        content: &ExtractedContent,
        thesis: &str,
    ) -> Result<String, GenerationError> {
        self.call_prose(prompts::counter_argument(content, thesis)).await
    }

    async fn generate_steelman(
        &self,
        content: &ExtractedContent,
        thesis: &str,
    ) -> Result<String, GenerationError> {
        self.call_prose(prompts::steelman(content, thesis)).await
    }

    /// Call the service and require a non-blank reply
    async fn call_prose(&self, request: StagePrompt) -> Result<String, GenerationError> {
        let stage = request.options.stage;
        let text = self.call(request).await?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            warn!(%stage, "empty response");
            return Err(GenerationError::EmptyResponse { stage });
        }
        Ok(trimmed.to_string())
    }

    async fn call(&self, request: StagePrompt) -> Result<String, GenerationError> {
        let stage = request.options.stage;
        let started = Instant::now();
        match self.reasoning.generate(&request.prompt, &request.options).await {
            Ok(text) => {
                debug!(
                    %stage,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    chars = text.len(),
                    "stage complete"
                );
                Ok(text)
            }
            Err(source) => {
                warn!(%stage, error = %source, "stage failed");
                Err(GenerationError::Reasoning { stage, source })
            }
        }
    }
}

fn malformed(stage: Stage, source: SchemaError) -> GenerationError {
    warn!(%stage, error = %source, "malformed response");
    GenerationError::Malformed { stage, source }
}

/// Summarize `content` with the given reasoning service
pub async fn summarize(
    reasoning: Arc<dyn ReasoningService>,
    content: &ExtractedContent,
) -> Result<GistResult, GenerationError> {
    Summarizer::new(reasoning).summarize(content).await
}
