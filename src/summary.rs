//! Gist data model - the structured output assembled from the LLM stages.
//!
//! Every shape the model is asked to produce derives `JsonSchema`, and the
//! parsers here are the only way model output enters the pipeline.

use crate::content::{ContentType, ExtractedContent};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Number of summary layers in every gist
pub const LAYER_COUNT: usize = 4;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("response is not valid JSON for the expected shape: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected layers with depths 0-3, got {0:?}")]
    LayerDepths(Vec<u8>),
    #[error("field `{0}` is blank")]
    BlankField(&'static str),
    #[error("framework `{framework}` does not match the {structure} structure")]
    FrameworkMismatch {
        framework: Framework,
        structure: Framework,
    },
}

/// Analytical framework used to structure the gist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Story,
    Argument,
}

impl Framework {
    /// Interpret raw classifier output.
    ///
    /// Only "story" (ignoring case and surrounding whitespace) selects the
    /// story framework; everything else, including an empty reply, is an argument.
    pub fn classify(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("story") {
            Framework::Story
        } else {
            Framework::Argument
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Story => "story",
            Framework::Argument => "argument",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dramatic structure of narrative content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoryStructure {
    /// The initial state of affairs, the context, the 'before' picture (2-3 sentences)
    pub situation: String,
    /// What disrupts the status quo, the conflict or tension introduced (2-3 sentences)
    pub complication: String,
    /// The central question the reader must resolve (1 sentence, phrased as a question)
    pub question: String,
    /// How it resolves, what changes, the 'after' picture (2-3 sentences)
    pub resolution: String,
}

/// Logical structure of persuasive content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentStructure {
    /// The central claim being made (1-2 sentences)
    pub thesis: String,
    /// Key supporting points, most important first
    pub evidence: Vec<String>,
    /// The best argument against the thesis that the author addresses or should have addressed (2-3 sentences)
    pub counter_argument: String,
    /// The nuanced final position, taking counter-arguments into account (2-3 sentences)
    pub synthesis: String,
}

/// Framework-specific structure; the variant always matches the gist's framework.
///
/// Serialized untagged: `GistResult::framework` carries the tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Structure {
    Story(StoryStructure),
    Argument(ArgumentStructure),
}

impl Structure {
    pub fn framework(&self) -> Framework {
        match self {
            Structure::Story(_) => Framework::Story,
            Structure::Argument(_) => Framework::Argument,
        }
    }

    /// The proposition handed to the counter-argument and steelman stages.
    ///
    /// Stories have no explicit claim, so their resolution stands in for one.
    pub fn thesis(&self) -> &str {
        match self {
            Structure::Story(story) => &story.resolution,
            Structure::Argument(argument) => &argument.thesis,
        }
    }
}

/// One depth level of the layered summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryLayer {
    /// 0 is the one-sentence core, 3 the most comprehensive
    pub depth: u8,
    /// Short heading, e.g. "Core", "Key Points", "In Detail", "Full Summary"
    pub title: String,
    /// Self-contained summary text at this depth
    pub content: String,
}

/// Wire shape of the layered summary response
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LayeredSummary {
    /// Exactly four layers with depths 0, 1, 2 and 3
    pub layers: Vec<SummaryLayer>,
}

/// The complete gist of a piece of content.
///
/// Deserializing rejects a `framework` that disagrees with the shape of
/// `structure`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "GistRecord")]
pub struct GistResult {
    pub id: Uuid,
    pub source_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub title: String,
    pub framework: Framework,
    /// The one-sentence essence
    pub core: String,
    /// Layered summaries ordered by increasing depth
    pub layers: Vec<SummaryLayer>,
    pub structure: Structure,
    /// Strongest case against the thesis
    pub counter_argument: String,
    /// Stronger version of the author's argument
    pub steelman: String,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Unchecked wire form of [`GistResult`]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GistRecord {
    id: Uuid,
    source_type: ContentType,
    #[serde(default)]
    source_url: Option<String>,
    title: String,
    framework: Framework,
    core: String,
    layers: Vec<SummaryLayer>,
    structure: Structure,
    counter_argument: String,
    steelman: String,
    word_count: usize,
    created_at: DateTime<Utc>,
}

impl TryFrom<GistRecord> for GistResult {
    type Error = SchemaError;

    fn try_from(record: GistRecord) -> Result<Self, Self::Error> {
        if record.framework != record.structure.framework() {
            return Err(SchemaError::FrameworkMismatch {
                framework: record.framework,
                structure: record.structure.framework(),
            });
        }
        Ok(Self {
            id: record.id,
            source_type: record.source_type,
            source_url: record.source_url,
            title: record.title,
            framework: record.framework,
            core: record.core,
            layers: record.layers,
            structure: record.structure,
            counter_argument: record.counter_argument,
            steelman: record.steelman,
            word_count: record.word_count,
            created_at: record.created_at,
        })
    }
}

impl GistResult {
    /// Assemble the final record from the completed stages.
    pub fn assemble(
        content: &ExtractedContent,
        core: String,
        layers: Vec<SummaryLayer>,
        structure: Structure,
        counter_argument: String,
        steelman: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_type: content.content_type(),
            source_url: content.source_url().map(str::to_string),
            title: content.title().to_string(),
            framework: structure.framework(),
            core,
            layers,
            structure,
            counter_argument,
            steelman,
            word_count: content.word_count(),
            created_at: Utc::now(),
        }
    }

    pub fn thesis(&self) -> &str {
        self.structure.thesis()
    }
}

/// Parse a structural analysis response for the chosen framework
pub fn parse_structure(framework: Framework, raw: &str) -> Result<Structure, SchemaError> {
    let structure = match framework {
        Framework::Story => Structure::Story(parse_json(raw)?),
        Framework::Argument => Structure::Argument(parse_json(raw)?),
    };

    if structure.thesis().trim().is_empty() {
        let field = match framework {
            Framework::Story => "resolution",
            Framework::Argument => "thesis",
        };
        return Err(SchemaError::BlankField(field));
    }

    Ok(structure)
}

/// Parse a layered summary response into exactly four layers ordered by depth
pub fn parse_layers(raw: &str) -> Result<Vec<SummaryLayer>, SchemaError> {
    let LayeredSummary { mut layers } = parse_json(raw)?;
    layers.sort_by_key(|layer| layer.depth);

    let depths: Vec<u8> = layers.iter().map(|layer| layer.depth).collect();
    let expected = (0..LAYER_COUNT as u8).collect::<Vec<_>>();
    if depths != expected {
        return Err(SchemaError::LayerDepths(depths));
    }

    Ok(layers)
}

/// Deserialize a model response, tolerating markdown code fences
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, SchemaError> {
    Ok(serde_json::from_str(strip_markdown_json(raw))?)
}

/// Strip markdown code block wrappers from JSON response
fn strip_markdown_json(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        let without_prefix = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(end_idx) = without_prefix.rfind("```") {
            return without_prefix[..end_idx].trim();
        }
    }

    trimmed
}
