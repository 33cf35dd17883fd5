//! Normalized source content consumed by the summarization pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Title given to text pasted directly by the caller.
pub const PASTED_TEXT_TITLE: &str = "Pasted Text";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Either url or text must be provided")]
    Missing,
    #[error("Provide either url or text, not both")]
    Both,
    #[error("Invalid request body: {0}")]
    Body(String),
}

/// Kind of source a piece of content was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Article,
    Youtube,
    Pdf,
    Text,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Youtube => "youtube",
            ContentType::Pdf => "pdf",
            ContentType::Text => "text",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content after extraction, ready for summarization.
///
/// Built only through [`ExtractedContent::from_text`] or
/// [`ExtractedContent::from_source`], so pasted text never carries a source URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    content_type: ContentType,
    title: String,
    text: String,
    source_url: Option<String>,
}

impl ExtractedContent {
    /// Content pasted directly by the caller
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::Text,
            title: PASTED_TEXT_TITLE.to_string(),
            text: text.into(),
            source_url: None,
        }
    }

    /// Content fetched from a URL.
    ///
    /// `ContentType::Text` is reserved for pasted text and is mapped to
    /// `Article` here.
    pub fn from_source(
        content_type: ContentType,
        title: impl Into<String>,
        text: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        let content_type = match content_type {
            ContentType::Text => ContentType::Article,
            other => other,
        };
        Self {
            content_type,
            title: title.into(),
            text: text.into(),
            source_url: Some(url.into()),
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    /// Number of whitespace-delimited tokens in the text
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// A caller's request: exactly one of `url` or `text`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GistRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// A validated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    Text(String),
}

impl GistRequest {
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            text: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            url: None,
            text: Some(text.into()),
        }
    }

    /// Check that exactly one input was given. Blank strings count as absent.
    pub fn validate(&self) -> Result<Source, InputError> {
        let url = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());
        let text = self.text.as_deref().filter(|t| !t.trim().is_empty());

        match (url, text) {
            (Some(_), Some(_)) => Err(InputError::Both),
            (Some(url), None) => Ok(Source::Url(url.to_string())),
            (None, Some(text)) => Ok(Source::Text(text.to_string())),
            (None, None) => Err(InputError::Missing),
        }
    }
}
