//! Content extraction: turns a URL or pasted text into [`ExtractedContent`].

use crate::config::ExtractorConfig;
use crate::content::{ContentType, ExtractedContent, GistRequest, InputError, Source};
use crate::scraper::{self, UNTITLED_ARTICLE};
use crate::youtube;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info};

/// Title used when a PDF URL has no file name
pub const DEFAULT_PDF_TITLE: &str = "PDF Document";

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status} fetching {url}")]
    Http { url: String, status: StatusCode },
    #[error("no readable content found at {0}")]
    NoContent(String),
    #[error("invalid YouTube URL: {0}")]
    InvalidYouTubeUrl(String),
    #[error("no transcript available for YouTube video {0}")]
    NoTranscript(String),
    #[error("failed to extract PDF text: {0}")]
    Pdf(String),
}

/// Classify a URL by the extraction strategy it needs
pub fn detect_content_type(url: &str) -> ContentType {
    let lower = url.to_lowercase();
    if lower.contains("youtube.com/watch") || lower.contains("youtu.be/") {
        ContentType::Youtube
    } else if lower.ends_with(".pdf") {
        ContentType::Pdf
    } else {
        ContentType::Article
    }
}

/// PDF title from the last path segment of its URL
pub fn pdf_title(url: &str) -> String {
    let file_name = url.rsplit('/').next().unwrap_or_default();
    let stem = if file_name.to_lowercase().ends_with(".pdf") {
        &file_name[..file_name.len() - 4]
    } else {
        file_name
    };
    if stem.trim().is_empty() {
        DEFAULT_PDF_TITLE.to_string()
    } else {
        stem.to_string()
    }
}

/// Fetches and normalizes source content
#[derive(Clone)]
pub struct ContentExtractor {
    client: Client,
}

impl ContentExtractor {
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractionError> {
        let client = scraper::create_client(config).map_err(ExtractionError::Client)?;
        Ok(Self { client })
    }

    /// Extract content for a request holding exactly one of `url` or `text`
    pub async fn extract(&self, request: &GistRequest) -> Result<ExtractedContent, ExtractionError> {
        match request.validate()? {
            Source::Text(text) => Ok(ExtractedContent::from_text(text)),
            Source::Url(url) => self.extract_url(&url).await,
        }
    }

    /// Fetch a URL with the strategy matching its content type
    pub async fn extract_url(&self, url: &str) -> Result<ExtractedContent, ExtractionError> {
        let content_type = detect_content_type(url);
        info!(%url, %content_type, "extracting content");

        let content = match content_type {
            ContentType::Youtube => self.extract_youtube(url).await?,
            ContentType::Pdf => self.extract_pdf(url).await?,
            ContentType::Article | ContentType::Text => self.extract_article(url).await?,
        };

        if content.text().trim().is_empty() {
            return Err(ExtractionError::NoContent(url.to_string()));
        }
        debug!(words = content.word_count(), title = %content.title(), "content extracted");
        Ok(content)
    }

    async fn extract_article(&self, url: &str) -> Result<ExtractedContent, ExtractionError> {
        let html = self.fetch(url).await?.text().await.map_err(fetch_error(url))?;
        let article = scraper::parse_article(&html);
        let title = article
            .title
            .unwrap_or_else(|| UNTITLED_ARTICLE.to_string());
        Ok(ExtractedContent::from_source(
            ContentType::Article,
            title,
            article.text,
            url,
        ))
    }

    async fn extract_pdf(&self, url: &str) -> Result<ExtractedContent, ExtractionError> {
        let bytes = self.fetch(url).await?.bytes().await.map_err(fetch_error(url))?;

        // pdf-extract is synchronous and may panic on damaged files
        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?
        .map_err(ExtractionError::Pdf)?;

        Ok(ExtractedContent::from_source(
            ContentType::Pdf,
            pdf_title(url),
            text,
            url,
        ))
    }

    async fn extract_youtube(&self, url: &str) -> Result<ExtractedContent, ExtractionError> {
        let id = youtube::video_id(url)
            .ok_or_else(|| ExtractionError::InvalidYouTubeUrl(url.to_string()))?;

        let watch_url = youtube::watch_url(id);
        let page = self
            .fetch(&watch_url)
            .await?
            .text()
            .await
            .map_err(fetch_error(&watch_url))?;

        let tracks = youtube::caption_tracks(&page);
        let track = youtube::pick_track(&tracks)
            .ok_or_else(|| ExtractionError::NoTranscript(id.to_string()))?;
        debug!(language = %track.language_code, "caption track selected");

        let xml = self
            .fetch(&track.base_url)
            .await?
            .text()
            .await
            .map_err(fetch_error(&track.base_url))?;
        let transcript = youtube::parse_transcript(&xml);
        if transcript.is_empty() {
            return Err(ExtractionError::NoTranscript(id.to_string()));
        }

        Ok(ExtractedContent::from_source(
            ContentType::Youtube,
            youtube::page_title(&page),
            transcript,
            url,
        ))
    }

    async fn fetch(&self, url: &str) -> Result<reqwest::Response, ExtractionError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(fetch_error(url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::Http {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }
}

fn fetch_error(url: &str) -> impl FnOnce(reqwest::Error) -> ExtractionError + '_ {
    move |source| ExtractionError::Fetch {
        url: url.to_string(),
        source,
    }
}
