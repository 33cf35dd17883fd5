//! Prompt templates and generation settings for each pipeline stage.

use crate::content::ExtractedContent;
use crate::reasoning::{GenerateOptions, ModelTier, Stage};
use crate::summary::{ArgumentStructure, Framework, LayeredSummary, StoryStructure};
use schemars::JsonSchema;

/// Characters of text sent to the full-detail stages (core, layers, structure)
pub const FULL_TEXT_LIMIT: usize = 100_000;
/// Characters of text sent to the counter-argument and steelman stages
pub const CRITIQUE_TEXT_LIMIT: usize = 50_000;
/// Characters of text the framework classifier sees
pub const PREVIEW_LIMIT: usize = 2_000;

fn framework_detection_prompt(title: &str, text: &str) -> String {
    format!(
        r#"You are classifying text to determine the best analytical framework.

Decide whether this content is better analyzed as:
- "story": narrative content with events, characters and conflicts (news stories, personal essays, case studies, accounts of events)
- "argument": persuasive content making claims with evidence (opinion pieces, research papers, manifestos, analysis)

Respond with ONLY "story" or "argument".

Content title: {title}

First 2000 characters:
{text}"#
    )
}

fn core_summary_prompt(title: &str, kind: &str, text: &str) -> String {
    format!(
        r#"You are a master summarizer. Extract the absolute essence of this content in ONE sentence.

The sentence must:
- Capture the central insight, not just the topic
- Be specific enough that a reader of this sentence alone understands the core point
- Be compelling enough to make someone want to learn more
- Avoid throat-clearing such as "This article discusses..." or "The author argues..."

Content title: {title}
Content type: {kind}

Full text:
{text}

Respond with ONLY the one-sentence core summary. No preamble."#
    )
}

fn story_analysis_prompt(schema: &str, title: &str, text: &str) -> String {
    format!(
        r#"You are analyzing content through the lens of dramatic structure.

Even factual content has narrative elements. Find them: the situation before, the complication that disrupts it, the central question it raises, and how it resolves.

Respond with a JSON object matching this JSON Schema:
{schema}

Content title: {title}

Full text:
{text}

Respond with ONLY valid JSON, no markdown formatting."#
    )
}

fn argument_analysis_prompt(schema: &str, title: &str, text: &str) -> String {
    format!(
        r#"You are analyzing content through the lens of logical argumentation.

Extract the logical structure, even if implicit: the thesis, the evidence offered for it, the best objection, and the nuanced synthesis.

Respond with a JSON object matching this JSON Schema:
{schema}

Content title: {title}

Full text:
{text}

Respond with ONLY valid JSON, no markdown formatting."#
    )
}

fn layers_prompt(schema: &str, title: &str, text: &str) -> String {
    format!(
        r#"You are creating layered summaries at increasing levels of detail.

Generate 4 summary layers:
- Depth 0, "Core": the core message in 1 sentence
- Depth 1, "Key Points": key context and main argument in 2-3 sentences
- Depth 2, "In Detail": supporting details and nuances in a short paragraph (4-5 sentences)
- Depth 3, "Full Summary": comprehensive summary including examples and evidence (2-3 paragraphs)

Each layer must be COMPLETE on its own. A reader of only that layer gets a coherent summary at that depth. Never write "as mentioned above" or refer to other layers.

Respond with a JSON object matching this JSON Schema:
{schema}

Content title: {title}

Full text:
{text}

Respond with ONLY valid JSON, no markdown formatting."#
    )
}

fn counter_argument_prompt(title: &str, thesis: &str, text: &str) -> String {
    format!(
        r#"You are a skilled debater constructing the STRONGEST possible case against the author's position.

Rules:
- Don't strawman. Steelman the opposition.
- Find the most compelling objections, not the easiest ones to dismiss
- Consider empirical, logical, practical and moral objections
- The author should have to take this counter-argument seriously

Content title: {title}
Author's apparent position: {thesis}

Full text:
{text}

Write 3-4 sentences presenting the strongest case against this position. Be direct and forceful."#
    )
}

fn steelman_prompt(title: &str, thesis: &str, text: &str) -> String {
    format!(
        r#"You are making the author's argument STRONGER than they made it.

Rules:
- Identify weaknesses in how they presented their case
- Add stronger evidence or reasoning they could have used
- Anticipate and preemptively address objections
- Make the argument more precise and compelling

Content title: {title}
Author's thesis: {thesis}

Full text:
{text}

Write 3-4 sentences presenting a STRONGER version of the author's argument. This should be the best possible case for their position."#
    )
}

/// A prompt ready to send, with the settings for its stage
#[derive(Debug, Clone)]
pub struct StagePrompt {
    pub prompt: String,
    pub options: GenerateOptions,
}

/// Prefix of `text` holding at most `max_chars` characters
pub fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Settings for each stage: classification is deterministic, writing is not
pub fn options(stage: Stage) -> GenerateOptions {
    let (model, temperature, max_output_tokens, structured_output) = match stage {
        Stage::Framework => (ModelTier::Classifier, 0.0, 10, false),
        Stage::Core => (ModelTier::Full, 0.3, 200, false),
        Stage::Layers => (ModelTier::Full, 0.3, 2_000, true),
        Stage::Structure => (ModelTier::Full, 0.3, 1_000, true),
        Stage::CounterArgument | Stage::Steelman => (ModelTier::Full, 0.5, 500, false),
    };
    GenerateOptions {
        stage,
        model,
        temperature,
        max_output_tokens,
        structured_output,
    }
}

pub fn framework_detection(content: &ExtractedContent) -> StagePrompt {
    let prompt = framework_detection_prompt(content.title(), truncate(content.text(), PREVIEW_LIMIT));
    stage_prompt(Stage::Framework, prompt)
}

pub fn core_summary(content: &ExtractedContent) -> StagePrompt {
    let prompt = core_summary_prompt(
        content.title(),
        content.content_type().as_str(),
        truncate(content.text(), FULL_TEXT_LIMIT),
    );
    stage_prompt(Stage::Core, prompt)
}

pub fn layers(content: &ExtractedContent) -> StagePrompt {
    let prompt = layers_prompt(
        &schema_json::<LayeredSummary>(),
        content.title(),
        truncate(content.text(), FULL_TEXT_LIMIT),
    );
    stage_prompt(Stage::Layers, prompt)
}

pub fn structure(content: &ExtractedContent, framework: Framework) -> StagePrompt {
    let text = truncate(content.text(), FULL_TEXT_LIMIT);
    let prompt = match framework {
        Framework::Story => {
            story_analysis_prompt(&schema_json::<StoryStructure>(), content.title(), text)
        }
        Framework::Argument => {
            argument_analysis_prompt(&schema_json::<ArgumentStructure>(), content.title(), text)
        }
    };
    stage_prompt(Stage::Structure, prompt)
}

pub fn counter_argument(content: &ExtractedContent, thesis: &str) -> StagePrompt {
    let prompt = counter_argument_prompt(
        content.title(),
        thesis,
        truncate(content.text(), CRITIQUE_TEXT_LIMIT),
    );
    stage_prompt(Stage::CounterArgument, prompt)
}

pub fn steelman(content: &ExtractedContent, thesis: &str) -> StagePrompt {
    let prompt = steelman_prompt(
        content.title(),
        thesis,
        truncate(content.text(), CRITIQUE_TEXT_LIMIT),
    );
    stage_prompt(Stage::Steelman, prompt)
}

fn stage_prompt(stage: Stage, prompt: String) -> StagePrompt {
    StagePrompt {
        prompt,
        options: options(stage),
    }
}

fn schema_json<T: JsonSchema>() -> String {
    let schema = schemars::schema_for!(T);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentType, ExtractedContent};

    #[test]
    fn truncate_cuts_on_char_boundaries() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
        assert_eq!(truncate("hello", 2), "he");
        assert_eq!(truncate("héllo wörld", 4), "héll");
        assert_eq!(truncate("日本語テキスト", 3), "日本語");
        assert_eq!(truncate("", 3), "");
    }

    #[test]
    fn classification_is_deterministic_and_writing_is_not() {
        let classify = options(Stage::Framework);
        assert_eq!(classify.temperature, 0.0);
        assert_eq!(classify.model, ModelTier::Classifier);
        assert!(!classify.structured_output);

        for stage in [
            Stage::Core,
            Stage::Layers,
            Stage::Structure,
            Stage::CounterArgument,
            Stage::Steelman,
        ] {
            let opts = options(stage);
            assert!(opts.temperature > 0.0, "{stage} should not be deterministic");
            assert_eq!(opts.model, ModelTier::Full);
        }

        assert!(options(Stage::Layers).structured_output);
        assert!(options(Stage::Structure).structured_output);
        assert!(!options(Stage::Steelman).structured_output);
    }

    #[test]
    fn critique_stages_see_less_text_than_full_stages() {
        let text = "x".repeat(FULL_TEXT_LIMIT + 500);
        let content = ExtractedContent::from_text(text);

        let core = core_summary(&content);
        assert!(core.prompt.contains(&"x".repeat(FULL_TEXT_LIMIT)));
        assert!(!core.prompt.contains(&"x".repeat(FULL_TEXT_LIMIT + 1)));

        let counter = counter_argument(&content, "T");
        assert!(counter.prompt.contains(&"x".repeat(CRITIQUE_TEXT_LIMIT)));
        assert!(!counter.prompt.contains(&"x".repeat(CRITIQUE_TEXT_LIMIT + 1)));

        let classify = framework_detection(&content);
        assert!(!classify.prompt.contains(&"x".repeat(PREVIEW_LIMIT + 1)));
    }

    #[test]
    fn critique_prompts_carry_the_thesis() {
        let content = ExtractedContent::from_source(
            ContentType::Article,
            "Car-free cities",
            "body",
            "https://example.com/a",
        );
        let counter = counter_argument(&content, "Ban cars downtown");
        assert!(counter.prompt.contains("Author's apparent position: Ban cars downtown"));
        assert_eq!(counter.options.stage, Stage::CounterArgument);

        let steelman = steelman(&content, "Ban cars downtown");
        assert!(steelman.prompt.contains("Author's thesis: Ban cars downtown"));
        assert!(steelman.prompt.contains("Content title: Car-free cities"));
    }

    #[test]
    fn structure_prompt_embeds_matching_schema() {
        let content = ExtractedContent::from_text("some text");
        let story = structure(&content, Framework::Story);
        assert!(story.prompt.contains("\"resolution\""));
        assert!(!story.prompt.contains("\"synthesis\""));

        let argument = structure(&content, Framework::Argument);
        assert!(argument.prompt.contains("\"counterArgument\""));
        assert!(!argument.prompt.contains("{schema}"));
        assert_eq!(argument.options.stage, Stage::Structure);
    }

    #[test]
    fn placeholders_inside_values_are_left_alone() {
        let content = ExtractedContent::from_source(
            ContentType::Article,
            "Why {text} matters",
            "BODY-MARKER",
            "https://example.com/a",
        );

        let counter = counter_argument(&content, "the {text} and {title} thesis");
        assert!(counter
            .prompt
            .contains("Author's apparent position: the {text} and {title} thesis"));
        assert!(counter.prompt.contains("Content title: Why {text} matters"));
        assert_eq!(counter.prompt.matches("BODY-MARKER").count(), 1);

        let steelman = steelman(&content, "{thesis}");
        assert!(steelman.prompt.contains("Author's thesis: {thesis}"));

        let core = core_summary(&content);
        assert!(core.prompt.contains("Content title: Why {text} matters"));
        assert_eq!(core.prompt.matches("BODY-MARKER").count(), 1);
    }

    #[test]
    fn core_prompt_names_content_type() {
        let content = ExtractedContent::from_text("some text");
        let core = core_summary(&content);
        assert!(core.prompt.contains("Content type: text"));
        assert!(core.prompt.contains("Content title: Pasted Text"));
    }
}
