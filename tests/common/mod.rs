// Shared test doubles for the pipeline and HTTP tests.

#![allow(dead_code)]

use async_trait::async_trait;
use gist::reasoning::{GenerateOptions, ReasoningError, ReasoningService, Stage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

pub const STORY_JSON: &str = r#"{
    "situation": "A mill town depends on one employer.",
    "complication": "The mill closes overnight.",
    "question": "Can the town reinvent itself?",
    "resolution": "The town becomes a hub for remote workers."
}"#;

pub const ARGUMENT_JSON: &str = r#"{
    "thesis": "Cities should ban private cars downtown.",
    "evidence": ["Air quality improves", "Pedestrian deaths fall", "Shops see more foot traffic"],
    "counterArgument": "Bans hurt people with disabilities.",
    "synthesis": "Ban cars, with exemptions and better transit."
}"#;

pub const LAYERS_JSON: &str = r#"{"layers": [
    {"depth": 0, "title": "Core", "content": "Car-free downtowns work."},
    {"depth": 1, "title": "Key Points", "content": "Cleaner air and safer streets follow a ban."},
    {"depth": 2, "title": "In Detail", "content": "Cities that banned cars saw measurable gains."},
    {"depth": 3, "title": "Full Summary", "content": "A long, self-contained summary."}
]}"#;

/// Arguments captured from a generate call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub options: GenerateOptions,
}

/// Reasoning service returning canned responses per stage
pub struct ScriptedReasoning {
    responses: Mutex<HashMap<Stage, Result<String, String>>>,
    calls: Mutex<Vec<RecordedCall>>,
    barriers: HashMap<Stage, Arc<Barrier>>,
}

impl ScriptedReasoning {
    pub fn new() -> Self {
        let responses = HashMap::from([
            (Stage::Framework, Ok("argument".to_string())),
            (Stage::Core, Ok("Car-free downtowns make cities better.".to_string())),
            (Stage::Layers, Ok(LAYERS_JSON.to_string())),
            (Stage::Structure, Ok(ARGUMENT_JSON.to_string())),
            (Stage::CounterArgument, Ok("Deliveries and access suffer.".to_string())),
            (Stage::Steelman, Ok("Every city that tried it kept it.".to_string())),
        ]);
        Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
            barriers: HashMap::new(),
        }
    }

    /// Narrative content: classifier says story and structure is a story arc
    pub fn story() -> Self {
        Self::new()
            .with_response(Stage::Framework, "story")
            .with_response(Stage::Structure, STORY_JSON)
    }

    pub fn with_response(self, stage: Stage, response: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(stage, Ok(response.to_string()));
        self
    }

    pub fn with_failure(self, stage: Stage, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(stage, Err(message.to_string()));
        self
    }

    /// Make every call in `stages` wait until all of them have started
    pub fn with_rendezvous(mut self, stages: &[Stage]) -> Self {
        let barrier = Arc::new(Barrier::new(stages.len()));
        for stage in stages {
            self.barriers.insert(*stage, Arc::clone(&barrier));
        }
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, stage: Stage) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.options.stage == stage)
            .collect()
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.calls().iter().map(|call| call.options.stage).collect()
    }
}

#[async_trait]
impl ReasoningService for ScriptedReasoning {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ReasoningError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            options: options.clone(),
        });

        if let Some(barrier) = self.barriers.get(&options.stage) {
            barrier.wait().await;
        }

        let response = self
            .responses
            .lock()
            .unwrap()
            .get(&options.stage)
            .cloned()
            .unwrap_or_else(|| Ok(String::new()));
        response.map_err(ReasoningError::Provider)
    }
}
