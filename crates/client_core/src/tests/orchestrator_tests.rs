use super::*;
use crate::{error::StoryErrorKind, state::OperationStatus, STORY_GENERATION_FAILED};
use async_trait::async_trait;
use shared::{domain::Story, protocol::StorySegmentPayload};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Describe { file_name: String, bytes: usize },
    Story { prompt: String },
    Narrate { story_text: String },
}

struct RecordingBackend {
    description: StoryResult<String>,
    story: StoryResult<Story>,
    narration: StoryResult<()>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingBackend {
    fn ok(description: &str, paragraphs: &[&str]) -> Self {
        Self {
            description: Ok(description.to_string()),
            story: Ok(story_of(paragraphs)),
            narration: Ok(()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn with_story(mut self, story: StoryResult<Story>) -> Self {
        self.story = story;
        self
    }

    fn with_description(mut self, description: StoryResult<String>) -> Self {
        self.description = description;
        self
    }

    fn with_narration(mut self, narration: StoryResult<()>) -> Self {
        self.narration = narration;
        self
    }
}

#[async_trait]
impl StoryBackend for RecordingBackend {
    async fn describe_image(&self, image: &ImageSelection) -> StoryResult<String> {
        self.calls.lock().await.push(Call::Describe {
            file_name: image.file_name().to_string(),
            bytes: image.len(),
        });
        self.description.clone()
    }

    async fn generate_story(&self, prompt: &str) -> StoryResult<Story> {
        self.calls.lock().await.push(Call::Story {
            prompt: prompt.to_string(),
        });
        self.story.clone()
    }

    async fn narrate(&self, story_text: &str) -> StoryResult<()> {
        self.calls.lock().await.push(Call::Narrate {
            story_text: story_text.to_string(),
        });
        self.narration.clone()
    }
}

fn story_of(paragraphs: &[&str]) -> Story {
    Story::from_payloads(
        paragraphs
            .iter()
            .enumerate()
            .map(|(index, paragraph)| StorySegmentPayload {
                paragraph: paragraph.to_string(),
                description: format!("scene {index}"),
                data: None,
            })
            .collect(),
    )
    .expect("non-empty story")
}

fn image(name: &str) -> ImageSelection {
    ImageSelection::new(name, "image/jpeg", name.as_bytes().to_vec()).expect("image")
}

fn orchestrator(backend: RecordingBackend) -> (StoryOrchestrator, Arc<Mutex<Vec<Call>>>) {
    let calls = backend.calls.clone();
    (StoryOrchestrator::new(Arc::new(backend)), calls)
}

#[tokio::test]
async fn cat_scenario_narrates_space_joined_paragraphs() {
    let (mut orchestrator, calls) = orchestrator(RecordingBackend::ok(
        "A cat on a mat",
        &["The cat stretched.", "Then it slept on the mat."],
    ));

    orchestrator.select_image(image("a.jpg"));
    orchestrator.request_description().await.expect("describe");
    assert_eq!(orchestrator.state().description(), Some("A cat on a mat"));

    orchestrator.request_story().await.expect("story");
    assert_eq!(orchestrator.state().story().map(Story::len), Some(2));

    assert!(orchestrator.play_narration().await.expect("narrate"));
    assert_eq!(orchestrator.state().status(), OperationStatus::Idle);

    assert_eq!(
        calls.lock().await.as_slice(),
        &[
            Call::Describe {
                file_name: "a.jpg".to_string(),
                bytes: 5,
            },
            Call::Story {
                prompt: "A cat on a mat".to_string(),
            },
            Call::Narrate {
                story_text: "The cat stretched. Then it slept on the mat.".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn selecting_new_image_resets_description_and_story() {
    let (mut orchestrator, _calls) =
        orchestrator(RecordingBackend::ok("A cat on a mat", &["one", "two"]));

    let first = orchestrator.select_image(image("a.jpg"));
    orchestrator.request_description().await.expect("describe");
    orchestrator.request_story().await.expect("story");

    let second = orchestrator.select_image(image("b.png"));
    assert_ne!(first, second);
    assert_eq!(orchestrator.state().description(), None);
    assert!(orchestrator.state().story().is_none());
    assert_eq!(
        orchestrator.state().selection().map(ImageSelection::file_name),
        Some("b.png")
    );
    assert_eq!(
        orchestrator.state().preview().map(|preview| preview.selection_id),
        Some(second)
    );
}

#[tokio::test]
async fn description_without_image_sends_nothing() {
    let (mut orchestrator, calls) = orchestrator(RecordingBackend::ok("unused", &["unused"]));

    let err = orchestrator
        .request_description()
        .await
        .expect_err("no image selected");
    assert_eq!(err.kind(), StoryErrorKind::Validation);
    assert_eq!(
        orchestrator.state().status(),
        OperationStatus::Failed("no image selected".to_string())
    );
    assert!(calls.lock().await.is_empty());
}

#[tokio::test]
async fn story_without_description_sends_nothing() {
    let (mut orchestrator, calls) = orchestrator(RecordingBackend::ok("unused", &["unused"]));
    orchestrator.select_image(image("a.jpg"));

    let err = orchestrator.request_story().await.expect_err("no description");
    assert_eq!(err.kind(), StoryErrorKind::Validation);
    assert!(orchestrator.state().status().is_failed());
    assert!(calls.lock().await.is_empty());
}

#[tokio::test]
async fn narration_without_story_is_ignored() {
    let (mut orchestrator, calls) = orchestrator(RecordingBackend::ok("unused", &["unused"]));
    orchestrator.select_image(image("a.jpg"));

    assert!(!orchestrator.play_narration().await.expect("no-op"));
    assert_eq!(orchestrator.state().status(), OperationStatus::Idle);
    assert!(calls.lock().await.is_empty());
}

#[tokio::test]
async fn failed_story_leaves_story_empty() {
    let (mut orchestrator, _calls) = orchestrator(
        RecordingBackend::ok("A cat on a mat", &["unused"])
            .with_story(Err(StoryError::remote(STORY_GENERATION_FAILED))),
    );
    orchestrator.select_image(image("a.jpg"));
    orchestrator.request_description().await.expect("describe");

    let err = orchestrator.request_story().await.expect_err("story fails");
    assert_eq!(err.kind(), StoryErrorKind::Remote);
    assert!(orchestrator.state().story().is_none());
    assert_eq!(
        orchestrator.state().status(),
        OperationStatus::Failed("Error generating story: story generation failed".to_string())
    );
}

#[tokio::test]
async fn transport_failure_keeps_description_empty_until_retry() {
    let (mut orchestrator, calls) = orchestrator(
        RecordingBackend::ok("unused", &["unused"])
            .with_description(Err(StoryError::Transport("connection refused".to_string()))),
    );
    orchestrator.select_image(image("a.jpg"));

    let err = orchestrator
        .request_description()
        .await
        .expect_err("transport failure");
    assert_eq!(err.kind(), StoryErrorKind::Transport);
    assert_eq!(orchestrator.state().description(), None);
    assert_eq!(
        orchestrator.state().error(),
        Some("Error generating description: connection refused")
    );

    // No automatic retry: exactly one outbound request.
    assert_eq!(calls.lock().await.len(), 1);
}

#[tokio::test]
async fn narration_failure_is_surfaced_and_not_retried() {
    let (mut orchestrator, calls) = orchestrator(
        RecordingBackend::ok("A cat on a mat", &["one"])
            .with_narration(Err(StoryError::remote("narration failed"))),
    );
    orchestrator.select_image(image("a.jpg"));
    orchestrator.request_description().await.expect("describe");
    orchestrator.request_story().await.expect("story");

    let err = orchestrator.play_narration().await.expect_err("narration fails");
    assert_eq!(err.message(), "narration failed");
    assert_eq!(
        orchestrator.state().error(),
        Some("Error playing audio: narration failed")
    );
    assert!(!orchestrator.state().in_flight().narrating);
    assert_eq!(calls.lock().await.len(), 3);
}

#[tokio::test]
async fn empty_description_from_backend_is_a_failure() {
    let (mut orchestrator, _calls) = orchestrator(
        RecordingBackend::ok("unused", &["unused"]).with_description(Ok("   ".to_string())),
    );
    orchestrator.select_image(image("a.jpg"));

    let err = orchestrator
        .request_description()
        .await
        .expect_err("blank description");
    assert_eq!(err.kind(), StoryErrorKind::Remote);
    assert_eq!(orchestrator.state().description(), None);
}
