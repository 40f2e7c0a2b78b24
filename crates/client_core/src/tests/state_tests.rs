use super::*;
use shared::protocol::StorySegmentPayload;

fn image(name: &str) -> ImageSelection {
    ImageSelection::new(name, "image/png", vec![1, 2, 3]).expect("image")
}

fn story(paragraphs: &[&str]) -> Story {
    Story::from_payloads(
        paragraphs
            .iter()
            .map(|paragraph| StorySegmentPayload {
                paragraph: paragraph.to_string(),
                description: "scene".to_string(),
                data: None,
            })
            .collect(),
    )
    .expect("story")
}

fn state_with_story() -> StoryState {
    let mut state = StoryState::new();
    state.select_image(image("a.png"));
    let ticket = state.begin_description().expect("describe");
    state.finish_description(ticket.selection_id, Ok("A cat on a mat".to_string()));
    let ticket = state.begin_story().expect("story");
    state.finish_story(ticket.selection_id, Ok(story(&["one", "two"])));
    state
}

#[test]
fn starts_idle_with_nothing_enabled() {
    let state = StoryState::new();
    assert_eq!(state.status(), OperationStatus::Idle);
    assert!(!state.can_describe());
    assert!(!state.can_generate_story());
    assert!(!state.can_narrate());
    assert!(state.preview().is_none());
}

#[test]
fn select_image_derives_fresh_preview_and_clears_error() {
    let mut state = StoryState::new();
    let _ = state.begin_story();
    assert!(state.status().is_failed());

    let first = state.select_image(image("a.png"));
    let second = state.select_image(image("b.png"));
    assert!(second > first);
    assert_eq!(state.status(), OperationStatus::Idle);

    let preview = state.preview().expect("preview");
    assert_eq!(preview.selection_id, second);
    assert_eq!(preview.file_name, "b.png");
}

#[test]
fn status_tracks_each_operation() {
    let mut state = StoryState::new();
    state.select_image(image("a.png"));

    let ticket = state.begin_description().expect("describe");
    assert_eq!(state.status(), OperationStatus::DescribingImage);
    assert_eq!(
        state.status().progress_text(),
        Some("Generating description...")
    );
    assert_eq!(
        state.finish_description(ticket.selection_id, Ok("desc".to_string())),
        Completion::Applied
    );
    assert_eq!(state.status(), OperationStatus::Idle);

    let ticket = state.begin_story().expect("story");
    assert_eq!(ticket.prompt, "desc");
    assert_eq!(state.status(), OperationStatus::GeneratingStory);
    state.finish_story(ticket.selection_id, Ok(story(&["p"])));

    let ticket = state.begin_narration().expect("narration");
    assert_eq!(state.status(), OperationStatus::PlayingAudio);
    assert_eq!(
        state.finish_narration(ticket.selection_id, Ok(())),
        Completion::Applied
    );
    assert_eq!(state.status(), OperationStatus::Idle);
}

#[test]
fn loading_operations_exclude_each_other() {
    let mut state = StoryState::new();
    state.select_image(image("a.png"));
    let _ticket = state.begin_description().expect("describe");

    let err = state.begin_description().expect_err("busy");
    assert_eq!(err.message(), ALREADY_IN_FLIGHT);
    assert!(state.begin_story().is_err());
    // Rejecting a busy trigger leaves the in-flight status alone.
    assert_eq!(state.status(), OperationStatus::DescribingImage);
    assert!(!state.can_describe());
}

#[test]
fn repeated_narration_triggers_issue_one_request() {
    let mut state = state_with_story();
    let ticket = state.begin_narration().expect("first trigger");
    assert_eq!(ticket.story_text, "one two");

    assert!(state.begin_narration().is_none());
    assert!(state.begin_narration().is_none());
    assert!(!state.can_narrate());

    state.finish_narration(ticket.selection_id, Ok(()));
    assert!(state.can_narrate());
}

#[test]
fn narration_without_story_is_a_silent_no_op() {
    let mut state = StoryState::new();
    state.select_image(image("a.png"));
    assert!(state.begin_narration().is_none());
    assert_eq!(state.status(), OperationStatus::Idle);
    assert!(state.error().is_none());
}

#[test]
fn failed_story_installs_nothing() {
    let mut state = StoryState::new();
    state.select_image(image("a.png"));
    let ticket = state.begin_description().expect("describe");
    state.finish_description(ticket.selection_id, Ok("desc".to_string()));

    let ticket = state.begin_story().expect("story");
    let completion = state.finish_story(
        ticket.selection_id,
        Err(StoryError::remote("story generation failed")),
    );
    assert_eq!(completion, Completion::Failed);
    assert!(state.story().is_none());
    assert_eq!(
        state.status(),
        OperationStatus::Failed("Error generating story: story generation failed".to_string())
    );

    // A retry is a user action and clears the failure.
    let _ticket = state.begin_story().expect("retry");
    assert_eq!(state.status(), OperationStatus::GeneratingStory);
}

#[test]
fn results_for_replaced_images_are_dropped() {
    let mut state = StoryState::new();
    state.select_image(image("a.png"));
    let describe = state.begin_description().expect("describe");

    state.select_image(image("b.png"));
    assert_eq!(
        state.finish_description(describe.selection_id, Ok("stale caption".to_string())),
        Completion::Stale
    );
    assert_eq!(state.description(), None);
    assert!(!state.in_flight().describing);
    assert!(state.can_describe());
}

#[test]
fn stale_story_cannot_break_the_description_chain() {
    let mut state = state_with_story();
    let ticket = state.begin_story().expect("regenerate");

    state.select_image(image("b.png"));
    let completion = state.finish_story(ticket.selection_id, Ok(story(&["stale"])));
    assert_eq!(completion, Completion::Stale);
    assert!(state.description().is_none());
    assert!(state.story().is_none());
}

#[test]
fn stale_failures_do_not_raise_errors() {
    let mut state = StoryState::new();
    state.select_image(image("a.png"));
    let ticket = state.begin_description().expect("describe");
    state.select_image(image("b.png"));

    state.finish_description(
        ticket.selection_id,
        Err(StoryError::Transport("timed out".to_string())),
    );
    assert_eq!(state.status(), OperationStatus::Idle);
}
