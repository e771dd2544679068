//! Fetch controller state machine, driven through a scripted source instead
//! of a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use homewatch::fetch::{DatapointSource, FetchController, FetchError, LoadState};
use homewatch::index::Datapoint;

fn dp(code: &str) -> Datapoint {
    Datapoint { date_time: code.to_string(), dav_key: String::new() }
}

#[derive(Default)]
struct Script {
    responses: VecDeque<Result<Vec<Datapoint>, FetchError>>,
    calls: Vec<(String, u32)>,
}

#[derive(Clone, Default)]
struct ScriptedSource {
    script: Arc<Mutex<Script>>,
}

impl ScriptedSource {
    fn push(&self, response: Result<Vec<Datapoint>, FetchError>) {
        self.script.lock().unwrap().responses.push_back(response);
    }

    fn calls(&self) -> Vec<(String, u32)> {
        self.script.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl DatapointSource for ScriptedSource {
    async fn fetch_datapoints(
        &self,
        camera: &str,
        pages: u32,
    ) -> Result<Vec<Datapoint>, FetchError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push((camera.to_string(), pages));
        script.responses.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[tokio::test]
async fn successful_load_builds_index() {
    let source = ScriptedSource::default();
    source.push(Ok(vec![dp("20240101120500"), dp("20240102000000")]));
    let mut controller = FetchController::new(Box::new(source.clone()));

    controller.load_page("Porch").await;

    assert_eq!(*controller.state(), LoadState::Loaded);
    assert_eq!(controller.index().len(), 2);
    assert_eq!(controller.index().date_set(), ["20240102", "20240101"]);
    assert_eq!(source.calls(), [("Porch".to_string(), 1)]);
}

#[tokio::test]
async fn server_error_surfaces_decoded_message() {
    let source = ScriptedSource::default();
    source.push(Err(FetchError::RetrievalFailure { status: 500, message: "boom".to_string() }));
    let mut controller = FetchController::new(Box::new(source));

    controller.load_page("Porch").await;

    assert_eq!(*controller.state(), LoadState::LoadingError { message: "boom".to_string() });
}

#[tokio::test]
async fn auth_failure_is_suppressed() {
    let source = ScriptedSource::default();
    source.push(Err(FetchError::AuthRequired { status: 403 }));
    let mut controller = FetchController::new(Box::new(source));

    controller.load_page("Porch").await;

    // Never LoadingError; the controller sits in Loading for a higher layer
    // to redirect.
    assert_eq!(*controller.state(), LoadState::Loading);
    assert!(controller.index().is_empty());
}

#[tokio::test]
async fn auth_failure_keeps_previous_index() {
    let source = ScriptedSource::default();
    source.push(Ok(vec![dp("20240101120500")]));
    source.push(Err(FetchError::AuthRequired { status: 401 }));
    let mut controller = FetchController::new(Box::new(source));

    controller.load_page("Porch").await;
    assert_eq!(*controller.state(), LoadState::Loaded);

    controller.load_page("Porch").await;
    assert_eq!(controller.index().len(), 1);
    assert_eq!(*controller.state(), LoadState::Loading);
}

#[tokio::test]
async fn window_extends_and_narrows_with_floor() {
    let source = ScriptedSource::default();
    let mut controller = FetchController::new(Box::new(source.clone()));

    controller.load_page("Porch").await;
    controller.extend_window("Porch").await;
    controller.extend_window("Porch").await;
    assert_eq!(controller.page_window(), 3);

    controller.narrow_window("Porch").await;
    controller.narrow_window("Porch").await;
    assert_eq!(controller.page_window(), 1);

    // Already at the floor: no decrement and no reload.
    controller.narrow_window("Porch").await;
    assert_eq!(controller.page_window(), 1);

    let pages: Vec<u32> = source.calls().iter().map(|(_, p)| *p).collect();
    assert_eq!(pages, [1, 2, 3, 2, 1]);
}

#[tokio::test]
async fn stale_completion_is_discarded() {
    let source = ScriptedSource::default();
    let mut controller = FetchController::new(Box::new(source));

    let first = controller.begin_load();
    let second = controller.begin_load();

    // The superseded request completes late; its result must not land.
    controller.complete_load(first, Ok(vec![dp("20240101120500")]));
    assert_eq!(*controller.state(), LoadState::Loading);
    assert!(controller.index().is_empty());

    controller.complete_load(second, Ok(vec![dp("20240102000000")]));
    assert_eq!(*controller.state(), LoadState::Loaded);
    assert_eq!(controller.index().date_set(), ["20240102"]);
}

#[tokio::test]
async fn failed_then_successful_reload_recovers() {
    let source = ScriptedSource::default();
    source.push(Err(FetchError::Transport { detail: "connection refused".to_string() }));
    source.push(Ok(vec![dp("20240101120500")]));
    let mut controller = FetchController::new(Box::new(source));

    controller.load_page("Porch").await;
    assert!(matches!(controller.state(), LoadState::LoadingError { .. }));

    // No automatic retry; the next user action re-attempts.
    controller.load_page("Porch").await;
    assert_eq!(*controller.state(), LoadState::Loaded);
    assert_eq!(controller.index().len(), 1);
}
