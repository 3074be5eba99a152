use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;
use crawler_engine::{
    ApiCall, ApiClient, ApiError, ApiReply, ApiSettings, EngineEvent, EngineHandle, ExtractBody,
    ExtractReply, FailureKind, HistoryEntry, ReqwestApiClient, ScheduleBody, ScheduleEntry,
    ScheduleReply, StopAllReply,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(crawler_logging::initialize_for_tests);
}

async fn next_event<T: Send + 'static>(engine: &EngineHandle<T>) -> EngineEvent<T> {
    for _ in 0..500 {
        if let Some(event) = engine.try_recv() {
            return event;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("engine produced no event in time");
}

#[tokio::test(flavor = "multi_thread")]
async fn call_completes_with_tag_and_elapsed_time() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/extract"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"count": 42}))
                .set_delay(Duration::from_millis(50)),
        )
        .mount(&server)
        .await;

    let settings = ApiSettings::with_base_url(Url::parse(&server.uri()).unwrap());
    let engine = EngineHandle::<u64>::new(settings).unwrap();
    engine.call(
        11,
        ApiCall::Extract(ExtractBody {
            url: "https://example.com".into(),
            email: None,
        }),
    );

    match next_event(&engine).await {
        EngineEvent::CallCompleted {
            tag,
            elapsed,
            result,
        } => {
            assert_eq!(tag, 11);
            assert!(elapsed >= Duration::from_millis(50));
            assert_eq!(result, Ok(ApiReply::Extracted(ExtractReply { count: 42 })));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn countdown_commands_drive_ticks() {
    init_logging();
    let client = ReqwestApiClient::new(ApiSettings::default()).unwrap();
    let engine =
        EngineHandle::<()>::with_client(Arc::new(client), Duration::from_millis(20)).unwrap();

    engine.start_countdown(3);
    assert_eq!(
        next_event(&engine).await,
        EngineEvent::CountdownTick { generation: 3 }
    );
    engine.stop_countdown();
    tokio::time::sleep(Duration::from_millis(100)).await;
    while engine.try_recv().is_some() {}
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(engine.try_recv(), None);
}

struct PanickingClient;

#[async_trait]
impl ApiClient for PanickingClient {
    async fn extract(&self, _body: &ExtractBody) -> Result<ExtractReply, ApiError> {
        panic!("extract task crashed");
    }

    async fn history(&self, _limit: u32) -> Result<Vec<HistoryEntry>, ApiError> {
        panic!("history task crashed");
    }

    async fn register_schedule(&self, _body: &ScheduleBody) -> Result<ScheduleReply, ApiError> {
        panic!("schedule task crashed");
    }

    async fn stop_all_schedules(&self) -> Result<StopAllReply, ApiError> {
        panic!("stop-all task crashed");
    }

    async fn active_schedules(&self) -> Result<Vec<ScheduleEntry>, ApiError> {
        panic!("schedules task crashed");
    }

    async fn health(&self) -> Result<(), ApiError> {
        panic!("health task crashed");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn crashed_call_still_reports_completion() {
    init_logging();
    let engine =
        EngineHandle::<&'static str>::with_client(Arc::new(PanickingClient), Duration::from_secs(1))
            .unwrap();
    engine.call("history", ApiCall::History { limit: 10 });

    match next_event(&engine).await {
        EngineEvent::CallCompleted { tag, result, .. } => {
            assert_eq!(tag, "history");
            assert_eq!(result.unwrap_err().kind, FailureKind::Abandoned);
        }
        other => panic!("unexpected event {other:?}"),
    }
}
