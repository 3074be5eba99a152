use crawler_core::{
    CadenceUnit, ClientError, Effect, HistoryPanel, HistoryRecord, Msg, RecordStatus,
    ServerSchedule,
};
use crawler_engine::{
    ApiCall, ApiError, ApiReply, ApiSettings, EngineError, EngineEvent, EngineHandle, ExtractBody,
    FailureKind, HistoryEntry, ScheduleBody, ScheduleEntry, WireUnit,
};
use crawler_logging::{crawler_info, crawler_warn};

/// Correlates an engine call with the workflow token that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTag {
    Extraction { attempt: u64 },
    History { panel: HistoryPanel, request: u64 },
    Registration { generation: u64 },
    CancelAll { generation: u64 },
    ServerSchedules { request: u64 },
    Health,
}

pub struct EffectRunner {
    engine: EngineHandle<CallTag>,
}

impl EffectRunner {
    pub fn new(settings: ApiSettings) -> Result<Self, EngineError> {
        Ok(Self {
            engine: EngineHandle::new(settings)?,
        })
    }

    pub fn ping(&self) {
        self.engine.call(CallTag::Health, ApiCall::Health);
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitExtraction { attempt, request } => {
                    self.engine.call(
                        CallTag::Extraction { attempt },
                        ApiCall::Extract(ExtractBody {
                            url: request.url,
                            email: request.notify_email,
                        }),
                    );
                }
                Effect::FetchHistory {
                    panel,
                    request,
                    limit,
                } => {
                    self.engine
                        .call(CallTag::History { panel, request }, ApiCall::History { limit });
                }
                Effect::RegisterSchedule {
                    generation,
                    registration,
                } => {
                    self.engine.call(
                        CallTag::Registration { generation },
                        ApiCall::RegisterSchedule(ScheduleBody {
                            frequency: registration.cadence.quantity,
                            unit: map_unit(registration.cadence.unit),
                            email: registration.email,
                            url: registration.url,
                            is_continuous: registration.continuous,
                        }),
                    );
                }
                Effect::CancelAllSchedules { generation } => {
                    self.engine
                        .call(CallTag::CancelAll { generation }, ApiCall::StopAllSchedules);
                }
                Effect::StartCountdown { generation } => self.engine.start_countdown(generation),
                Effect::StopCountdown => self.engine.stop_countdown(),
                Effect::FetchServerSchedules { request } => {
                    self.engine
                        .call(CallTag::ServerSchedules { request }, ApiCall::ActiveSchedules);
                }
            }
        }
    }

    /// Next engine event translated into a message, if one is waiting.
    pub fn poll(&self) -> Option<Msg> {
        self.engine.try_recv().and_then(to_msg)
    }
}

fn map_unit(unit: CadenceUnit) -> WireUnit {
    match unit {
        CadenceUnit::Minutes => WireUnit::Minutes,
        CadenceUnit::Days => WireUnit::Days,
    }
}

/// Health replies are logged here and never reach the core.
fn to_msg(event: EngineEvent<CallTag>) -> Option<Msg> {
    let (tag, elapsed, result) = match event {
        EngineEvent::CountdownTick { generation } => {
            return Some(Msg::CountdownTick { generation })
        }
        EngineEvent::CallCompleted {
            tag,
            elapsed,
            result,
        } => (tag, elapsed, result),
    };

    let msg = match tag {
        CallTag::Extraction { attempt } => Msg::ExtractionFinished {
            attempt,
            elapsed,
            result: reply(result, |reply| match reply {
                ApiReply::Extracted(body) => Some(body.count),
                _ => None,
            }),
        },
        CallTag::History { panel, request } => Msg::HistoryLoaded {
            panel,
            request,
            result: reply(result, |reply| match reply {
                ApiReply::History(entries) => {
                    Some(entries.into_iter().map(map_history).collect())
                }
                _ => None,
            }),
        },
        CallTag::Registration { generation } => Msg::RegistrationFinished {
            generation,
            result: reply(result, |reply| match reply {
                ApiReply::Registered(body) => Some(body.schedule_id),
                _ => None,
            }),
        },
        CallTag::CancelAll { generation } => Msg::CancelAllFinished {
            generation,
            result: reply(result, |reply| match reply {
                ApiReply::Stopped(body) => Some(body.count),
                _ => None,
            }),
        },
        CallTag::ServerSchedules { request } => Msg::ServerSchedulesLoaded {
            request,
            result: reply(result, |reply| match reply {
                ApiReply::ActiveSchedules(rows) => {
                    Some(rows.into_iter().map(map_schedule).collect())
                }
                _ => None,
            }),
        },
        CallTag::Health => {
            match result {
                Ok(_) => crawler_info!("scraping service is reachable ({:?})", elapsed),
                Err(err) => crawler_warn!("scraping service is not reachable: {}", err),
            }
            return None;
        }
    };
    Some(msg)
}

fn reply<V>(
    result: Result<ApiReply, ApiError>,
    pick: impl FnOnce(ApiReply) -> Option<V>,
) -> Result<V, ClientError> {
    let body = result.map_err(map_error)?;
    pick(body).ok_or_else(|| ClientError::Transport("unreadable reply: unexpected body".into()))
}

pub(crate) fn map_error(err: ApiError) -> ClientError {
    match err.kind {
        FailureKind::HttpStatus(status) => ClientError::Application {
            status,
            detail: err.message,
        },
        FailureKind::InvalidUrl
        | FailureKind::Timeout
        | FailureKind::Network
        | FailureKind::Decode
        | FailureKind::Abandoned => ClientError::Transport(err.to_string()),
    }
}

fn map_history(entry: HistoryEntry) -> HistoryRecord {
    HistoryRecord {
        id: entry.id,
        url: entry.url,
        topic: entry.topic.unwrap_or_default(),
        summary: entry.summary.unwrap_or_default(),
        data_payload: entry.data_json.unwrap_or_default(),
        timestamp: entry.timestamp,
        status: RecordStatus::from_wire(entry.status.as_deref().unwrap_or_default()),
    }
}

fn map_schedule(entry: ScheduleEntry) -> ServerSchedule {
    ServerSchedule {
        id: entry.id,
        url: entry.url,
        email: entry.email,
        frequency: entry.frequency_days,
        // Rows written before units existed are day-based.
        unit: entry.unit.unwrap_or_else(|| "days".to_string()),
        continuous: entry.is_continuous,
        next_run: entry.next_run,
        last_run: entry.last_run,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn api_error(kind: FailureKind, message: &str) -> ApiError {
        ApiError {
            kind,
            message: message.to_string(),
        }
    }

    #[test]
    fn http_status_keeps_service_detail() {
        let mapped = map_error(api_error(
            FailureKind::HttpStatus(500),
            "Extraction Failed: upstream returned 403",
        ));
        assert_eq!(
            mapped,
            ClientError::Application {
                status: 500,
                detail: "Extraction Failed: upstream returned 403".into(),
            }
        );
        assert_eq!(mapped.to_string(), "Extraction Failed: upstream returned 403");
    }

    #[test]
    fn transport_failures_are_labelled() {
        for kind in [
            FailureKind::Timeout,
            FailureKind::Network,
            FailureKind::InvalidUrl,
            FailureKind::Abandoned,
        ] {
            let mapped = map_error(api_error(kind, "boom"));
            assert!(mapped.is_transport());
            assert!(mapped.to_string().starts_with("connection error: "));
        }
        let decode = map_error(api_error(FailureKind::Decode, "expected value"));
        assert_eq!(
            decode.to_string(),
            "connection error: unreadable reply: expected value"
        );
    }

    #[test]
    fn countdown_ticks_pass_through() {
        assert_eq!(
            to_msg(EngineEvent::CountdownTick { generation: 5 }),
            Some(Msg::CountdownTick { generation: 5 })
        );
    }

    #[test]
    fn history_entries_map_to_records() {
        let msg = to_msg(EngineEvent::CallCompleted {
            tag: CallTag::History {
                panel: HistoryPanel::Schedule,
                request: 2,
            },
            elapsed: Duration::from_millis(12),
            result: Ok(ApiReply::History(vec![HistoryEntry {
                id: 4,
                url: "https://a.example".into(),
                topic: Some("Auto-CSS".into()),
                summary: None,
                data_json: None,
                timestamp: "2025-01-01T10:00:00".into(),
                status: Some("scheduled_success".into()),
            }])),
        });
        let Some(Msg::HistoryLoaded {
            panel,
            request,
            result: Ok(records),
        }) = msg
        else {
            panic!("unexpected message {msg:?}");
        };
        assert_eq!(panel, HistoryPanel::Schedule);
        assert_eq!(request, 2);
        assert_eq!(records[0].status, RecordStatus::Success);
        assert_eq!(records[0].data_payload, "");
        assert_eq!(records[0].summary, "");
    }

    #[test]
    fn health_replies_produce_no_message() {
        let msg = to_msg(EngineEvent::CallCompleted {
            tag: CallTag::Health,
            elapsed: Duration::from_millis(3),
            result: Ok(ApiReply::Healthy),
        });
        assert_eq!(msg, None);
    }

    #[test]
    fn schedule_rows_default_to_days() {
        let row = map_schedule(ScheduleEntry {
            id: 1,
            url: "https://example.com".into(),
            email: "ops@example.com".into(),
            frequency_days: 7,
            unit: None,
            is_continuous: true,
            next_run: None,
            last_run: None,
        });
        assert_eq!(row.unit, "days");
        assert_eq!(row.frequency, 7);
    }

    mod end_to_end {
        use std::sync::Once;

        use crawler_core::{update, AppState, Effect};
        use pretty_assertions::assert_eq;
        use serde_json::json;
        use url::Url;
        use wiremock::matchers::{body_json, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        use super::*;

        static INIT: Once = Once::new();

        fn runner_for(server: &MockServer) -> EffectRunner {
            INIT.call_once(crawler_logging::initialize_for_tests);
            let base = Url::parse(&server.uri()).unwrap();
            EffectRunner::new(ApiSettings::with_base_url(base)).unwrap()
        }

        async fn next_msg(runner: &EffectRunner) -> Msg {
            for _ in 0..500 {
                if let Some(msg) = runner.poll() {
                    return msg;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            panic!("no engine reply in time");
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn empty_url_never_reaches_the_service() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/extract"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 1})))
                .expect(0)
                .mount(&server)
                .await;
            let runner = runner_for(&server);

            let (state, effects) = update(AppState::new(), Msg::ExtractUrlChanged("   ".into()));
            runner.enqueue(effects);
            let (state, effects) = update(state, Msg::ExtractClicked);
            assert_eq!(effects, Vec::new());
            assert!(!state.submitter().is_loading());
            runner.enqueue(effects);

            tokio::time::sleep(Duration::from_millis(100)).await;
            assert_eq!(runner.poll(), None);
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn extraction_round_trip_updates_the_submitter() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/extract"))
                .and(body_json(json!({"url": "https://example.com"})))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 42})))
                .expect(1)
                .mount(&server)
                .await;
            let runner = runner_for(&server);

            let (state, _) = update(
                AppState::new(),
                Msg::ExtractUrlChanged("https://example.com".into()),
            );
            let (state, effects) = update(state, Msg::ExtractClicked);
            assert!(state.submitter().is_loading());
            runner.enqueue(effects);

            let reply = next_msg(&runner).await;
            let (state, effects) = update(state, reply);
            assert!(!state.submitter().is_loading());
            let result = state.submitter().last_result().unwrap();
            assert_eq!(result.item_count(), Some(42));
            assert!(matches!(
                effects.as_slice(),
                [Effect::FetchHistory {
                    panel: HistoryPanel::Manual,
                    limit: 10,
                    ..
                }]
            ));
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn service_detail_reaches_the_notice_queue() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/schedule"))
                .respond_with(
                    ResponseTemplate::new(500)
                        .set_body_json(json!({"detail": "Scheduling Failed: db locked"})),
                )
                .mount(&server)
                .await;
            let runner = runner_for(&server);

            let (state, _) = update(AppState::new(), Msg::TabSelected(crawler_core::Tab::Schedule));
            let (state, _) = update(state, Msg::ScheduleUrlChanged("https://example.com".into()));
            let (state, _) = update(state, Msg::ScheduleEmailChanged("ops@example.com".into()));
            let (state, effects) = update(state, Msg::RegisterClicked);
            runner.enqueue(effects);

            let reply = next_msg(&runner).await;
            let (mut state, effects) = update(state, reply);
            assert_eq!(effects, Vec::new());
            let notices = state.take_notices();
            assert_eq!(notices.len(), 1);
            assert_eq!(
                notices[0].message,
                "schedule registration failed: Scheduling Failed: db locked"
            );
        }
    }
}
