use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use crawler_logging::{crawler_debug, crawler_error, crawler_warn};

use crate::countdown::CountdownClock;
use crate::sink::{ChannelEventSink, EventSink};
use crate::{
    ApiCall, ApiClient, ApiError, ApiSettings, EngineError, EngineEvent, FailureKind,
    ReqwestApiClient,
};

enum EngineCommand<T> {
    Call { tag: T, call: ApiCall },
    StartCountdown { generation: u64 },
    StopCountdown,
}

/// Host-side handle to the engine thread. Calls run concurrently on a tokio
/// runtime; every call produces exactly one `CallCompleted` event.
pub struct EngineHandle<T> {
    cmd_tx: mpsc::Sender<EngineCommand<T>>,
    event_rx: mpsc::Receiver<EngineEvent<T>>,
}

impl<T: Send + 'static> EngineHandle<T> {
    pub fn new(settings: ApiSettings) -> Result<Self, EngineError> {
        let client = ReqwestApiClient::new(settings)?;
        Self::with_client(Arc::new(client), Duration::from_secs(1))
    }

    pub fn with_client(
        client: Arc<dyn ApiClient>,
        countdown_period: Duration,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand<T>>();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        thread::spawn(move || {
            let sink: Arc<dyn EventSink<T>> = Arc::new(ChannelEventSink::new(event_tx));
            let countdown = CountdownClock::new(countdown_period);
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Call { tag, call } => {
                        let client = client.clone();
                        let guard = CompletionGuard::new(tag, sink.clone());
                        runtime.spawn(run_call(client, call, guard));
                    }
                    EngineCommand::StartCountdown { generation } => {
                        countdown.start(runtime.handle(), generation, sink.clone());
                    }
                    EngineCommand::StopCountdown => countdown.stop(),
                }
            }
            crawler_debug!("engine command channel closed; shutting down");
            countdown.stop();
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn call(&self, tag: T, call: ApiCall) {
        self.send(EngineCommand::Call { tag, call });
    }

    pub fn start_countdown(&self, generation: u64) {
        self.send(EngineCommand::StartCountdown { generation });
    }

    pub fn stop_countdown(&self) {
        self.send(EngineCommand::StopCountdown);
    }

    pub fn try_recv(&self) -> Option<EngineEvent<T>> {
        self.event_rx.try_recv().ok()
    }

    fn send(&self, command: EngineCommand<T>) {
        if self.cmd_tx.send(command).is_err() {
            crawler_warn!("engine thread is gone; command dropped");
        }
    }
}

async fn run_call<T>(client: Arc<dyn ApiClient>, call: ApiCall, guard: CompletionGuard<T>) {
    crawler_debug!("{} call started", call.name());
    let started = Instant::now();
    let result = client.perform(&call).await;
    let elapsed = started.elapsed();
    match &result {
        Ok(_) => crawler_debug!("{} call finished in {:?}", call.name(), elapsed),
        Err(err) => crawler_warn!("{} call failed after {:?}: {}", call.name(), elapsed, err),
    }
    guard.complete(elapsed, result);
}

/// Reports `Abandoned` if the task is dropped before it could report.
struct CompletionGuard<T> {
    tag: Option<T>,
    started: Instant,
    sink: Arc<dyn EventSink<T>>,
}

impl<T> CompletionGuard<T> {
    fn new(tag: T, sink: Arc<dyn EventSink<T>>) -> Self {
        Self {
            tag: Some(tag),
            started: Instant::now(),
            sink,
        }
    }

    fn complete(mut self, elapsed: Duration, result: Result<crate::ApiReply, ApiError>) {
        if let Some(tag) = self.tag.take() {
            self.sink.emit(EngineEvent::CallCompleted {
                tag,
                elapsed,
                result,
            });
        }
    }
}

impl<T> Drop for CompletionGuard<T> {
    fn drop(&mut self) {
        if let Some(tag) = self.tag.take() {
            crawler_error!("call task ended without reporting a result");
            self.sink.emit(EngineEvent::CallCompleted {
                tag,
                elapsed: self.started.elapsed(),
                result: Err(ApiError::new(
                    FailureKind::Abandoned,
                    "request was abandoned",
                )),
            });
        }
    }
}
