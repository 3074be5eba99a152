use std::sync::{Arc, Mutex};
use std::time::Duration;

use crawler_logging::crawler_debug;
use tokio::runtime::Handle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, EventSink};

/// One-second ticker behind the schedule countdown. At most one ticker runs;
/// starting a new one cancels the previous one first.
pub struct CountdownClock {
    period: Duration,
    running: Mutex<Option<Running>>,
}

struct Running {
    generation: u64,
    token: CancellationToken,
}

impl Default for CountdownClock {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl CountdownClock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            running: Mutex::new(None),
        }
    }

    pub fn start<T: Send + 'static>(
        &self,
        runtime: &Handle,
        generation: u64,
        sink: Arc<dyn EventSink<T>>,
    ) {
        let token = CancellationToken::new();
        if let Some(previous) = self.swap(Some(Running {
            generation,
            token: token.clone(),
        })) {
            previous.token.cancel();
        }
        crawler_debug!("countdown started for generation {}", generation);

        let period = self.period;
        runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => sink.emit(EngineEvent::CountdownTick { generation }),
                }
            }
        });
    }

    pub fn stop(&self) {
        if let Some(previous) = self.swap(None) {
            previous.token.cancel();
            crawler_debug!("countdown stopped for generation {}", previous.generation);
        }
    }

    pub fn running_generation(&self) -> Option<u64> {
        self.lock().as_ref().map(|running| running.generation)
    }

    fn swap(&self, next: Option<Running>) -> Option<Running> {
        std::mem::replace(&mut *self.lock(), next)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Running>> {
        // A poisoned lock only means another thread panicked mid-swap; the
        // slot itself is still a valid Option.
        self.running
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for CountdownClock {
    fn drop(&mut self) {
        self.stop();
    }
}
