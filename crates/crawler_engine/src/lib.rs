//! Crawler engine: HTTP client for the scraping service plus the countdown
//! ticker, driven from a dedicated runtime thread.
mod client;
mod countdown;
mod engine;
mod settings;
mod sink;
mod types;
mod wire;

pub use client::{ApiClient, ReqwestApiClient};
pub use countdown::CountdownClock;
pub use engine::EngineHandle;
pub use settings::{ApiSettings, DEFAULT_BASE_URL};
pub use sink::{ChannelEventSink, EventSink};
pub use types::{ApiCall, ApiError, ApiReply, EngineError, EngineEvent, FailureKind};
pub use wire::{
    ExtractBody, ExtractReply, HistoryEntry, ScheduleBody, ScheduleEntry, ScheduleReply,
    StopAllReply, WireUnit,
};
