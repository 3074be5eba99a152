use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::wire::{ExtractReply, HistoryEntry, ScheduleEntry, ScheduleReply, StopAllReply};
use crate::{ExtractBody, ScheduleBody};

/// A single request against the scraping service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Extract(ExtractBody),
    History { limit: u32 },
    RegisterSchedule(ScheduleBody),
    StopAllSchedules,
    ActiveSchedules,
    Health,
}

impl ApiCall {
    pub fn name(&self) -> &'static str {
        match self {
            ApiCall::Extract(_) => "extract",
            ApiCall::History { .. } => "history",
            ApiCall::RegisterSchedule(_) => "schedule",
            ApiCall::StopAllSchedules => "stop-all",
            ApiCall::ActiveSchedules => "schedules",
            ApiCall::Health => "health",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiReply {
    Extracted(ExtractReply),
    History(Vec<HistoryEntry>),
    Registered(ScheduleReply),
    Stopped(StopAllReply),
    ActiveSchedules(Vec<ScheduleEntry>),
    Healthy,
}

/// Events reported back to the host. `T` is the caller's correlation tag,
/// returned untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent<T> {
    CallCompleted {
        tag: T,
        /// Wall-clock time from just before sending to the reply (or failure).
        elapsed: Duration,
        result: Result<ApiReply, ApiError>,
    },
    CountdownTick {
        generation: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// True when no response was received at all.
    pub fn is_transport(&self) -> bool {
        !matches!(self.kind, FailureKind::HttpStatus(_) | FailureKind::Decode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Timeout,
    Network,
    /// Non-2xx reply; the message is the service's `detail`.
    HttpStatus(u16),
    /// 2xx reply whose body does not match the contract.
    Decode,
    /// The task carrying the call ended before producing a result.
    Abandoned,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Decode => write!(f, "unreadable reply"),
            FailureKind::Abandoned => write!(f, "abandoned"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build http client: {0}")]
    Client(#[from] ApiError),
}
