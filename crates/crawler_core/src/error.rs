use thiserror::Error;

/// Input problems caught before anything is sent to the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a target URL is required")]
    MissingUrl,
    #[error("a report email is required")]
    MissingEmail,
    #[error("custom interval must be between 1 and 1440 minutes (got {minutes})")]
    CadenceOutOfRange { minutes: u32 },
    #[error("the schedule is registered; stop it before editing")]
    SessionLocked,
    #[error("a request for this workflow is already running")]
    SubmissionInFlight,
    #[error("no history record with id {id}")]
    UnknownRecord { id: i64 },
}

/// Every failure a workflow can surface to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No response was received at all.
    #[error("connection error: {0}")]
    Transport(String),
    /// The service answered with a non-2xx status; `detail` is shown verbatim.
    #[error("{detail}")]
    Application { status: u16, detail: String },
    #[error("stored payload is not valid JSON: {0}")]
    MalformedPayload(String),
}

impl ClientError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}
