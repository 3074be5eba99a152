//! Crawler core: pure state machines for the extraction, schedule and history
//! workflows of the crawler console, plus view-model helpers.
mod cadence;
mod effect;
mod error;
mod extraction;
mod history;
mod msg;
mod schedule;
mod state;
mod update;
mod view_model;

pub use cadence::{
    Cadence, CadenceUnit, NormalizedCadence, MAX_CUSTOM_MINUTES, MIN_CUSTOM_MINUTES,
};
pub use effect::Effect;
pub use error::{ClientError, ValidationError};
pub use extraction::{ExtractionOutcome, ExtractionRequest, ExtractionResult, ExtractionSubmitter};
pub use history::{HistoryPanel, HistoryRecord, HistoryView, PayloadInspection, RecordStatus};
pub use msg::Msg;
pub use schedule::{ActiveSchedule, ScheduleRegistration, ScheduleSession, SessionState};
pub use state::{AppState, Notice, NoticeLevel, ServerSchedule, Tab};
pub use update::update;
pub use view_model::{
    format_countdown, AppViewModel, HistoryPanelView, HistoryRowView, ManualView, ScheduleView,
};
