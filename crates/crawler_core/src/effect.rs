use crate::{ExtractionRequest, HistoryPanel, ScheduleRegistration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitExtraction {
        attempt: u64,
        request: ExtractionRequest,
    },
    FetchHistory {
        panel: HistoryPanel,
        request: u64,
        limit: u32,
    },
    RegisterSchedule {
        generation: u64,
        registration: ScheduleRegistration,
    },
    CancelAllSchedules {
        generation: u64,
    },
    /// Replace any running countdown with a one-second ticker for `generation`.
    StartCountdown {
        generation: u64,
    },
    StopCountdown,
    FetchServerSchedules {
        request: u64,
    },
}
