use std::time::Duration;

use crate::{Cadence, ClientError, HistoryPanel, HistoryRecord, ServerSchedule, Tab};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Host finished setting up; mounts the initial tab.
    AppStarted,
    /// User switched tabs; the previous tab's workflow is unmounted.
    TabSelected(Tab),

    /// User edited the manual extraction URL.
    ExtractUrlChanged(String),
    /// User edited the manual extraction notification email.
    ExtractEmailChanged(String),
    /// User clicked Start Extraction.
    ExtractClicked,
    /// Engine completion for an extraction attempt.
    ExtractionFinished {
        attempt: u64,
        elapsed: Duration,
        result: Result<u32, ClientError>,
    },

    ScheduleUrlChanged(String),
    ScheduleEmailChanged(String),
    CadenceChanged(Cadence),
    ContinuousToggled(bool),
    /// User clicked Start Schedule.
    RegisterClicked,
    /// Engine completion for a registration; `Ok` carries the schedule id.
    RegistrationFinished {
        generation: u64,
        result: Result<i64, ClientError>,
    },
    /// User clicked Stop All.
    CancelAllClicked,
    /// Engine completion for stop-all; `Ok` carries the stopped count.
    CancelAllFinished {
        generation: u64,
        result: Result<u64, ClientError>,
    },
    /// One second elapsed on the countdown started for `generation`.
    CountdownTick { generation: u64 },

    /// User asked for fresh history on a panel.
    HistoryRefreshClicked(HistoryPanel),
    /// Engine completion for a history fetch.
    HistoryLoaded {
        panel: HistoryPanel,
        request: u64,
        result: Result<Vec<HistoryRecord>, ClientError>,
    },
    /// User selected a history record for payload inspection.
    HistoryRecordSelected { panel: HistoryPanel, record_id: i64 },
    HistorySelectionCleared(HistoryPanel),

    /// User asked for the service's list of active schedules.
    ServerSchedulesRequested,
    ServerSchedulesLoaded {
        request: u64,
        result: Result<Vec<ServerSchedule>, ClientError>,
    },
    /// Fallback for placeholder wiring.
    NoOp,
}
