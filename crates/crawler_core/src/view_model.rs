use crate::{
    Cadence, ExtractionResult, HistoryPanel, PayloadInspection, RecordStatus, ServerSchedule,
    SessionState, Tab,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub tab: Tab,
    pub manual: ManualView,
    pub schedule: ScheduleView,
    pub manual_history: HistoryPanelView,
    pub schedule_history: HistoryPanelView,
    pub server_schedules: Vec<ServerSchedule>,
    pub server_schedules_loading: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualView {
    pub url: String,
    pub email: String,
    /// While set, the submit trigger is disabled.
    pub loading: bool,
    pub last_result: Option<ExtractionResult>,
    pub url_suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleView {
    pub url: String,
    pub email: String,
    pub cadence: Cadence,
    pub continuous: bool,
    pub state: SessionState,
    pub schedule_id: Option<i64>,
    /// Local estimate only.
    pub seconds_to_next_run: u64,
    pub registering: bool,
    pub cancelling: bool,
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPanelView {
    pub panel: HistoryPanel,
    pub loading: bool,
    pub rows: Vec<HistoryRowView>,
    pub selected: Option<PayloadInspection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRowView {
    pub id: i64,
    pub url: String,
    pub timestamp: String,
    pub status: RecordStatus,
}

/// `HH:MM:SS`, with hours allowed past 99 for weekly cadences.
pub fn format_countdown(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::format_countdown;

    #[test]
    fn countdown_formats_as_clock() {
        assert_eq!(format_countdown(0), "00:00:00");
        assert_eq!(format_countdown(720), "00:12:00");
        assert_eq!(format_countdown(86_400), "24:00:00");
        assert_eq!(format_countdown(604_799), "167:59:59");
    }
}
