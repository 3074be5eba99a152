use crate::view_model::{
    AppViewModel, HistoryPanelView, HistoryRowView, ManualView, ScheduleView,
};
use crate::{ExtractionSubmitter, HistoryPanel, HistoryView, ScheduleSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Manual,
    Schedule,
}

impl Tab {
    pub fn history_panel(self) -> HistoryPanel {
        match self {
            Tab::Manual => HistoryPanel::Manual,
            Tab::Schedule => HistoryPanel::Schedule,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Operator-facing notification, drained by the host after each update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Active schedule as the service reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSchedule {
    pub id: i64,
    pub url: String,
    pub email: String,
    pub frequency: u32,
    pub unit: String,
    pub continuous: bool,
    pub next_run: Option<String>,
    pub last_run: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ServerScheduleList {
    pub(crate) rows: Vec<ServerSchedule>,
    pub(crate) last_request: u64,
    pub(crate) loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub(crate) tab: Tab,
    pub(crate) submitter: ExtractionSubmitter,
    pub(crate) schedule: ScheduleSession,
    pub(crate) manual_history: HistoryView,
    pub(crate) schedule_history: HistoryView,
    pub(crate) server_schedules: ServerScheduleList,
    pub(crate) notices: Vec<Notice>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            tab: Tab::default(),
            submitter: ExtractionSubmitter::default(),
            schedule: ScheduleSession::default(),
            manual_history: HistoryView::new(HistoryPanel::Manual),
            schedule_history: HistoryView::new(HistoryPanel::Schedule),
            server_schedules: ServerScheduleList::default(),
            notices: Vec::new(),
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn submitter(&self) -> &ExtractionSubmitter {
        &self.submitter
    }

    pub fn schedule(&self) -> &ScheduleSession {
        &self.schedule
    }

    pub fn history(&self, panel: HistoryPanel) -> &HistoryView {
        match panel {
            HistoryPanel::Manual => &self.manual_history,
            HistoryPanel::Schedule => &self.schedule_history,
        }
    }

    pub(crate) fn history_mut(&mut self, panel: HistoryPanel) -> &mut HistoryView {
        match panel {
            HistoryPanel::Manual => &mut self.manual_history,
            HistoryPanel::Schedule => &mut self.schedule_history,
        }
    }

    pub fn server_schedules(&self) -> &[ServerSchedule] {
        &self.server_schedules.rows
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Hands queued notices to the host; each is delivered once.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn view(&self) -> AppViewModel {
        let submitter = &self.submitter;
        let schedule = &self.schedule;
        AppViewModel {
            tab: self.tab,
            manual: ManualView {
                url: submitter.url().to_string(),
                email: submitter.email().to_string(),
                loading: submitter.is_loading(),
                last_result: submitter.last_result().cloned(),
                url_suggestions: self.manual_history.url_suggestions(),
            },
            schedule: ScheduleView {
                url: schedule.url().to_string(),
                email: schedule.email().to_string(),
                cadence: schedule.cadence(),
                continuous: schedule.continuous(),
                state: schedule.state(),
                schedule_id: schedule.schedule_id(),
                seconds_to_next_run: schedule.seconds_to_next_run(),
                registering: schedule.is_registering(),
                cancelling: schedule.is_cancelling(),
                locked: schedule.is_locked(),
            },
            manual_history: panel_view(&self.manual_history),
            schedule_history: panel_view(&self.schedule_history),
            server_schedules: self.server_schedules.rows.clone(),
            server_schedules_loading: self.server_schedules.loading,
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
        self.dirty = true;
    }
}

fn panel_view(history: &HistoryView) -> HistoryPanelView {
    HistoryPanelView {
        panel: history.panel(),
        loading: history.is_loading(),
        rows: history
            .records()
            .iter()
            .map(|record| HistoryRowView {
                id: record.id,
                url: record.url.clone(),
                timestamp: record.timestamp.clone(),
                status: record.status,
            })
            .collect(),
        selected: history.selected().cloned(),
    }
}
