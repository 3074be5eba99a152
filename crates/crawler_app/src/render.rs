use chrono::{DateTime, Local};
use crawler_core::{
    format_countdown, AppViewModel, HistoryPanelView, Notice, NoticeLevel, RecordStatus,
    ServerSchedule, SessionState, Tab,
};

pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    match view.tab {
        Tab::Manual => {
            render_manual(view, &mut out);
            render_history(&view.manual_history, &mut out);
        }
        Tab::Schedule => {
            render_schedule(view, &mut out);
            render_history(&view.schedule_history, &mut out);
        }
    }
    if !view.server_schedules.is_empty() || view.server_schedules_loading {
        render_server_schedules(view, &mut out);
    }
    out
}

pub fn notice_line(notice: &Notice, at: DateTime<Local>) -> String {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Error => "error",
    };
    format!("[{}] {tag}: {}", at.format("%H:%M:%S"), notice.message)
}

/// One-line countdown shown on each tick instead of a full redraw.
pub fn countdown_line(view: &AppViewModel) -> Option<String> {
    match view.schedule.state {
        SessionState::Active(active) => Some(format!(
            "schedule {} next run in {}",
            active.schedule_id,
            format_countdown(active.seconds_to_next_run)
        )),
        _ => None,
    }
}

fn render_manual(view: &AppViewModel, out: &mut String) {
    let manual = &view.manual;
    out.push_str("== manual extraction ==\n");
    out.push_str(&format!("url:   {}\n", or_dash(&manual.url)));
    out.push_str(&format!("email: {}\n", or_dash(&manual.email)));
    if manual.loading {
        out.push_str("extracting...\n");
    } else if let Some(result) = &manual.last_result {
        match (result.item_count(), result.error_detail()) {
            (Some(count), _) => out.push_str(&format!(
                "last run: {count} item(s) in {:.2}s\n",
                result.elapsed_seconds()
            )),
            (None, Some(detail)) => out.push_str(&format!(
                "last run failed after {:.2}s: {detail}\n",
                result.elapsed_seconds()
            )),
            (None, None) => {}
        }
    }
    if !manual.url_suggestions.is_empty() {
        out.push_str(&format!("recent: {}\n", manual.url_suggestions.join(", ")));
    }
}

fn render_schedule(view: &AppViewModel, out: &mut String) {
    let schedule = &view.schedule;
    out.push_str("== schedule ==\n");
    out.push_str(&format!("url:        {}\n", or_dash(&schedule.url)));
    out.push_str(&format!("email:      {}\n", or_dash(&schedule.email)));
    out.push_str(&format!("cadence:    {}\n", schedule.cadence));
    out.push_str(&format!(
        "continuous: {}\n",
        if schedule.continuous { "on" } else { "off" }
    ));
    let mut state = schedule.state.label().to_string();
    if let Some(id) = schedule.schedule_id {
        state.push_str(&format!(
            " (id {id}, next run in {})",
            format_countdown(schedule.seconds_to_next_run)
        ));
    }
    if schedule.registering {
        state.push_str(", registering...");
    }
    if schedule.cancelling {
        state.push_str(", stopping...");
    }
    out.push_str(&format!("state:      {state}\n"));
}

fn render_history(panel: &HistoryPanelView, out: &mut String) {
    out.push_str(&format!("-- history ({:?}) --\n", panel.panel));
    if panel.loading {
        out.push_str("loading...\n");
    }
    if panel.rows.is_empty() && !panel.loading {
        out.push_str("no records\n");
    }
    for row in &panel.rows {
        let mark = match row.status {
            RecordStatus::Success => "ok  ",
            RecordStatus::Failure => "FAIL",
        };
        out.push_str(&format!(
            "{:>5} {mark} {} {}\n",
            row.id, row.timestamp, row.url
        ));
    }
    if let Some(selected) = &panel.selected {
        let pretty = serde_json::to_string_pretty(&selected.payload)
            .unwrap_or_else(|_| selected.payload.to_string());
        out.push_str(&format!("-- record {} payload --\n{pretty}\n", selected.record_id));
    }
}

fn render_server_schedules(view: &AppViewModel, out: &mut String) {
    out.push_str("-- active schedules on the service --\n");
    if view.server_schedules_loading {
        out.push_str("loading...\n");
    }
    for row in &view.server_schedules {
        out.push_str(&server_schedule_line(row));
        out.push('\n');
    }
}

fn server_schedule_line(row: &ServerSchedule) -> String {
    format!(
        "{:>5} every {} {}{} {} -> {} (next {})",
        row.id,
        row.frequency,
        row.unit,
        if row.continuous { "" } else { " once" },
        row.url,
        row.email,
        row.next_run.as_deref().unwrap_or("-")
    )
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}
