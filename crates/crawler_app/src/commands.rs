use crawler_core::{Cadence, Msg, Tab};

/// What one console line asks the host to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Vec<Msg>),
    Help,
    Status,
    Quit,
}

pub const HELP: &str = "\
commands:
  tab manual|schedule          switch view (the other view is reset)
  url <url>                    set the target URL of the current view
  email <address>              set the report email of the current view
  extract                      run a manual extraction now
  cadence daily|weekly|<min>   schedule cadence; minutes are clamped to 1..=1440
  continuous on|off            keep running after the first run
  register                     start the schedule
  stop-all                     stop every schedule on the service
  refresh                      reload history for the current view
  show [<id>]                  inspect a record's payload (no id clears)
  schedules                    list active schedules on the service
  status                       print the current view
  quit                         exit";

pub fn parse(line: &str, current: Tab) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let panel = current.history_panel();

    let command = match word.to_ascii_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "status" => Command::Status,
        "quit" | "exit" => Command::Quit,
        "tab" => Command::Dispatch(vec![Msg::TabSelected(parse_tab(rest)?)]),
        "url" => Command::Dispatch(vec![match current {
            Tab::Manual => Msg::ExtractUrlChanged(rest.to_string()),
            Tab::Schedule => Msg::ScheduleUrlChanged(rest.to_string()),
        }]),
        "email" => Command::Dispatch(vec![match current {
            Tab::Manual => Msg::ExtractEmailChanged(rest.to_string()),
            Tab::Schedule => Msg::ScheduleEmailChanged(rest.to_string()),
        }]),
        "extract" => on_tab(current, Tab::Manual, Msg::ExtractClicked),
        "cadence" => on_tab(current, Tab::Schedule, Msg::CadenceChanged(parse_cadence(rest)?)),
        "continuous" => on_tab(
            current,
            Tab::Schedule,
            Msg::ContinuousToggled(parse_switch(rest)?),
        ),
        "register" => on_tab(current, Tab::Schedule, Msg::RegisterClicked),
        "stop-all" => on_tab(current, Tab::Schedule, Msg::CancelAllClicked),
        "refresh" => Command::Dispatch(vec![Msg::HistoryRefreshClicked(panel)]),
        "show" if rest.is_empty() => Command::Dispatch(vec![Msg::HistorySelectionCleared(panel)]),
        "show" => {
            let record_id = rest
                .parse::<i64>()
                .map_err(|_| format!("not a record id: {rest}"))?;
            Command::Dispatch(vec![Msg::HistoryRecordSelected { panel, record_id }])
        }
        "schedules" => Command::Dispatch(vec![Msg::ServerSchedulesRequested]),
        other => return Err(format!("unknown command `{other}`; type `help`")),
    };
    Ok(Some(command))
}

fn on_tab(current: Tab, wanted: Tab, msg: Msg) -> Command {
    if current == wanted {
        Command::Dispatch(vec![msg])
    } else {
        Command::Dispatch(vec![Msg::TabSelected(wanted), msg])
    }
}

fn parse_tab(raw: &str) -> Result<Tab, String> {
    match raw.to_ascii_lowercase().as_str() {
        "manual" => Ok(Tab::Manual),
        "schedule" => Ok(Tab::Schedule),
        _ => Err(format!("unknown tab `{raw}`; use manual or schedule")),
    }
}

fn parse_cadence(raw: &str) -> Result<Cadence, String> {
    match raw.to_ascii_lowercase().as_str() {
        "daily" => Ok(Cadence::Daily),
        "weekly" => Ok(Cadence::Weekly),
        minutes => minutes
            .parse::<i64>()
            .map(Cadence::custom_clamped)
            .map_err(|_| format!("cadence must be daily, weekly or minutes (got `{raw}`)")),
    }
}

fn parse_switch(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" => Ok(true),
        "off" | "no" | "false" => Ok(false),
        _ => Err(format!("expected on or off (got `{raw}`)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crawler_core::HistoryPanel;

    fn dispatch(line: &str, current: Tab) -> Vec<Msg> {
        match parse(line, current) {
            Ok(Some(Command::Dispatch(msgs))) => msgs,
            other => panic!("unexpected parse of {line:?}: {other:?}"),
        }
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse("   ", Tab::Manual), Ok(None));
    }

    #[test]
    fn form_edits_follow_the_current_tab() {
        assert_eq!(
            dispatch("url https://example.com", Tab::Manual),
            vec![Msg::ExtractUrlChanged("https://example.com".into())]
        );
        assert_eq!(
            dispatch("email ops@example.com", Tab::Schedule),
            vec![Msg::ScheduleEmailChanged("ops@example.com".into())]
        );
    }

    #[test]
    fn workflow_commands_switch_tabs_first() {
        assert_eq!(
            dispatch("register", Tab::Manual),
            vec![Msg::TabSelected(Tab::Schedule), Msg::RegisterClicked]
        );
        assert_eq!(dispatch("extract", Tab::Manual), vec![Msg::ExtractClicked]);
        assert_eq!(
            dispatch("extract", Tab::Schedule),
            vec![Msg::TabSelected(Tab::Manual), Msg::ExtractClicked]
        );
    }

    #[test]
    fn cadence_minutes_are_clamped() {
        assert_eq!(
            dispatch("cadence 0", Tab::Schedule),
            vec![Msg::CadenceChanged(Cadence::Custom { minutes: 1 })]
        );
        assert_eq!(
            dispatch("cadence 5000", Tab::Schedule),
            vec![Msg::CadenceChanged(Cadence::Custom { minutes: 1440 })]
        );
        assert_eq!(
            dispatch("cadence Weekly", Tab::Schedule),
            vec![Msg::CadenceChanged(Cadence::Weekly)]
        );
        assert!(parse("cadence hourly", Tab::Schedule).is_err());
    }

    #[test]
    fn show_targets_the_current_panel() {
        assert_eq!(
            dispatch("show 12", Tab::Schedule),
            vec![Msg::HistoryRecordSelected {
                panel: HistoryPanel::Schedule,
                record_id: 12
            }]
        );
        assert_eq!(
            dispatch("show", Tab::Manual),
            vec![Msg::HistorySelectionCleared(HistoryPanel::Manual)]
        );
        assert!(parse("show twelve", Tab::Manual).is_err());
    }

    #[test]
    fn host_commands_and_unknown_words() {
        assert_eq!(parse("quit", Tab::Manual), Ok(Some(Command::Quit)));
        assert_eq!(parse("STATUS", Tab::Manual), Ok(Some(Command::Status)));
        assert!(parse("launch", Tab::Manual).is_err());
        assert!(parse("continuous maybe", Tab::Schedule).is_err());
    }
}
