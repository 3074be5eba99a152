use crawler_logging::{crawler_info, crawler_stale, crawler_warn};

use crate::extraction::ExtractionOutcome;
use crate::schedule::{CancelOutcome, RegistrationOutcome, TickOutcome};
use crate::view_model::format_countdown;
use crate::{AppState, ClientError, Effect, HistoryPanel, Msg, NoticeLevel, Tab};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::AppStarted => {
            let panel = state.tab.history_panel();
            vec![refresh_history(&mut state, panel)]
        }
        Msg::TabSelected(tab) => {
            if tab == state.tab {
                return (state, Vec::new());
            }
            let previous = state.tab;
            let mut effects = unmount(&mut state, previous);
            state.tab = tab;
            state.mark_dirty();
            effects.push(refresh_history(&mut state, tab.history_panel()));
            effects
        }

        Msg::ExtractUrlChanged(url) => {
            state.submitter.set_url(url);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ExtractEmailChanged(email) => {
            state.submitter.set_email(email);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ExtractClicked => match state.submitter.begin() {
            Ok((attempt, request)) => {
                crawler_info!("extraction attempt {} for {}", attempt, request.url);
                state.mark_dirty();
                vec![Effect::SubmitExtraction { attempt, request }]
            }
            Err(err) => {
                report(&mut state, "extraction not started", err.into());
                Vec::new()
            }
        },
        Msg::ExtractionFinished {
            attempt,
            elapsed,
            result,
        } => {
            let finished = state.submitter.finish(attempt, elapsed, result).cloned();
            let Some(finished) = finished else {
                return (state, Vec::new());
            };
            let secs = finished.elapsed_seconds();
            match finished.outcome {
                ExtractionOutcome::Items(count) => {
                    state.notify(
                        NoticeLevel::Info,
                        format!("extraction succeeded: {count} item(s) in {secs:.2}s"),
                    );
                    vec![refresh_history(&mut state, HistoryPanel::Manual)]
                }
                ExtractionOutcome::Failed(err) => {
                    report(
                        &mut state,
                        &format!("extraction failed after {secs:.2}s"),
                        err,
                    );
                    Vec::new()
                }
            }
        }

        Msg::ScheduleUrlChanged(url) => {
            let result = state.schedule.set_url(url);
            form_edit(&mut state, result)
        }
        Msg::ScheduleEmailChanged(email) => {
            let result = state.schedule.set_email(email);
            form_edit(&mut state, result)
        }
        Msg::CadenceChanged(cadence) => {
            let result = state.schedule.set_cadence(cadence);
            form_edit(&mut state, result)
        }
        Msg::ContinuousToggled(continuous) => {
            let result = state.schedule.set_continuous(continuous);
            form_edit(&mut state, result)
        }
        Msg::RegisterClicked => match state.schedule.begin_registration() {
            Ok((generation, registration)) => {
                crawler_info!(
                    "registering schedule for {} every {} {} (continuous={})",
                    registration.url,
                    registration.cadence.quantity,
                    registration.cadence.unit,
                    registration.continuous
                );
                state.mark_dirty();
                vec![Effect::RegisterSchedule {
                    generation,
                    registration,
                }]
            }
            Err(err) => {
                report(&mut state, "schedule not registered", err.into());
                Vec::new()
            }
        },
        Msg::RegistrationFinished { generation, result } => {
            match state.schedule.finish_registration(generation, result) {
                RegistrationOutcome::Stale => Vec::new(),
                RegistrationOutcome::Activated {
                    schedule_id,
                    seconds,
                } => {
                    state.notify(
                        NoticeLevel::Info,
                        format!(
                            "schedule {schedule_id} started, next run in ~{}",
                            format_countdown(seconds)
                        ),
                    );
                    vec![Effect::StartCountdown { generation }]
                }
                RegistrationOutcome::Adopted {
                    schedule_id,
                    seconds,
                    generation,
                } => {
                    state.notify(
                        NoticeLevel::Info,
                        format!(
                            "schedule {schedule_id} was created after stop-all, \
                             next run in ~{}",
                            format_countdown(seconds)
                        ),
                    );
                    vec![Effect::StartCountdown { generation }]
                }
                RegistrationOutcome::Rejected(err) => {
                    report(&mut state, "schedule registration failed", err);
                    Vec::new()
                }
            }
        }
        Msg::CancelAllClicked => match state.schedule.begin_cancel() {
            Ok((generation, was_active)) => {
                state.mark_dirty();
                let mut effects = Vec::with_capacity(2);
                if was_active {
                    effects.push(Effect::StopCountdown);
                }
                effects.push(Effect::CancelAllSchedules { generation });
                effects
            }
            Err(err) => {
                report(&mut state, "stop-all not sent", err.into());
                Vec::new()
            }
        },
        Msg::CancelAllFinished { generation, result } => {
            match state.schedule.finish_cancel(generation, result) {
                CancelOutcome::Stale => Vec::new(),
                CancelOutcome::Cancelled { count } => {
                    state.notify(NoticeLevel::Info, format!("stopped {count} schedule(s)"));
                    Vec::new()
                }
                CancelOutcome::RolledBack(err) => {
                    report(&mut state, "stop-all failed, schedule still running", err);
                    vec![Effect::StartCountdown { generation }]
                }
                CancelOutcome::Adopted {
                    schedule_id,
                    seconds,
                    err,
                } => {
                    report(
                        &mut state,
                        &format!(
                            "stop-all failed, schedule {schedule_id} is running \
                             (next run in ~{})",
                            format_countdown(seconds)
                        ),
                        err,
                    );
                    vec![Effect::StartCountdown { generation }]
                }
                CancelOutcome::Failed(err) => {
                    report(&mut state, "stop-all failed", err);
                    Vec::new()
                }
            }
        }
        Msg::CountdownTick { generation } => match state.schedule.tick(generation) {
            TickOutcome::Ignored => Vec::new(),
            TickOutcome::Counted | TickOutcome::Rearmed => {
                state.mark_dirty();
                Vec::new()
            }
            TickOutcome::Completed => {
                state.notify(
                    NoticeLevel::Info,
                    "one-shot schedule reached its run time; countdown finished",
                );
                vec![Effect::StopCountdown]
            }
        },

        Msg::HistoryRefreshClicked(panel) => vec![refresh_history(&mut state, panel)],
        Msg::HistoryLoaded {
            panel,
            request,
            result,
        } => {
            match state.history_mut(panel).finish_refresh(request, result) {
                None => return (state, Vec::new()),
                Some(Ok(_)) => state.mark_dirty(),
                Some(Err(err)) => report(&mut state, "history refresh failed", err),
            }
            Vec::new()
        }
        Msg::HistoryRecordSelected { panel, record_id } => {
            if let Err(err) = state.history_mut(panel).select(record_id) {
                report(&mut state, "cannot show record", err);
            } else {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::HistorySelectionCleared(panel) => {
            state.history_mut(panel).clear_selection();
            state.mark_dirty();
            Vec::new()
        }

        Msg::ServerSchedulesRequested => {
            let list = &mut state.server_schedules;
            list.last_request += 1;
            list.loading = true;
            let request = list.last_request;
            state.mark_dirty();
            vec![Effect::FetchServerSchedules { request }]
        }
        Msg::ServerSchedulesLoaded { request, result } => {
            let list = &mut state.server_schedules;
            if request != list.last_request {
                crawler_stale!("schedule list", request, list.last_request);
                return (state, Vec::new());
            }
            list.loading = false;
            match result {
                Ok(rows) => {
                    list.rows = rows;
                    state.mark_dirty();
                }
                Err(err) => report(&mut state, "schedule list failed", err),
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn refresh_history(state: &mut AppState, panel: HistoryPanel) -> Effect {
    let (request, limit) = state.history_mut(panel).begin_refresh();
    state.mark_dirty();
    Effect::FetchHistory {
        panel,
        request,
        limit,
    }
}

/// Drops the workflow state owned by `tab`, as a view unmount would.
fn unmount(state: &mut AppState, tab: Tab) -> Vec<Effect> {
    state.history_mut(tab.history_panel()).reset();
    match tab {
        Tab::Manual => {
            state.submitter.reset();
            Vec::new()
        }
        Tab::Schedule => {
            if state.schedule.reset() {
                vec![Effect::StopCountdown]
            } else {
                Vec::new()
            }
        }
    }
}

fn form_edit(state: &mut AppState, result: Result<(), crate::ValidationError>) -> Vec<Effect> {
    match result {
        Ok(()) => state.mark_dirty(),
        Err(err) => report(state, "edit rejected", err.into()),
    }
    Vec::new()
}

fn report(state: &mut AppState, context: &str, err: ClientError) {
    crawler_warn!("{}: {}", context, err);
    state.notify(NoticeLevel::Error, format!("{context}: {err}"));
}
