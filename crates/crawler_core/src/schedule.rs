//! Schedule Controller session.
//!
//! Mirrors one server-side schedule. The countdown is a local estimate of the
//! time to the next server run: it is never synchronized with the server's
//! clock, so drift against `ServerSchedule::next_run` is expected.

use crawler_logging::{crawler_debug, crawler_info, crawler_stale, crawler_warn};

use crate::{Cadence, ClientError, NormalizedCadence, ValidationError};

/// Values that only exist while a schedule is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSchedule {
    pub schedule_id: i64,
    pub seconds_to_next_run: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Active(ActiveSchedule),
    /// Cancellation sent but not yet confirmed. The countdown is frozen and
    /// `resume` is restored if the service refuses the stop.
    Stopped { resume: ActiveSchedule },
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Active(_) => "active",
            SessionState::Stopped { .. } => "stopped",
        }
    }
}

/// Normalized registration sent to the schedule endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRegistration {
    pub url: String,
    pub email: String,
    pub cadence: NormalizedCadence,
    pub continuous: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingCall {
    Register,
    CancelAll,
}

/// Registration overtaken by a stop-all. The service may still have created
/// the schedule, so its reply is kept until the stop settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SupersededRegistration {
    generation: u64,
    schedule_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RegistrationOutcome {
    Stale,
    Activated { schedule_id: i64, seconds: u64 },
    /// A superseded registration succeeded after its stop-all already
    /// failed or finished; the schedule is live under the current generation.
    Adopted {
        schedule_id: i64,
        seconds: u64,
        generation: u64,
    },
    Rejected(ClientError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CancelOutcome {
    Stale,
    Cancelled { count: u64 },
    /// Stop refused while a schedule was active; it is active again.
    RolledBack(ClientError),
    /// Stop refused after a superseded registration had created a schedule.
    Adopted {
        schedule_id: i64,
        seconds: u64,
        err: ClientError,
    },
    Failed(ClientError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    Ignored,
    Counted,
    Rearmed,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSession {
    url: String,
    email: String,
    cadence: Cadence,
    continuous: bool,
    state: SessionState,
    generation: u64,
    pending: Option<PendingCall>,
    superseded: Option<SupersededRegistration>,
}

impl Default for ScheduleSession {
    fn default() -> Self {
        Self {
            url: String::new(),
            email: String::new(),
            cadence: Cadence::default(),
            continuous: true,
            state: SessionState::Idle,
            generation: 0,
            pending: None,
            superseded: None,
        }
    }
}

impl ScheduleSession {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn continuous(&self) -> bool {
        self.continuous
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Token carried by requests and countdown ticks of the current session.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn schedule_id(&self) -> Option<i64> {
        match self.state {
            SessionState::Active(active) => Some(active.schedule_id),
            _ => None,
        }
    }

    pub fn seconds_to_next_run(&self) -> u64 {
        match self.state {
            SessionState::Active(active) => active.seconds_to_next_run,
            _ => 0,
        }
    }

    pub fn is_registering(&self) -> bool {
        self.pending == Some(PendingCall::Register)
    }

    pub fn is_cancelling(&self) -> bool {
        self.pending == Some(PendingCall::CancelAll)
    }

    /// Form inputs are frozen from registration until the session is idle again.
    pub fn is_locked(&self) -> bool {
        self.state != SessionState::Idle || self.is_registering()
    }

    pub(crate) fn set_url(&mut self, url: String) -> Result<(), ValidationError> {
        self.ensure_editable()?;
        self.url = url;
        Ok(())
    }

    pub(crate) fn set_email(&mut self, email: String) -> Result<(), ValidationError> {
        self.ensure_editable()?;
        self.email = email;
        Ok(())
    }

    pub(crate) fn set_cadence(&mut self, cadence: Cadence) -> Result<(), ValidationError> {
        self.ensure_editable()?;
        self.cadence = cadence.validate()?;
        Ok(())
    }

    pub(crate) fn set_continuous(&mut self, continuous: bool) -> Result<(), ValidationError> {
        self.ensure_editable()?;
        self.continuous = continuous;
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), ValidationError> {
        if self.is_locked() {
            Err(ValidationError::SessionLocked)
        } else {
            Ok(())
        }
    }

    pub(crate) fn begin_registration(
        &mut self,
    ) -> Result<(u64, ScheduleRegistration), ValidationError> {
        if self.pending.is_some() {
            return Err(ValidationError::SubmissionInFlight);
        }
        if self.state != SessionState::Idle {
            return Err(ValidationError::SessionLocked);
        }
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ValidationError::MissingUrl);
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        let cadence = self.cadence.validate()?;

        let registration = ScheduleRegistration {
            url: url.to_string(),
            email: email.to_string(),
            cadence: cadence.normalize(),
            continuous: self.continuous,
        };
        self.generation += 1;
        self.pending = Some(PendingCall::Register);
        Ok((self.generation, registration))
    }

    pub(crate) fn finish_registration(
        &mut self,
        generation: u64,
        result: Result<i64, ClientError>,
    ) -> RegistrationOutcome {
        if let Some(superseded) = self.superseded.filter(|s| s.generation == generation) {
            return self.finish_superseded(superseded, result);
        }
        if generation != self.generation || self.pending != Some(PendingCall::Register) {
            crawler_stale!("registration", generation, self.generation);
            return RegistrationOutcome::Stale;
        }
        self.pending = None;
        match result {
            Ok(schedule_id) => RegistrationOutcome::Activated {
                schedule_id,
                seconds: self.activate(schedule_id),
            },
            Err(err) => RegistrationOutcome::Rejected(err),
        }
    }

    fn finish_superseded(
        &mut self,
        superseded: SupersededRegistration,
        result: Result<i64, ClientError>,
    ) -> RegistrationOutcome {
        let schedule_id = match result {
            Ok(schedule_id) => schedule_id,
            Err(err) => {
                crawler_debug!("superseded registration failed: {}", err);
                self.superseded = None;
                return RegistrationOutcome::Stale;
            }
        };
        if self.is_cancelling() {
            crawler_info!(
                "schedule {} registered while stop-all is in flight",
                schedule_id
            );
            self.superseded = Some(SupersededRegistration {
                schedule_id: Some(schedule_id),
                ..superseded
            });
            return RegistrationOutcome::Stale;
        }
        self.superseded = None;
        if self.state != SessionState::Idle || self.pending.is_some() {
            crawler_warn!(
                "schedule {} registered late; session is busy, not tracking it",
                schedule_id
            );
            return RegistrationOutcome::Stale;
        }
        RegistrationOutcome::Adopted {
            schedule_id,
            seconds: self.activate(schedule_id),
            generation: self.generation,
        }
    }

    fn activate(&mut self, schedule_id: i64) -> u64 {
        let seconds = self.cadence.interval_secs();
        self.state = SessionState::Active(ActiveSchedule {
            schedule_id,
            seconds_to_next_run: seconds,
        });
        crawler_info!(
            "schedule {} active ({}, continuous={}), next run in ~{}s",
            schedule_id,
            self.cadence,
            self.continuous,
            seconds
        );
        seconds
    }

    /// Flips out of `Active` immediately; the stop is only final once confirmed.
    ///
    /// Returns the new generation and whether a countdown was running.
    pub(crate) fn begin_cancel(&mut self) -> Result<(u64, bool), ValidationError> {
        if self.is_cancelling() {
            return Err(ValidationError::SubmissionInFlight);
        }
        if self.is_registering() {
            self.superseded = Some(SupersededRegistration {
                generation: self.generation,
                schedule_id: None,
            });
        }
        self.generation += 1;
        self.pending = Some(PendingCall::CancelAll);
        let was_active = match self.state {
            SessionState::Active(active) => {
                self.state = SessionState::Stopped { resume: active };
                crawler_info!("schedule {} stopping", active.schedule_id);
                true
            }
            _ => false,
        };
        Ok((self.generation, was_active))
    }

    pub(crate) fn finish_cancel(
        &mut self,
        generation: u64,
        result: Result<u64, ClientError>,
    ) -> CancelOutcome {
        if generation != self.generation || self.pending != Some(PendingCall::CancelAll) {
            crawler_stale!("stop-all", generation, self.generation);
            return CancelOutcome::Stale;
        }
        self.pending = None;
        match (result, self.state) {
            (Ok(count), _) => {
                self.state = SessionState::Idle;
                // A registration that answered before the stop is covered by
                // it; one still unanswered may land after it.
                if matches!(self.superseded, Some(s) if s.schedule_id.is_some()) {
                    self.superseded = None;
                }
                crawler_info!("stop-all confirmed, {} schedule(s) stopped", count);
                CancelOutcome::Cancelled { count }
            }
            (Err(err), SessionState::Stopped { resume }) => {
                self.state = SessionState::Active(resume);
                crawler_info!(
                    "stop-all refused, schedule {} active again",
                    resume.schedule_id
                );
                CancelOutcome::RolledBack(err)
            }
            (Err(err), _) => match self.superseded {
                Some(SupersededRegistration {
                    schedule_id: Some(schedule_id),
                    ..
                }) => {
                    self.superseded = None;
                    CancelOutcome::Adopted {
                        schedule_id,
                        seconds: self.activate(schedule_id),
                        err,
                    }
                }
                _ => CancelOutcome::Failed(err),
            },
        }
    }

    pub(crate) fn tick(&mut self, generation: u64) -> TickOutcome {
        if generation != self.generation {
            crawler_stale!("countdown tick", generation, self.generation);
            return TickOutcome::Ignored;
        }
        let SessionState::Active(mut active) = self.state else {
            return TickOutcome::Ignored;
        };
        active.seconds_to_next_run = active.seconds_to_next_run.saturating_sub(1);
        if active.seconds_to_next_run > 0 {
            self.state = SessionState::Active(active);
            return TickOutcome::Counted;
        }
        if self.continuous {
            active.seconds_to_next_run = self.cadence.interval_secs();
            self.state = SessionState::Active(active);
            crawler_debug!("schedule {} countdown re-armed", active.schedule_id);
            TickOutcome::Rearmed
        } else {
            // One-shot: the server is assumed to have run it once; nothing
            // here confirms that.
            self.state = SessionState::Idle;
            crawler_info!("one-shot schedule {} countdown elapsed", active.schedule_id);
            TickOutcome::Completed
        }
    }

    /// Unmount: back to a fresh idle session. Returns whether a countdown was
    /// running and must be stopped.
    pub(crate) fn reset(&mut self) -> bool {
        let was_active = matches!(self.state, SessionState::Active(_));
        *self = Self {
            generation: self.generation + 1,
            ..Self::default()
        };
        was_active
    }
}
