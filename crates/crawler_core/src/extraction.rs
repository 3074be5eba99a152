use std::time::Duration;

use crawler_logging::{crawler_debug, crawler_stale};

use crate::{ClientError, ValidationError};

/// One-shot extraction request; lives only until its reply is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub url: String,
    pub notify_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Items(u32),
    Failed(ClientError),
}

/// Result of a completed attempt. `elapsed` is the client-observed latency,
/// transport included, never a server-reported duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub elapsed: Duration,
    pub outcome: ExtractionOutcome,
}

impl ExtractionResult {
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn item_count(&self) -> Option<u32> {
        match self.outcome {
            ExtractionOutcome::Items(count) => Some(count),
            ExtractionOutcome::Failed(_) => None,
        }
    }

    pub fn error_detail(&self) -> Option<String> {
        match &self.outcome {
            ExtractionOutcome::Items(_) => None,
            ExtractionOutcome::Failed(err) => Some(err.to_string()),
        }
    }
}

/// Manual extraction workflow: form inputs, the single in-flight attempt and
/// the last completed result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractionSubmitter {
    url: String,
    email: String,
    last_attempt: u64,
    in_flight: Option<u64>,
    last_result: Option<ExtractionResult>,
}

impl ExtractionSubmitter {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_result(&self) -> Option<&ExtractionResult> {
        self.last_result.as_ref()
    }

    pub(crate) fn set_url(&mut self, url: String) {
        self.url = url;
    }

    pub(crate) fn set_email(&mut self, email: String) {
        self.email = email;
    }

    /// Validates the form and enters the loading state.
    ///
    /// Returns the attempt token the reply must carry back.
    pub(crate) fn begin(&mut self) -> Result<(u64, ExtractionRequest), ValidationError> {
        if self.in_flight.is_some() {
            return Err(ValidationError::SubmissionInFlight);
        }
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ValidationError::MissingUrl);
        }
        let email = self.email.trim();
        let request = ExtractionRequest {
            url: url.to_string(),
            notify_email: (!email.is_empty()).then(|| email.to_string()),
        };

        self.last_attempt += 1;
        self.in_flight = Some(self.last_attempt);
        self.last_result = None;
        Ok((self.last_attempt, request))
    }

    /// Leaves the loading state. Returns `None` when the reply belongs to an
    /// attempt that is no longer in flight.
    pub(crate) fn finish(
        &mut self,
        attempt: u64,
        elapsed: Duration,
        result: Result<u32, ClientError>,
    ) -> Option<&ExtractionResult> {
        if self.in_flight != Some(attempt) {
            crawler_stale!("extraction", attempt, self.last_attempt);
            return None;
        }
        self.in_flight = None;
        let outcome = match result {
            Ok(count) => ExtractionOutcome::Items(count),
            Err(err) => ExtractionOutcome::Failed(err),
        };
        crawler_debug!(
            "extraction attempt {} finished after {:.2}s: {:?}",
            attempt,
            elapsed.as_secs_f64(),
            outcome
        );
        self.last_result = Some(ExtractionResult { elapsed, outcome });
        self.last_result.as_ref()
    }

    /// Unmount: forget inputs and results; any in-flight reply becomes stale.
    pub(crate) fn reset(&mut self) {
        *self = Self {
            last_attempt: self.last_attempt,
            ..Self::default()
        };
    }
}
