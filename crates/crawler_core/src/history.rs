use crawler_logging::{crawler_debug, crawler_stale};

use crate::{ClientError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Success,
    Failure,
}

impl RecordStatus {
    /// The service writes `success`, `scheduled_success` and `failed`.
    pub fn from_wire(raw: &str) -> Self {
        if raw.trim().to_ascii_lowercase().ends_with("success") {
            RecordStatus::Success
        } else {
            RecordStatus::Failure
        }
    }
}

/// Server-owned summary of one past extraction. Never mutated client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub id: i64,
    pub url: String,
    pub topic: String,
    pub summary: String,
    /// Serialized JSON produced by the extraction engine; opaque until inspected.
    pub data_payload: String,
    /// ISO-8601 as stored by the service.
    pub timestamp: String,
    pub status: RecordStatus,
}

impl HistoryRecord {
    /// Parses the stored payload. An empty payload reads as an empty array.
    pub fn parse_payload(&self) -> Result<serde_json::Value, ClientError> {
        let raw = self.data_payload.trim();
        if raw.is_empty() {
            return Ok(serde_json::Value::Array(Vec::new()));
        }
        serde_json::from_str(raw).map_err(|err| {
            ClientError::MalformedPayload(format!("record {}: {}", self.id, err))
        })
    }
}

/// Which workflow a history snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryPanel {
    Manual,
    Schedule,
}

impl HistoryPanel {
    pub fn default_limit(self) -> u32 {
        match self {
            HistoryPanel::Manual => 10,
            HistoryPanel::Schedule => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadInspection {
    pub record_id: i64,
    pub payload: serde_json::Value,
}

/// Read model over the most recent history records, replaced wholesale on
/// every successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryView {
    panel: HistoryPanel,
    limit: u32,
    records: Vec<HistoryRecord>,
    last_request: u64,
    loading: bool,
    selected: Option<PayloadInspection>,
}

impl HistoryView {
    pub fn new(panel: HistoryPanel) -> Self {
        Self {
            panel,
            limit: panel.default_limit(),
            records: Vec::new(),
            last_request: 0,
            loading: false,
            selected: None,
        }
    }

    pub fn panel(&self) -> HistoryPanel {
        self.panel
    }

    /// Most recent first, exactly as the service returned them.
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn selected(&self) -> Option<&PayloadInspection> {
        self.selected.as_ref()
    }

    /// Distinct URLs in display order, offered as input suggestions.
    pub fn url_suggestions(&self) -> Vec<String> {
        let mut seen = Vec::<&str>::new();
        for record in &self.records {
            if !seen.contains(&record.url.as_str()) {
                seen.push(&record.url);
            }
        }
        seen.into_iter().map(ToOwned::to_owned).collect()
    }

    pub(crate) fn begin_refresh(&mut self) -> (u64, u32) {
        self.last_request += 1;
        self.loading = true;
        (self.last_request, self.limit)
    }

    /// Applies a fetch result. `None` means the reply was superseded by a
    /// later request; a failed fetch keeps the previous snapshot.
    pub(crate) fn finish_refresh(
        &mut self,
        request: u64,
        result: Result<Vec<HistoryRecord>, ClientError>,
    ) -> Option<Result<usize, ClientError>> {
        if request != self.last_request {
            crawler_stale!("history", request, self.last_request);
            return None;
        }
        self.loading = false;
        match result {
            Ok(records) => {
                crawler_debug!(
                    "{:?} history replaced with {} record(s)",
                    self.panel,
                    records.len()
                );
                if let Some(selected) = &self.selected {
                    if !records.iter().any(|r| r.id == selected.record_id) {
                        self.selected = None;
                    }
                }
                self.records = records;
                Some(Ok(self.records.len()))
            }
            Err(err) => Some(Err(err)),
        }
    }

    /// Parses the payload lazily; a malformed payload clears the selection.
    pub(crate) fn select(&mut self, record_id: i64) -> Result<(), ClientError> {
        let record = self
            .records
            .iter()
            .find(|record| record.id == record_id)
            .ok_or(ValidationError::UnknownRecord { id: record_id })?;
        match record.parse_payload() {
            Ok(payload) => {
                self.selected = Some(PayloadInspection { record_id, payload });
                Ok(())
            }
            Err(err) => {
                self.selected = None;
                Err(err)
            }
        }
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self {
            last_request: self.last_request + 1,
            ..Self::new(self.panel)
        };
    }
}
