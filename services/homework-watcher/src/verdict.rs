//! Verdict table and status message rendering

use std::collections::BTreeMap;

use crate::response::StatusRecord;

/// Fixed mapping from status code to verdict text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictTable {
    verdicts: BTreeMap<String, String>,
}

impl VerdictTable {
    pub fn new(verdicts: BTreeMap<String, String>) -> Self {
        Self { verdicts }
    }

    pub fn verdict(&self, status: &str) -> Option<&str> {
        self.verdicts.get(status).map(String::as_str)
    }

    /// Render the notification text for a record.
    ///
    /// Pure: the same record always renders to the same string.
    pub fn render(&self, record: &StatusRecord) -> crate::Result<String> {
        let name = record
            .name
            .as_deref()
            .ok_or(crate::WatcherError::MissingField("homework_name"))?;

        let status = record.status.as_deref().unwrap_or_default();
        let verdict = self
            .verdict(status)
            .ok_or_else(|| crate::WatcherError::UnknownStatus(format!("'{}'", status)))?;

        Ok(format!(
            "Изменился статус проверки работы \"{}\". {}",
            name, verdict
        ))
    }
}

impl Default for VerdictTable {
    fn default() -> Self {
        Self::new(crate::config::Config::default().verdicts)
    }
}
