use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Counters shown to the user after an upload or a processing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub suppliers: usize,
    pub orders: usize,
    pub pending: f64,
}

impl Summary {
    /// Pending pieces rounded to units with `.` as thousands separator, e.g. `12.345`.
    pub fn pending_display(&self) -> String {
        let rounded = self.pending.round() as i64;
        let digits = rounded.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        if rounded < 0 {
            format!("-{grouped}")
        } else {
            grouped
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub removed_columns: Vec<String>,
    /// Original column name -> new name; empty names are ignored.
    #[serde(default)]
    pub renames: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArchiveRequest {
    #[serde(default)]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryDTO {
    pub suppliers: usize,
    pub orders: usize,
    pub pending: f64,
    pub pending_display: String,
}

impl From<Summary> for SummaryDTO {
    fn from(value: Summary) -> Self {
        Self {
            suppliers: value.suppliers,
            orders: value.orders,
            pending: value.pending,
            pending_display: value.pending_display(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub session_id: Uuid,
    pub file_name: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub suggested_removed_columns: Vec<String>,
    pub summary: SummaryDTO,
}

/// Generated files of a session and the upload they came from.
#[derive(Debug, Clone, Serialize)]
pub struct SessionFiles {
    pub file_name: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessResponse {
    pub files: Vec<String>,
    pub summary: SummaryDTO,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
