//! Session-end export of collected samples.

use super::BoundedHistory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordered color list handed to the display side when a session ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryExport {
    /// When the export was taken.
    pub exported_at: DateTime<Utc>,
    /// Six-digit RGB hex strings, oldest first.
    pub colors: Vec<String>,
}

impl HistoryExport {
    /// Captures the history as of now.
    pub fn from_history(history: &BoundedHistory) -> Self {
        Self {
            exported_at: Utc::now(),
            colors: history.to_hex_strings(),
        }
    }

    /// Number of exported colors.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
