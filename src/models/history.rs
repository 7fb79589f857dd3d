//! History record: a saved calculation with its inputs, results and notes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CalculationResult, TradeInput};

/// A calculation the user chose to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Unique record identifier (UUID v4)
    pub id: String,

    /// When the calculation was saved
    pub created_at: DateTime<Utc>,

    /// Free-form user notes
    #[serde(default)]
    pub notes: Option<String>,

    pub input: TradeInput,

    pub result: CalculationResult,
}

impl HistoryRecord {
    /// Wrap a calculation into a new record with a fresh id and timestamp.
    pub fn new(input: TradeInput, result: CalculationResult, notes: Option<String>) -> Self {
        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            notes,
            input,
            result,
        }
    }

    /// Short identifier for tables (first UUID group).
    pub fn short_id(&self) -> &str {
        self.id.split('-').next().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::compute;

    #[test]
    fn test_new_record_has_unique_id() {
        let input = TradeInput::new(100.0, 110.0, 1.0);
        let result = compute(&input);

        let a = HistoryRecord::new(input.clone(), result.clone(), None);
        let b = HistoryRecord::new(input, result, None);

        assert_ne!(a.id, b.id);
        assert_eq!(a.short_id().len(), 8);
    }

    #[test]
    fn test_blank_notes_are_dropped() {
        let input = TradeInput::new(100.0, 110.0, 1.0);
        let result = compute(&input);

        let record = HistoryRecord::new(input.clone(), result.clone(), Some("   ".to_string()));
        assert_eq!(record.notes, None);

        let record = HistoryRecord::new(input, result, Some(" breakout ".to_string()));
        assert_eq!(record.notes.as_deref(), Some("breakout"));
    }
}
