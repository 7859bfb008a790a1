use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Completed rounds kept for display, newest first.
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundKind {
    Win,
    Lose,
}

/// Snapshot of a finished round, handed from the engine to whoever keeps
/// history. A loss carries `lost_amount` and no multiplier; a win carries
/// the cash-out multiplier and payout.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub kind: RoundKind,
    pub bet: f64,
    pub mine_count: usize,
    pub safe_picks: u32,
    pub multiplier: Option<f64>,
    pub payout: f64,
    pub lost_amount: f64,
}

/// Immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: String,
    pub kind: RoundKind,
    pub bet: f64,
    pub mine_count: usize,
    pub safe_picks: u32,
    pub multiplier: Option<f64>,
    pub payout: f64,
    pub lost_amount: f64,
    pub timestamp: DateTime<Utc>,
}

fn coerce(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Append-bounded history of completed rounds with a single toggleable
/// selection for the detail view. Pure bookkeeping; never touches the
/// engine.
#[derive(Debug, Default)]
pub struct ResultLedger {
    records: Vec<ResultRecord>,
    selected: Option<String>,
}

impl ResultLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed round: assign an id and timestamp, prepend, drop
    /// anything past the `HISTORY_LIMIT` newest.
    pub fn record(&mut self, summary: RoundSummary) -> &ResultRecord {
        let record = ResultRecord {
            id: Uuid::new_v4().to_string(),
            kind: summary.kind,
            bet: coerce(summary.bet),
            mine_count: summary.mine_count,
            safe_picks: summary.safe_picks,
            multiplier: summary.multiplier.map(coerce),
            payout: coerce(summary.payout),
            lost_amount: coerce(summary.lost_amount),
            timestamp: Utc::now(),
        };
        self.records.insert(0, record);
        self.records.truncate(HISTORY_LIMIT);
        &self.records[0]
    }

    /// Newest first, at most `HISTORY_LIMIT` entries.
    pub fn list(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&ResultRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Toggle the detail-view selection. Selecting the same id twice clears
    /// it; returns the record now selected, if any.
    pub fn select(&mut self, id: &str) -> Option<&ResultRecord> {
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
            return None;
        }
        self.selected = Some(id.to_string());
        self.get(id)
    }

    pub fn selected(&self) -> Option<&ResultRecord> {
        let id = self.selected.as_deref()?;
        self.get(id)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn win(bet: f64) -> RoundSummary {
        RoundSummary {
            kind: RoundKind::Win,
            bet,
            mine_count: 3,
            safe_picks: 2,
            multiplier: Some(1.46),
            payout: bet * 1.46,
            lost_amount: 0.0,
        }
    }

    #[test]
    fn keeps_ten_newest_first() {
        let mut ledger = ResultLedger::new();
        for i in 1..=15 {
            ledger.record(win(i as f64));
        }
        assert_eq!(ledger.list().len(), HISTORY_LIMIT);
        assert_eq!(ledger.list()[0].bet, 15.0);
        assert_eq!(ledger.list()[9].bet, 6.0);
    }

    #[test]
    fn record_assigns_unique_ids() {
        let mut ledger = ResultLedger::new();
        let a = ledger.record(win(1.0)).id.clone();
        let b = ledger.record(win(2.0)).id.clone();
        assert_ne!(a, b);
    }

    #[test]
    fn select_toggles_off() {
        let mut ledger = ResultLedger::new();
        let id = ledger.record(win(1.0)).id.clone();
        assert!(ledger.select(&id).is_some());
        assert!(ledger.selected().is_some());
        assert!(ledger.select(&id).is_none());
        assert!(ledger.selected().is_none());
    }

    #[test]
    fn clear_drops_selection() {
        let mut ledger = ResultLedger::new();
        let id = ledger.record(win(1.0)).id.clone();
        ledger.select(&id);
        ledger.clear_selection();
        assert!(ledger.selected().is_none());
    }

    #[test]
    fn selecting_unknown_id_finds_nothing() {
        let mut ledger = ResultLedger::new();
        ledger.record(win(1.0));
        assert!(ledger.select("missing").is_none());
        assert!(ledger.selected().is_none());
    }

    #[test]
    fn record_round_trips_through_json() {
        let mut ledger = ResultLedger::new();
        let record = ledger.record(win(12.5)).clone();
        let json = serde_json::to_string(&record).unwrap();
        let back: ResultRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn non_finite_fields_coerce_to_zero() {
        let mut ledger = ResultLedger::new();
        let record = ledger.record(RoundSummary {
            kind: RoundKind::Lose,
            bet: f64::NAN,
            mine_count: 3,
            safe_picks: 0,
            multiplier: None,
            payout: f64::INFINITY,
            lost_amount: 10.0,
        });
        assert_eq!(record.bet, 0.0);
        assert_eq!(record.payout, 0.0);
        assert_eq!(record.lost_amount, 10.0);
    }
}
