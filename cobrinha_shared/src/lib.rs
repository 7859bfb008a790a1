use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CreateSessionRequest {
    /// Player-chosen half of the provably-fair seed pair.
    #[serde(default)]
    pub client_seed: Option<String>,
    #[serde(default)]
    pub balance: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionResponse {
    pub session_id: String,
    pub server_seed_hash: String,
    pub balance: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StartRoundRequest {
    pub bet: f64,
    pub mine_count: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StartRoundResponse {
    pub bet: f64,
    pub mine_count: usize,
    /// Provably-fair round number within the session.
    pub nonce: u64,
    pub balance: f64,
    /// False when a round was already live and the request was ignored.
    pub started: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RevealRequest {
    pub index: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RevealKind {
    Safe,
    Mine,
    Ignored,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RevealResponse {
    pub outcome: RevealKind,
    pub safe_picks: u32,
    pub multiplier: f64,
    pub profit: f64,
    /// Full layout, present only once the round is lost.
    pub mine_indices: Option<Vec<usize>>,
    pub balance: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CashOutResponse {
    pub payout: f64,
    pub balance: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StateResponse {
    pub active: bool,
    pub balance: f64,
    pub bet: f64,
    pub mine_count: usize,
    pub safe_picks: u32,
    pub multiplier: f64,
    pub profit: f64,
    pub revealed: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Win,
    Lose,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HistoryEntry {
    pub id: String,
    pub ts: DateTime<Utc>,
    pub kind: RecordKind,
    pub bet: f64,
    pub mine_count: usize,
    pub safe_picks: u32,
    pub multiplier: Option<f64>,
    pub payout: f64,
    pub lost_amount: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HistoryResponse {
    pub records: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VerifyResponse {
    pub server_seed_hash: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    InvalidBet,
    InsufficientBalance,
    InvalidMineCount,
    RoundNotActive,
    NoSafePicksYet,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorResponse {
    pub kind: ValidationKind,
    pub message: String,
}
