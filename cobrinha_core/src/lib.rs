pub mod board;
pub mod engine;
pub mod ledger;
pub mod payout;
pub mod rng;
pub mod session;

pub use crate::board::{draw_mine_indices, Board, Cell, BOARD_SIZE};
pub use crate::engine::{
    mines_for_seeds, verify_mines, CashOut, EngineError, IgnoreReason, RevealOutcome, RoundConfig,
    RoundEngine, StartOutcome, DEFAULT_BALANCE, MAX_MINES, MIN_MINES,
};
pub use crate::ledger::{ResultLedger, ResultRecord, RoundKind, RoundSummary, HISTORY_LIMIT};
pub use crate::payout::{multiplier, PICK_COEFF, RISK_COEFF};
pub use crate::rng::{derive_hash_hex, EntropySource, FairSource, RandomSource, SeededSource};
pub use crate::session::GameSession;
