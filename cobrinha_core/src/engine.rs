use serde::{Deserialize, Serialize};

use crate::board::{self, Board, BOARD_SIZE};
use crate::ledger::{RoundKind, RoundSummary};
use crate::payout;
use crate::rng::{EntropySource, FairSource, RandomSource};

/// Balance handed to a fresh session.
pub const DEFAULT_BALANCE: f64 = 1000.0;
pub const MIN_MINES: usize = 1;
pub const MAX_MINES: usize = BOARD_SIZE - 1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid bet amount")]
    InvalidBet,
    #[error("not enough balance")]
    InsufficientBalance,
    #[error("mine count must be between 1 and 24")]
    InvalidMineCount,
    #[error("no round is active")]
    RoundNotActive,
    #[error("at least one safe pick is required before cashing out")]
    NoSafePicksYet,
}

/// Per-round configuration, fixed once the round starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundConfig {
    pub bet: f64,
    pub mine_count: usize,
}

/// Result of `configure_round`.
#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    /// Bet debited, fresh board dealt, round live.
    Started(RoundConfig),
    /// A round is already in progress; the request was ignored.
    Ignored,
}

/// Why a `reveal` was ignored rather than applied. Not an error: pre-round
/// clicks are expected usage, and the presentation layer typically answers
/// `NotActive` with a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    NotActive,
    OutOfRange,
    AlreadyRevealed,
}

/// Result of revealing a tile.
#[derive(Debug, Clone, PartialEq)]
pub enum RevealOutcome {
    Safe {
        safe_picks: u32,
        multiplier: f64,
        profit: f64,
    },
    /// Round lost. Carries the full layout for display and the finished
    /// round's summary for the result ledger.
    Mine {
        mine_indices: Vec<usize>,
        summary: RoundSummary,
    },
    Ignored(IgnoreReason),
}

/// Result of a successful cash-out.
#[derive(Debug, Clone, PartialEq)]
pub struct CashOut {
    pub payout: f64,
    pub balance: f64,
    pub summary: RoundSummary,
}

/// The round state machine: Idle -> Active -> {Lost, Won}, terminal states
/// left only through a full `configure_round`.
///
/// Owns the session balance and the current board. All operations are
/// synchronous and leave the engine in a consistent state; validation
/// failures change nothing.
pub struct RoundEngine {
    balance: f64,
    config: RoundConfig,
    board: Option<Board>,
    active: bool,
    safe_picks: u32,
    multiplier: f64,
    profit: f64,
    rng: Box<dyn RandomSource>,
}

impl RoundEngine {
    pub fn new(balance: f64) -> Self {
        Self::with_source(balance, Box::new(EntropySource::default()))
    }

    pub fn with_source(balance: f64, rng: Box<dyn RandomSource>) -> Self {
        Self {
            balance,
            config: RoundConfig {
                bet: 0.0,
                mine_count: 0,
            },
            board: None,
            active: false,
            safe_picks: 0,
            multiplier: 1.0,
            profit: 0.0,
            rng,
        }
    }

    /// Validate the wager, debit the balance and deal a fresh board.
    ///
    /// Ignored while a round is live; the running round is never replaced.
    pub fn configure_round(
        &mut self,
        bet: f64,
        mine_count: usize,
    ) -> Result<StartOutcome, EngineError> {
        if self.active {
            return Ok(StartOutcome::Ignored);
        }
        if !bet.is_finite() || bet <= 0.0 {
            return Err(EngineError::InvalidBet);
        }
        if bet > self.balance {
            return Err(EngineError::InsufficientBalance);
        }
        if !(MIN_MINES..=MAX_MINES).contains(&mine_count) {
            return Err(EngineError::InvalidMineCount);
        }

        self.balance -= bet;
        self.config = RoundConfig { bet, mine_count };
        self.rng.begin_round();
        self.board = Some(Board::deal(self.rng.as_mut(), mine_count));
        self.active = true;
        self.safe_picks = 0;
        self.multiplier = 1.0;
        self.profit = 0.0;
        Ok(StartOutcome::Started(self.config))
    }

    /// Reveal a tile. Invalid targets and idle clicks are reported as
    /// ignored, never as errors.
    pub fn reveal(&mut self, index: usize) -> RevealOutcome {
        if !self.active {
            return RevealOutcome::Ignored(IgnoreReason::NotActive);
        }
        if index >= BOARD_SIZE {
            return RevealOutcome::Ignored(IgnoreReason::OutOfRange);
        }
        let Some(board) = self.board.as_mut() else {
            return RevealOutcome::Ignored(IgnoreReason::NotActive);
        };
        if board.is_revealed(index) {
            return RevealOutcome::Ignored(IgnoreReason::AlreadyRevealed);
        }

        board.reveal(index);

        if board.is_mine(index) {
            self.active = false;
            let summary = RoundSummary {
                kind: RoundKind::Lose,
                bet: self.config.bet,
                mine_count: self.config.mine_count,
                safe_picks: self.safe_picks,
                multiplier: None,
                payout: 0.0,
                lost_amount: self.config.bet,
            };
            return RevealOutcome::Mine {
                mine_indices: board.mine_indices(),
                summary,
            };
        }

        self.safe_picks += 1;
        self.multiplier = payout::multiplier(self.config.mine_count, self.safe_picks);
        self.profit = self.config.bet * self.multiplier;
        RevealOutcome::Safe {
            safe_picks: self.safe_picks,
            multiplier: self.multiplier,
            profit: self.profit,
        }
    }

    /// End the round voluntarily and credit the accumulated profit.
    /// Requires a live round with at least one safe pick.
    pub fn cash_out(&mut self) -> Result<CashOut, EngineError> {
        if !self.active {
            return Err(EngineError::RoundNotActive);
        }
        if self.safe_picks == 0 {
            return Err(EngineError::NoSafePicksYet);
        }

        let payout = self.profit;
        self.balance += payout;
        self.active = false;
        let summary = RoundSummary {
            kind: RoundKind::Win,
            bet: self.config.bet,
            mine_count: self.config.mine_count,
            safe_picks: self.safe_picks,
            multiplier: Some(self.multiplier),
            payout,
            lost_amount: 0.0,
        };
        Ok(CashOut {
            payout,
            balance: self.balance,
            summary,
        })
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn safe_picks(&self) -> u32 {
        self.safe_picks
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn profit(&self) -> f64 {
        self.profit
    }

    pub fn config(&self) -> RoundConfig {
        self.config
    }

    /// Current board, if any round has ever been dealt. Kept after the
    /// round ends so a lost layout can still be rendered.
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }
}

/// Mine layout committed by a provably-fair round, sorted ascending.
pub fn mines_for_seeds(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    mine_count: usize,
) -> Vec<usize> {
    let mut source = FairSource::at_nonce(server_seed, client_seed, nonce);
    board::draw_mine_indices(&mut source, mine_count)
        .into_iter()
        .collect()
}

/// Check a claimed layout against the committed seeds, like a player
/// auditing a finished round.
pub fn verify_mines(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    mine_count: usize,
    expected_indices: &[usize],
) -> bool {
    let mut expected = expected_indices.to_vec();
    expected.sort_unstable();
    expected.dedup();
    mines_for_seeds(server_seed, client_seed, nonce, mine_count) == expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededSource;

    fn seeded_engine(balance: f64) -> RoundEngine {
        RoundEngine::with_source(balance, Box::new(SeededSource::new(99)))
    }

    #[test]
    fn configure_while_active_is_ignored() {
        let mut engine = seeded_engine(100.0);
        engine.configure_round(10.0, 3).unwrap();
        let outcome = engine.configure_round(10.0, 3).unwrap();
        assert_eq!(outcome, StartOutcome::Ignored);
        // no second debit
        assert_eq!(engine.balance(), 90.0);
    }

    #[test]
    fn fair_rounds_match_committed_layout() {
        let mut engine = RoundEngine::with_source(
            100.0,
            Box::new(FairSource::new("server", "client")),
        );
        engine.configure_round(5.0, 4).unwrap();
        let dealt = engine.board().unwrap().mine_indices();
        assert_eq!(dealt, mines_for_seeds("server", "client", 1, 4));

        // finish round one, round two uses the next nonce
        for index in 0..BOARD_SIZE {
            if let RevealOutcome::Mine { .. } = engine.reveal(index) {
                break;
            }
        }
        engine.configure_round(5.0, 4).unwrap();
        let dealt = engine.board().unwrap().mine_indices();
        assert_eq!(dealt, mines_for_seeds("server", "client", 2, 4));
    }

    #[test]
    fn verify_rejects_wrong_nonce() {
        let layout = mines_for_seeds("s", "c", 1, 3);
        assert!(verify_mines("s", "c", 1, 3, &layout));
        assert!(!verify_mines("s", "c", 2, 3, &layout));
    }
}
