use crate::engine::{CashOut, EngineError, RevealOutcome, RoundEngine, StartOutcome, DEFAULT_BALANCE};
use crate::ledger::ResultLedger;
use crate::rng::RandomSource;

/// One engine plus one result ledger: everything a single browser tab or
/// server session owns. Completed rounds are forwarded to the ledger as
/// they finish, so presentation code only renders outcomes.
///
/// Never share a session across tabs or server sessions; state is
/// memory-only and dies with the holder.
pub struct GameSession {
    engine: RoundEngine,
    ledger: ResultLedger,
}

impl GameSession {
    pub fn new(balance: f64) -> Self {
        Self {
            engine: RoundEngine::new(balance),
            ledger: ResultLedger::new(),
        }
    }

    pub fn with_source(balance: f64, rng: Box<dyn RandomSource>) -> Self {
        Self {
            engine: RoundEngine::with_source(balance, rng),
            ledger: ResultLedger::new(),
        }
    }

    pub fn configure_round(
        &mut self,
        bet: f64,
        mine_count: usize,
    ) -> Result<StartOutcome, EngineError> {
        self.engine.configure_round(bet, mine_count)
    }

    pub fn reveal(&mut self, index: usize) -> RevealOutcome {
        let outcome = self.engine.reveal(index);
        if let RevealOutcome::Mine { summary, .. } = &outcome {
            self.ledger.record(summary.clone());
        }
        outcome
    }

    pub fn cash_out(&mut self) -> Result<CashOut, EngineError> {
        let cash_out = self.engine.cash_out()?;
        self.ledger.record(cash_out.summary.clone());
        Ok(cash_out)
    }

    pub fn engine(&self) -> &RoundEngine {
        &self.engine
    }

    pub fn ledger(&self) -> &ResultLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ResultLedger {
        &mut self.ledger
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(DEFAULT_BALANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::RoundKind;
    use crate::rng::SeededSource;

    #[test]
    fn loss_and_win_both_land_in_the_ledger() {
        let mut session =
            GameSession::with_source(1000.0, Box::new(SeededSource::new(5)));

        session.configure_round(10.0, 3).unwrap();
        let mines = session.engine().board().unwrap().mine_indices();
        session.reveal(mines[0]);
        assert_eq!(session.ledger().list().len(), 1);
        assert_eq!(session.ledger().list()[0].kind, RoundKind::Lose);

        session.configure_round(10.0, 3).unwrap();
        let safe = (0..25)
            .find(|i| !session.engine().board().unwrap().is_mine(*i))
            .unwrap();
        session.reveal(safe);
        session.cash_out().unwrap();
        assert_eq!(session.ledger().list().len(), 2);
        assert_eq!(session.ledger().list()[0].kind, RoundKind::Win);
    }
}
