use cobrinha_core::{FairSource, GameSession, RevealOutcome};

fn main() {
    // Example end-to-end round with a provably-fair source
    let server_seed = "example-server-seed";
    let client_seed = "example-client-seed";
    let fair = FairSource::new(server_seed, client_seed);
    println!("server_seed_hash={}", fair.server_seed_hash_hex());

    let mut session = GameSession::with_source(1000.0, Box::new(fair));
    session.configure_round(10.0, 3).expect("configure round");

    for index in 0..25 {
        match session.reveal(index) {
            RevealOutcome::Safe {
                safe_picks,
                multiplier,
                profit,
            } => {
                println!("tile {index}: safe, picks={safe_picks} multiplier={multiplier:.4} profit={profit:.3}");
                if safe_picks == 3 {
                    break;
                }
            }
            RevealOutcome::Mine { mine_indices, .. } => {
                println!("tile {index}: snake! layout={mine_indices:?}");
                break;
            }
            RevealOutcome::Ignored(reason) => println!("tile {index}: ignored ({reason:?})"),
        }
    }

    if session.engine().is_active() {
        let cash = session.cash_out().expect("cash out");
        println!("cashed out {:.3}, balance {:.3}", cash.payout, cash.balance);
    }
    println!("history: {} record(s)", session.ledger().list().len());
}
