use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use cobrinha_core::{
    derive_hash_hex, mines_for_seeds, verify_mines, EngineError, EntropySource, GameSession,
    IgnoreReason, RandomSource, RevealOutcome, RoundKind, RoundSummary, SeededSource,
    StartOutcome, BOARD_SIZE, DEFAULT_BALANCE,
};

#[derive(Parser)]
#[command(name = "cobrinha-cli", about = "Play, simulate and audit cobrinha rounds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play rounds interactively in the terminal
    Play {
        /// Starting balance
        #[arg(long, default_value_t = DEFAULT_BALANCE)]
        balance: f64,
        /// Seed for a reproducible session; OS entropy when omitted
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run a batch of rounds with a fixed pick target and report RTP
    Simulate {
        #[arg(long, default_value_t = 1000)]
        rounds: u64,
        #[arg(long, default_value_t = 10.0)]
        bet: f64,
        #[arg(long, default_value_t = 3)]
        mines: usize,
        /// Safe picks to collect before cashing out
        #[arg(long, default_value_t = 3)]
        picks: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Export per-round records to a CSV file
        #[arg(long)]
        csv: Option<String>,
    },
    /// Recompute the mine layout of a finished provably-fair round
    Verify {
        server_seed: String,
        client_seed: String,
        nonce: u64,
        #[arg(long, default_value_t = 3)]
        mines: usize,
        /// Claimed mine indices to check, comma separated
        #[arg(long, value_delimiter = ',')]
        expected: Vec<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Play { balance, seed } => play(balance, seed),
        Commands::Simulate {
            rounds,
            bet,
            mines,
            picks,
            seed,
            csv,
        } => simulate(rounds, bet, mines, picks, seed, csv),
        Commands::Verify {
            server_seed,
            client_seed,
            nonce,
            mines,
            expected,
        } => {
            verify(&server_seed, &client_seed, nonce, mines, &expected);
            Ok(())
        }
    }
}

fn describe_error(err: &EngineError) -> &'static str {
    match err {
        EngineError::InvalidBet => "Invalid bet amount.",
        EngineError::InsufficientBalance => "Not enough balance.",
        EngineError::InvalidMineCount => "Snakes count must be between 1 and 24.",
        EngineError::RoundNotActive => "No round in progress.",
        EngineError::NoSafePicksYet => "Open at least one safe tile before cashing out.",
    }
}

fn print_grid(session: &GameSession, show_mines: bool) {
    let Some(board) = session.engine().board() else {
        return;
    };
    for row in 0..5 {
        let line: Vec<String> = (0..5)
            .map(|col| {
                let idx = row * 5 + col;
                let cell = board.cell(idx).expect("index in range");
                if cell.revealed && cell.is_mine {
                    " S ".to_string()
                } else if cell.revealed {
                    " o ".to_string()
                } else if show_mines && cell.is_mine {
                    "(S)".to_string()
                } else {
                    format!("{idx:2} ")
                }
            })
            .collect();
        println!("  {}", line.join(" "));
    }
}

fn print_history(session: &GameSession) {
    let records = session.ledger().list();
    if records.is_empty() {
        println!("No rounds finished yet.");
        return;
    }
    for record in records {
        match record.kind {
            RoundKind::Win => println!(
                "  WIN  bet={:<8.2} snakes={:<2} picks={:<2} x{:<6.2} payout={:.2}",
                record.bet,
                record.mine_count,
                record.safe_picks,
                record.multiplier.unwrap_or(0.0),
                record.payout
            ),
            RoundKind::Lose => println!(
                "  LOSS bet={:<8.2} snakes={:<2} picks={:<2} lost={:.2}",
                record.bet, record.mine_count, record.safe_picks, record.lost_amount
            ),
        }
    }
}

fn play(balance: f64, seed: Option<u64>) -> anyhow::Result<()> {
    let source: Box<dyn RandomSource> = match seed {
        Some(seed) => Box::new(SeededSource::new(seed)),
        None => Box::new(EntropySource::default()),
    };
    let mut session = GameSession::with_source(balance, source);

    println!("Balance: {balance:.2}");
    println!("Commands: start <bet> <snakes> | <tile 0-24> | cash | history | quit");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };

        match command {
            "quit" | "q" => break,
            "history" | "h" => print_history(&session),
            "cash" | "c" => match session.cash_out() {
                Ok(cash) => {
                    println!("Cashed out! You won {:.2}.", cash.payout);
                    println!("Balance: {:.2}", cash.balance);
                }
                Err(err) => println!("{}", describe_error(&err)),
            },
            "start" | "s" => {
                let bet: f64 = parts.next().and_then(|v| v.parse().ok()).unwrap_or(10.0);
                let mines: usize = parts.next().and_then(|v| v.parse().ok()).unwrap_or(3);
                match session.configure_round(bet, mines) {
                    Ok(StartOutcome::Started(config)) => {
                        println!(
                            "Round started: bet {:.2}, {} snakes. Pick a tile.",
                            config.bet, config.mine_count
                        );
                        print_grid(&session, false);
                    }
                    Ok(StartOutcome::Ignored) => println!("A round is already running."),
                    Err(err) => println!("{}", describe_error(&err)),
                }
            }
            other => {
                let Ok(index) = other.parse::<usize>() else {
                    println!("Unknown command: {other}");
                    continue;
                };
                match session.reveal(index) {
                    RevealOutcome::Safe {
                        safe_picks,
                        multiplier,
                        profit,
                    } => {
                        println!(
                            "Safe pick! Picks: {safe_picks}, multiplier: {multiplier:.2}x, profit: {profit:.2}"
                        );
                        print_grid(&session, false);
                    }
                    RevealOutcome::Mine { .. } => {
                        println!("Boom! You hit a snake.");
                        print_grid(&session, true);
                        println!("Balance: {:.2}", session.engine().balance());
                    }
                    RevealOutcome::Ignored(IgnoreReason::NotActive) => {
                        println!("Start a round first: start <bet> <snakes>");
                    }
                    RevealOutcome::Ignored(IgnoreReason::OutOfRange) => {
                        println!("Tiles are numbered 0 to 24.");
                    }
                    RevealOutcome::Ignored(IgnoreReason::AlreadyRevealed) => {}
                }
            }
        }
    }

    println!("Final balance: {:.2}", session.engine().balance());
    Ok(())
}

fn simulate(
    rounds: u64,
    bet: f64,
    mines: usize,
    picks: u32,
    seed: u64,
    csv_path: Option<String>,
) -> anyhow::Result<()> {
    // bankroll large enough that every round can place its bet
    let bankroll = bet * rounds as f64;
    let mut session = GameSession::with_source(bankroll, Box::new(SeededSource::new(seed)));
    // tile order is drawn separately so it never touches the deal stream
    let mut order_rng = StdRng::seed_from_u64(seed ^ 0x5EED);

    let mut wins = 0u64;
    let mut total_payout = 0.0;
    let mut summaries: Vec<(u64, RoundSummary)> = Vec::new();

    for round in 1..=rounds {
        session.configure_round(bet, mines)?;
        let mut order: Vec<usize> = (0..BOARD_SIZE).collect();
        order.shuffle(&mut order_rng);

        let mut lost: Option<RoundSummary> = None;
        for &index in &order {
            match session.reveal(index) {
                RevealOutcome::Safe { safe_picks, .. } => {
                    if safe_picks >= picks {
                        break;
                    }
                }
                RevealOutcome::Mine { summary, .. } => {
                    lost = Some(summary);
                    break;
                }
                RevealOutcome::Ignored(_) => {}
            }
        }

        let summary = match lost {
            Some(summary) => summary,
            None => {
                let cash = session.cash_out()?;
                wins += 1;
                total_payout += cash.payout;
                cash.summary
            }
        };
        summaries.push((round, summary));
    }

    let total_bet = bet * rounds as f64;
    println!(
        "rounds={rounds} wins={wins} losses={} rtp={:.4}",
        rounds - wins,
        total_payout / total_bet
    );
    println!("final balance: {:.2}", session.engine().balance());

    if let Some(path) = csv_path {
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record([
            "round",
            "outcome",
            "bet",
            "mines",
            "safe_picks",
            "multiplier",
            "payout",
            "lost_amount",
        ])?;
        let total = summaries.len();
        for (round, summary) in &summaries {
            writer.write_record([
                round.to_string(),
                match summary.kind {
                    RoundKind::Win => "win".to_string(),
                    RoundKind::Lose => "lose".to_string(),
                },
                summary.bet.to_string(),
                summary.mine_count.to_string(),
                summary.safe_picks.to_string(),
                summary
                    .multiplier
                    .map(|m| m.to_string())
                    .unwrap_or_default(),
                summary.payout.to_string(),
                summary.lost_amount.to_string(),
            ])?;
        }
        writer.flush()?;
        println!("Exported {total} rows to {path}");
    }

    Ok(())
}

fn verify(server_seed: &str, client_seed: &str, nonce: u64, mines: usize, expected: &[usize]) {
    println!(
        "server_seed_hash={}",
        derive_hash_hex(server_seed.as_bytes())
    );
    let layout = mines_for_seeds(server_seed, client_seed, nonce, mines);
    println!("mine layout for nonce {nonce}: {layout:?}");
    if !expected.is_empty() {
        if verify_mines(server_seed, client_seed, nonce, mines, expected) {
            println!("claimed layout matches");
        } else {
            println!("claimed layout does NOT match");
        }
    }
}
