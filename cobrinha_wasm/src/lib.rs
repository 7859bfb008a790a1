use wasm_bindgen::prelude::*;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use cobrinha_core::{
    Cell, EngineError, GameSession, IgnoreReason, ResultRecord, RevealOutcome, RoundKind,
    StartOutcome, BOARD_SIZE, MAX_MINES, MIN_MINES,
};

const BET_MIN: f64 = 1.0;
const BET_STEP: f64 = 1.0;

fn error_status(err: &EngineError) -> &'static str {
    match err {
        EngineError::InvalidBet => "Invalid bet amount.",
        EngineError::InsufficientBalance => "Not enough balance.",
        EngineError::InvalidMineCount => "Snakes count must be between 1 and 24.",
        EngineError::RoundNotActive => "No round in progress.",
        EngineError::NoSafePicksYet => "Open at least one safe tile before cashing out.",
    }
}

// Everything the view needs, pulled out of the session in one borrow so the
// html! block never touches the RefCell.
#[derive(Clone)]
struct Snapshot {
    balance: f64,
    active: bool,
    safe_picks: u32,
    multiplier: f64,
    profit: f64,
    cells: Vec<Cell>,
    lost: bool,
    records: Vec<ResultRecord>,
    selected: Option<ResultRecord>,
}

fn snapshot(session: &GameSession) -> Snapshot {
    let engine = session.engine();
    let cells = engine
        .board()
        .map(|b| b.cells().to_vec())
        .unwrap_or_else(|| {
            vec![
                Cell {
                    is_mine: false,
                    revealed: false,
                };
                BOARD_SIZE
            ]
        });
    let lost = !engine.is_active() && cells.iter().any(|c| c.is_mine && c.revealed);
    Snapshot {
        balance: engine.balance(),
        active: engine.is_active(),
        safe_picks: engine.safe_picks(),
        multiplier: engine.multiplier(),
        profit: engine.profit(),
        cells,
        lost,
        records: session.ledger().list().to_vec(),
        selected: session.ledger().selected().cloned(),
    }
}

#[function_component(App)]
fn app() -> Html {
    let session = use_mut_ref(GameSession::default);
    let view = use_state(|| snapshot(&session.borrow()));
    let status = use_state(|| "Set your bet and start the round.".to_string());
    let bet = use_state(|| 10.0f64);
    let mines = use_state(|| 3usize);

    let on_start = {
        let session = session.clone();
        let view = view.clone();
        let status = status.clone();
        let bet = bet.clone();
        let mines = mines.clone();
        Callback::from(move |_| {
            let message = match session.borrow_mut().configure_round(*bet, *mines) {
                Ok(StartOutcome::Started(_)) => "Round started. Pick a tile.".to_string(),
                Ok(StartOutcome::Ignored) => "A round is already running.".to_string(),
                Err(err) => error_status(&err).to_string(),
            };
            view.set(snapshot(&session.borrow()));
            status.set(message);
        })
    };

    let on_cash_out = {
        let session = session.clone();
        let view = view.clone();
        let status = status.clone();
        Callback::from(move |_| {
            let message = match session.borrow_mut().cash_out() {
                Ok(cash) => format!("Cashed out! You won {:.2}.", cash.payout),
                Err(err) => error_status(&err).to_string(),
            };
            view.set(snapshot(&session.borrow()));
            status.set(message);
        })
    };

    let on_tile = {
        let session = session.clone();
        let view = view.clone();
        let status = status.clone();
        Callback::from(move |index: usize| {
            let outcome = session.borrow_mut().reveal(index);
            match outcome {
                RevealOutcome::Safe { multiplier, .. } => {
                    status.set(format!("Safe pick! Multiplier: {multiplier:.2}x"));
                }
                RevealOutcome::Mine { .. } => {
                    status.set("Boom! You hit a snake.".to_string());
                }
                RevealOutcome::Ignored(IgnoreReason::NotActive) => {
                    status.set("Press START GAME to begin.".to_string());
                }
                RevealOutcome::Ignored(_) => {}
            }
            view.set(snapshot(&session.borrow()));
        })
    };

    let on_select = {
        let session = session.clone();
        let view = view.clone();
        Callback::from(move |id: String| {
            session.borrow_mut().ledger_mut().select(&id);
            view.set(snapshot(&session.borrow()));
        })
    };

    let set_bet = {
        let bet = bet.clone();
        move |value: f64| bet.set(if value.is_finite() { value.max(BET_MIN) } else { BET_MIN })
    };

    let on_bet_input = {
        let set_bet = set_bet.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            set_bet(input.value().parse().unwrap_or(BET_MIN));
        })
    };

    let on_mines_input = {
        let mines = mines.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let value: usize = input.value().parse().unwrap_or(MIN_MINES);
            mines.set(value.clamp(MIN_MINES, MAX_MINES));
        })
    };

    let bet_minus = {
        let set_bet = set_bet.clone();
        let bet = bet.clone();
        Callback::from(move |_| set_bet(*bet - BET_STEP))
    };
    let bet_plus = {
        let set_bet = set_bet.clone();
        let bet = bet.clone();
        Callback::from(move |_| set_bet(*bet + BET_STEP))
    };
    let bet_half = {
        let set_bet = set_bet.clone();
        let bet = bet.clone();
        Callback::from(move |_| set_bet((*bet / 2.0).floor()))
    };
    let bet_double = {
        let set_bet = set_bet.clone();
        let bet = bet.clone();
        Callback::from(move |_| set_bet(*bet * 2.0))
    };
    let mines_minus = {
        let mines = mines.clone();
        Callback::from(move |_| mines.set((*mines).saturating_sub(1).max(MIN_MINES)))
    };
    let mines_plus = {
        let mines = mines.clone();
        Callback::from(move |_| mines.set((*mines + 1).min(MAX_MINES)))
    };

    let tiles = (0..BOARD_SIZE).map(|index| {
        let cell = view.cells[index];
        let show_mine = (cell.revealed || view.lost) && cell.is_mine;
        let class = classes!(
            "tile",
            cell.revealed.then_some("revealed"),
            (cell.revealed && !cell.is_mine).then_some("safe"),
            show_mine.then_some("mine"),
        );
        let onclick = {
            let on_tile = on_tile.clone();
            Callback::from(move |_| on_tile.emit(index))
        };
        html! {
            <button key={index} {class} {onclick}>
                { if show_mine { "S" } else if cell.revealed { "o" } else { "" } }
            </button>
        }
    });

    let history = view.records.iter().map(|record| {
        let active = view
            .selected
            .as_ref()
            .map(|s| s.id == record.id)
            .unwrap_or(false);
        let class = classes!(
            "result-cart",
            match record.kind {
                RoundKind::Win => "win",
                RoundKind::Lose => "loss",
            },
            active.then_some("active"),
        );
        let onclick = {
            let on_select = on_select.clone();
            let id = record.id.clone();
            Callback::from(move |_| on_select.emit(id.clone()))
        };
        let label = match record.kind {
            RoundKind::Win => "W",
            RoundKind::Lose => "L",
        };
        html! { <button key={record.id.clone()} {class} {onclick}>{ label }</button> }
    });

    html! {
        <div class="app-shell">
            <h1>{ "Cobrinha" }</h1>
            <p class="status">{ (*status).clone() }</p>
            <div class="stats">
                <span>{ format!("Balance: {:.2}", view.balance) }</span>
                <span>{ format!("Multiplier: {:.2}x", view.multiplier) }</span>
                <span>{ format!("Profit: {:.2}", view.profit) }</span>
                <span>{ format!("Safe picks: {}", view.safe_picks) }</span>
            </div>
            <div class="controls">
                <div class="bet-bar">
                    <button onclick={bet_minus} disabled={*bet <= BET_MIN}>{ "-" }</button>
                    <input type="number" value={bet.to_string()} onchange={on_bet_input} />
                    <button onclick={bet_plus}>{ "+" }</button>
                    <button onclick={bet_half}>{ "1/2" }</button>
                    <button onclick={bet_double}>{ "2x" }</button>
                </div>
                <div class="mines-bar">
                    <button onclick={mines_minus} disabled={*mines <= MIN_MINES}>{ "-" }</button>
                    <input type="number" value={mines.to_string()} onchange={on_mines_input} />
                    <button onclick={mines_plus} disabled={*mines >= MAX_MINES}>{ "+" }</button>
                </div>
                <button class="start" onclick={on_start} disabled={view.active}>
                    { "START GAME" }
                </button>
                <button class="cashout" onclick={on_cash_out} disabled={!view.active || view.safe_picks == 0}>
                    { "CASH OUT" }
                </button>
            </div>
            <div class="grid">{ for tiles }</div>
            <div class="rail-carts">{ for history }</div>
            if let Some(record) = &view.selected {
                <div class="history-popup">
                    <div>{ if record.kind == RoundKind::Win { "Result: WIN" } else { "Result: LOSS" } }</div>
                    <div>{ format!("Bet: ${:.2}", record.bet) }</div>
                    <div>{ format!("Snakes: {}", record.mine_count) }</div>
                    <div>{ format!("Safe picks: {}", record.safe_picks) }</div>
                    <div>{ match record.multiplier {
                        Some(m) => format!("Multiplier: {m:.2}x"),
                        None => "Multiplier: —".to_string(),
                    } }</div>
                    <div>{ if record.kind == RoundKind::Win {
                        format!("Payout: ${:.2}", record.payout)
                    } else {
                        format!("Loss: ${:.2}", record.lost_amount)
                    } }</div>
                </div>
            }
        </div>
    }
}

#[wasm_bindgen(start)]
pub fn run() {
    yew::Renderer::<App>::new().render();
}
