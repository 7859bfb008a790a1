use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use uuid::Uuid;

use cobrinha_core::{
    EngineError, FairSource, GameSession, RevealOutcome, RoundKind, StartOutcome, DEFAULT_BALANCE,
};
use cobrinha_shared::{
    CashOutResponse, CreateSessionRequest, ErrorResponse, HistoryEntry, HistoryResponse,
    RecordKind, RevealKind, RevealRequest, RevealResponse, SessionResponse, StartRoundRequest,
    StartRoundResponse, StateResponse, ValidationKind, VerifyResponse,
};

// One engine + ledger per session id; nothing is persisted, restarting the
// process resets every session (the browser-reload semantics of the game).
struct Session {
    game: GameSession,
    server_seed_hash: String,
    rounds_started: u64,
}

#[derive(Clone, Default)]
struct AppState {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
}

#[derive(Debug, thiserror::Error)]
enum ServerError {
    #[error("session not found")]
    SessionNotFound,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

fn validation_kind(err: &EngineError) -> ValidationKind {
    match err {
        EngineError::InvalidBet => ValidationKind::InvalidBet,
        EngineError::InsufficientBalance => ValidationKind::InsufficientBalance,
        EngineError::InvalidMineCount => ValidationKind::InvalidMineCount,
        EngineError::RoundNotActive => ValidationKind::RoundNotActive,
        EngineError::NoSafePicksYet => ValidationKind::NoSafePicksYet,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::SessionNotFound => StatusCode::NOT_FOUND.into_response(),
            ServerError::Engine(err) => {
                let body = ErrorResponse {
                    kind: validation_kind(&err),
                    message: err.to_string(),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
        }
    }
}

fn with_session<T>(
    state: &AppState,
    id: &str,
    f: impl FnOnce(&mut Session) -> Result<T, ServerError>,
) -> Result<T, ServerError> {
    let id = Uuid::parse_str(id).map_err(|_| ServerError::SessionNotFound)?;
    let mut sessions = state.sessions.lock().expect("session table lock");
    let session = sessions.get_mut(&id).ok_or(ServerError::SessionNotFound)?;
    f(session)
}

async fn route_create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> Json<SessionResponse> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let server_seed: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    let client_seed = req.client_seed.unwrap_or_else(|| "cobrinha".to_string());
    let balance = req.balance.unwrap_or(DEFAULT_BALANCE);

    let fair = FairSource::new(server_seed, client_seed);
    let server_seed_hash = fair.server_seed_hash_hex();
    let game = GameSession::with_source(balance, Box::new(fair));

    let id = Uuid::new_v4();
    state.sessions.lock().expect("session table lock").insert(
        id,
        Session {
            game,
            server_seed_hash: server_seed_hash.clone(),
            rounds_started: 0,
        },
    );
    info!(session = %id, balance, "session created");

    Json(SessionResponse {
        session_id: id.to_string(),
        server_seed_hash,
        balance,
    })
}

async fn route_start_round(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StartRoundRequest>,
) -> Result<Json<StartRoundResponse>, ServerError> {
    with_session(&state, &id, |session| {
        let outcome = session.game.configure_round(req.bet, req.mine_count)?;
        let started = matches!(outcome, StartOutcome::Started(_));
        if started {
            session.rounds_started += 1;
        }
        let engine = session.game.engine();
        Ok(Json(StartRoundResponse {
            bet: engine.config().bet,
            mine_count: engine.config().mine_count,
            nonce: session.rounds_started,
            balance: engine.balance(),
            started,
        }))
    })
}

async fn route_reveal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RevealRequest>,
) -> Result<Json<RevealResponse>, ServerError> {
    with_session(&state, &id, |session| {
        let outcome = session.game.reveal(req.index);
        let engine = session.game.engine();
        let base = RevealResponse {
            outcome: RevealKind::Ignored,
            safe_picks: engine.safe_picks(),
            multiplier: engine.multiplier(),
            profit: engine.profit(),
            mine_indices: None,
            balance: engine.balance(),
        };
        let response = match outcome {
            RevealOutcome::Safe {
                safe_picks,
                multiplier,
                profit,
            } => RevealResponse {
                outcome: RevealKind::Safe,
                safe_picks,
                multiplier,
                profit,
                ..base
            },
            RevealOutcome::Mine { mine_indices, .. } => RevealResponse {
                outcome: RevealKind::Mine,
                mine_indices: Some(mine_indices),
                ..base
            },
            RevealOutcome::Ignored(_) => base,
        };
        Ok(Json(response))
    })
}

async fn route_cash_out(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CashOutResponse>, ServerError> {
    with_session(&state, &id, |session| {
        let cash = session.game.cash_out()?;
        info!(session = %id, payout = cash.payout, "cash out");
        Ok(Json(CashOutResponse {
            payout: cash.payout,
            balance: cash.balance,
        }))
    })
}

async fn route_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StateResponse>, ServerError> {
    with_session(&state, &id, |session| {
        let engine = session.game.engine();
        Ok(Json(StateResponse {
            active: engine.is_active(),
            balance: engine.balance(),
            bet: engine.config().bet,
            mine_count: engine.config().mine_count,
            safe_picks: engine.safe_picks(),
            multiplier: engine.multiplier(),
            profit: engine.profit(),
            revealed: engine
                .board()
                .map(|b| b.revealed_indices())
                .unwrap_or_default(),
        }))
    })
}

fn history_entry(record: &cobrinha_core::ResultRecord) -> HistoryEntry {
    HistoryEntry {
        id: record.id.clone(),
        ts: record.timestamp,
        kind: match record.kind {
            RoundKind::Win => RecordKind::Win,
            RoundKind::Lose => RecordKind::Lose,
        },
        bet: record.bet,
        mine_count: record.mine_count,
        safe_picks: record.safe_picks,
        multiplier: record.multiplier,
        payout: record.payout,
        lost_amount: record.lost_amount,
    }
}

async fn route_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, ServerError> {
    with_session(&state, &id, |session| {
        Ok(Json(HistoryResponse {
            records: session.game.ledger().list().iter().map(history_entry).collect(),
        }))
    })
}

async fn route_verify(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VerifyResponse>, ServerError> {
    with_session(&state, &id, |session| {
        Ok(Json(VerifyResponse {
            server_seed_hash: session.server_seed_hash.clone(),
        }))
    })
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/session", post(route_create_session))
        .route("/session/:id/round", post(route_start_round))
        .route("/session/:id/reveal", post(route_reveal))
        .route("/session/:id/cashout", post(route_cash_out))
        .route("/session/:id/state", get(route_state))
        .route("/session/:id/history", get(route_history))
        .route("/session/:id/verify", get(route_verify))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let app = router(AppState::default());
    let addr = std::env::var("BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
