// Application state and the command loop.
//
// Receives `SessionCommand`s on a channel, applies them to the open sessions
// through the draft engine, persists accepted actions, and sends one
// `SessionResponse` back per command.

use nexus_draft::{DraftAction, DraftEngine, DraftState, TeamSelections};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::db::Database;
use crate::protocol::{ErrorKind, SessionCommand, SessionResponse};
use crate::session::{Session, SessionRegistry};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub config: Config,
    pub engine: DraftEngine,
    pub db: Database,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(config: Config, engine: DraftEngine, db: Database) -> Self {
        AppState {
            config,
            engine,
            db,
            sessions: SessionRegistry::new(),
        }
    }

    fn describe(&self, state: &DraftState) -> String {
        self.engine
            .sequence()
            .format()
            .describe(state.actions_taken())
    }

    /// A timestamp id not used by any session, open or closed.
    fn fresh_session_id(&self) -> anyhow::Result<String> {
        let base = Database::generate_session_id();
        let mut candidate = base.clone();
        let mut n = 1;
        while self.sessions.contains(&candidate) || self.db.session_exists(&candidate)? {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        Ok(candidate)
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run until the command channel closes, a `Quit` arrives, or the response
/// receiver goes away.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
    out_tx: mpsc::Sender<SessionResponse>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!(
        "Application loop started with {} open sessions",
        state.sessions.len()
    );

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        if let Some(response) = handle_command(&mut state, cmd) {
                            if out_tx.send(response).await.is_err() {
                                info!("Response channel closed, shutting down");
                                break;
                            }
                        }
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
            _ = out_tx.closed() => {
                info!("Response channel closed, shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Apply one command. Returns `None` only for `Quit`, which the loop handles.
pub fn handle_command(state: &mut AppState, cmd: SessionCommand) -> Option<SessionResponse> {
    if let Some(session_id) = cmd.session_id() {
        debug!("Command for session {}", session_id);
    }
    let response = match cmd {
        SessionCommand::Create { team1, team2 } => create_session(state, team1, team2),

        SessionCommand::Apply {
            session_id,
            phase,
            side,
            champion,
        } => apply_action(
            state,
            &session_id,
            DraftAction::new(phase, side, champion),
        ),

        SessionCommand::State { session_id } => with_session(state, &session_id, |state, s| {
            SessionResponse::State {
                session_id: session_id.clone(),
                slot_description: state.describe(&s.state),
                state: s.state.clone(),
            }
        }),

        SessionCommand::Evaluate { session_id } => {
            with_session(state, &session_id, |state, s| SessionResponse::Evaluation {
                session_id: session_id.clone(),
                win_probability: state.engine.evaluate(&s.state),
            })
        }

        SessionCommand::Recommend { session_id, limit } => {
            with_session(state, &session_id, |state, s| {
                let limit = limit.unwrap_or(state.config.default_limit);
                match state.engine.recommend(&s.state, limit) {
                    Ok(recommendations) => SessionResponse::Recommendations {
                        session_id: session_id.clone(),
                        recommendations,
                    },
                    Err(e) => SessionResponse::from_draft_error(&session_id, &e),
                }
            })
        }

        SessionCommand::Legal { session_id } => {
            with_session(state, &session_id, |state, s| SessionResponse::LegalActions {
                session_id: session_id.clone(),
                champions: state.engine.legal_actions(&s.state),
            })
        }

        SessionCommand::Analyze { session_id, limit } => {
            with_session(state, &session_id, |state, s| {
                let limit = limit.unwrap_or(state.config.default_limit);
                match state.engine.analyze(&s.state, limit) {
                    Ok(analysis) => SessionResponse::Analysis {
                        session_id: session_id.clone(),
                        analysis: Box::new(analysis),
                    },
                    Err(e) => SessionResponse::from_draft_error(&session_id, &e),
                }
            })
        }

        SessionCommand::Simulate { session_id } => {
            with_session(state, &session_id, |state, s| {
                match state.engine.simulate_to_completion(&s.state) {
                    Ok(simulation) => SessionResponse::Simulation {
                        session_id: session_id.clone(),
                        simulation: Box::new(simulation),
                    },
                    Err(e) => SessionResponse::from_draft_error(&session_id, &e),
                }
            })
        }

        SessionCommand::Champions => SessionResponse::Champions {
            champions: state.engine.models().champions(),
        },

        SessionCommand::Sessions => SessionResponse::Sessions {
            session_ids: state.sessions.ids(),
        },

        SessionCommand::Close { session_id } => close_session(state, &session_id),

        SessionCommand::Quit => return None,
    };
    Some(response)
}

fn with_session<F>(state: &AppState, session_id: &str, f: F) -> SessionResponse
where
    F: FnOnce(&AppState, &Session) -> SessionResponse,
{
    match state.sessions.get(session_id) {
        Some(session) => f(state, session),
        None => unknown_session(session_id),
    }
}

fn unknown_session(session_id: &str) -> SessionResponse {
    SessionResponse::error(
        Some(session_id),
        ErrorKind::UnknownSession,
        format!("no open session `{session_id}`"),
    )
}

fn create_session(
    state: &mut AppState,
    team1: Option<TeamSelections>,
    team2: Option<TeamSelections>,
) -> SessionResponse {
    let resumed = team1.is_some() || team2.is_some();
    let initial = if resumed {
        match state
            .engine
            .sequence()
            .resume(team1.unwrap_or_default(), team2.unwrap_or_default())
        {
            Ok(s) => s,
            Err(e) => {
                warn!("Rejected session selections: {}", e);
                return SessionResponse::error(None, ErrorKind::InvalidAction, e.to_string());
            }
        }
    } else {
        state.engine.start()
    };

    let session_id = match state.fresh_session_id() {
        Ok(id) => id,
        Err(e) => return SessionResponse::error(None, ErrorKind::Internal, e.to_string()),
    };
    let stored_initial = resumed.then_some(&initial);
    if let Err(e) = state.db.create_session(&session_id, stored_initial) {
        warn!("Failed to persist session {}: {:#}", session_id, e);
        return SessionResponse::error(None, ErrorKind::Internal, e.to_string());
    }

    info!(
        "Session {} created at slot {}",
        session_id,
        initial.actions_taken()
    );
    let slot_description = state.describe(&initial);
    state.sessions.insert(session_id.clone(), Session::new(initial.clone()));

    SessionResponse::Created {
        session_id,
        state: initial,
        slot_description,
    }
}

fn apply_action(state: &mut AppState, session_id: &str, action: DraftAction) -> SessionResponse {
    let Some(session) = state.sessions.get(session_id) else {
        return unknown_session(session_id);
    };

    let next = match state.engine.apply(&session.state, &action) {
        Ok(next) => next,
        Err(e) => {
            warn!(
                "Session {}: rejected {} {} {}: {}",
                session_id, action.side, action.phase, action.champion, e
            );
            return SessionResponse::from_draft_error(session_id, &e);
        }
    };

    // Store the trimmed name the state actually holds.
    let stored = DraftAction::new(action.phase, action.side, action.champion.trim());
    if let Err(e) = state.db.record_action(session_id, session.recorded, &stored) {
        warn!("Session {}: failed to persist action: {:#}", session_id, e);
        return SessionResponse::error(Some(session_id), ErrorKind::Internal, e.to_string());
    }

    debug!(
        "Session {}: {} {} {}",
        session_id, stored.side, stored.phase, stored.champion
    );
    let slot_description = state.describe(&next);
    state.sessions.advance(session_id, next.clone());

    SessionResponse::Applied {
        session_id: session_id.to_string(),
        state: next,
        slot_description,
    }
}

fn close_session(state: &mut AppState, session_id: &str) -> SessionResponse {
    if state.sessions.remove(session_id).is_none() {
        return unknown_session(session_id);
    }
    if let Err(e) = state.db.close_session(session_id) {
        warn!("Session {}: failed to mark closed: {:#}", session_id, e);
    }
    info!("Session {} closed", session_id);
    SessionResponse::Closed {
        session_id: session_id.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Crash recovery
// ---------------------------------------------------------------------------

/// Rebuild every open session from the database by replaying its stored
/// actions. Sessions whose log no longer replays cleanly (for example after a
/// schedule change) are skipped with a warning. Returns the number restored.
pub fn recover_from_db(state: &mut AppState) -> anyhow::Result<usize> {
    let stored = state.db.open_sessions()?;
    if stored.is_empty() {
        info!("No open sessions in database, starting fresh");
        return Ok(0);
    }

    let sequence = state.engine.sequence().clone();
    let mut restored = 0;
    for session in stored {
        let actions = state.db.load_actions(&session.session_id)?;

        let start = match session.initial_state {
            Some(initial) => sequence.validate(&initial).map(|_| initial),
            None => Ok(sequence.start()),
        };
        let replayed = start.and_then(|mut current| {
            for action in &actions {
                current = sequence.apply(&current, action)?;
            }
            Ok(current)
        });

        match replayed {
            Ok(current) => {
                info!(
                    "Crash recovery: session {} restored with {} actions",
                    session.session_id,
                    actions.len()
                );
                state.sessions.insert(
                    session.session_id,
                    Session {
                        state: current,
                        recorded: actions.len(),
                    },
                );
                restored += 1;
            }
            Err(e) => {
                warn!(
                    "Crash recovery: skipping session {}: {}",
                    session.session_id, e
                );
            }
        }
    }

    info!("Crash recovery complete: {} sessions restored", restored);
    Ok(restored)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
