// Line protocol between the session host and its client.
//
// Each stdin line is one JSON `SessionCommand`, tagged by `command`. Each
// stdout line is one JSON `SessionResponse`, tagged by `type`.

use nexus_draft::engine::{DraftAnalysis, Recommendation, SimulatedDraft, WinProbability};
use nexus_draft::{ChampionSummary, DraftError, DraftState, Phase, Side, TeamSelections};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Commands (client -> host)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SessionCommand {
    /// Start a session. Supplying selections resumes a draft already in
    /// progress; the phase and turn are derived from the schedule.
    Create {
        #[serde(default)]
        team1: Option<TeamSelections>,
        #[serde(default)]
        team2: Option<TeamSelections>,
    },
    Apply {
        session_id: String,
        phase: Phase,
        side: Side,
        champion: String,
    },
    State {
        session_id: String,
    },
    Evaluate {
        session_id: String,
    },
    Recommend {
        session_id: String,
        #[serde(default)]
        limit: Option<usize>,
    },
    Legal {
        session_id: String,
    },
    Analyze {
        session_id: String,
        #[serde(default)]
        limit: Option<usize>,
    },
    Simulate {
        session_id: String,
    },
    /// Corpus statistics for every known champion.
    Champions,
    /// Ids of every open session.
    Sessions,
    Close {
        session_id: String,
    },
    Quit,
}

impl SessionCommand {
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }

    /// The session a command targets, if any.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            SessionCommand::Apply { session_id, .. }
            | SessionCommand::State { session_id }
            | SessionCommand::Evaluate { session_id }
            | SessionCommand::Recommend { session_id, .. }
            | SessionCommand::Legal { session_id }
            | SessionCommand::Analyze { session_id, .. }
            | SessionCommand::Simulate { session_id }
            | SessionCommand::Close { session_id } => Some(session_id),
            SessionCommand::Create { .. }
            | SessionCommand::Champions
            | SessionCommand::Sessions
            | SessionCommand::Quit => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Responses (host -> client)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Rejected draft action or a state that does not fit the schedule.
    InvalidAction,
    /// The draft has no open slots left.
    DraftComplete,
    UnknownSession,
    /// The command line could not be parsed.
    BadRequest,
    /// Storage failure; the command had no effect.
    Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionResponse {
    Created {
        session_id: String,
        state: DraftState,
        slot_description: String,
    },
    Applied {
        session_id: String,
        state: DraftState,
        slot_description: String,
    },
    State {
        session_id: String,
        state: DraftState,
        slot_description: String,
    },
    Evaluation {
        session_id: String,
        win_probability: WinProbability,
    },
    Recommendations {
        session_id: String,
        recommendations: Vec<Recommendation>,
    },
    LegalActions {
        session_id: String,
        champions: Vec<String>,
    },
    Analysis {
        session_id: String,
        analysis: Box<DraftAnalysis>,
    },
    Simulation {
        session_id: String,
        simulation: Box<SimulatedDraft>,
    },
    Champions {
        champions: Vec<ChampionSummary>,
    },
    Sessions {
        session_ids: Vec<String>,
    },
    Closed {
        session_id: String,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
        kind: ErrorKind,
        message: String,
    },
}

impl SessionResponse {
    pub fn error(session_id: Option<&str>, kind: ErrorKind, message: impl Into<String>) -> Self {
        SessionResponse::Error {
            session_id: session_id.map(str::to_string),
            kind,
            message: message.into(),
        }
    }

    pub fn from_draft_error(session_id: &str, err: &DraftError) -> Self {
        let kind = match err {
            DraftError::DraftComplete => ErrorKind::DraftComplete,
            e if e.is_invalid_action() => ErrorKind::InvalidAction,
            _ => ErrorKind::Internal,
        };
        Self::error(Some(session_id), kind, err.to_string())
    }

    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_apply_command() {
        let line = r#"{"command":"apply","session_id":"s1","phase":"ban","side":"team2","champion":"Zed"}"#;
        let cmd = SessionCommand::from_json_line(line).unwrap();
        assert_eq!(
            cmd,
            SessionCommand::Apply {
                session_id: "s1".into(),
                phase: Phase::Ban,
                side: Side::Team2,
                champion: "Zed".into(),
            }
        );
        assert_eq!(cmd.session_id(), Some("s1"));
    }

    #[test]
    fn optional_fields_default() {
        let cmd = SessionCommand::from_json_line(r#"{"command":"recommend","session_id":"s1"}"#)
            .unwrap();
        assert_eq!(
            cmd,
            SessionCommand::Recommend {
                session_id: "s1".into(),
                limit: None
            }
        );
        let cmd = SessionCommand::from_json_line(r#"{"command":"create"}"#).unwrap();
        assert_eq!(
            cmd,
            SessionCommand::Create {
                team1: None,
                team2: None
            }
        );
        assert_eq!(cmd.session_id(), None);

        let cmd = SessionCommand::from_json_line(r#"{"command":"sessions"}"#).unwrap();
        assert_eq!(cmd, SessionCommand::Sessions);
        assert_eq!(cmd.session_id(), None);
    }

    #[test]
    fn create_with_selections() {
        let line = r#"{"command":"create","team1":{"picks":["Ahri"]},"team2":{"bans":["Zed"]}}"#;
        let SessionCommand::Create { team1, team2 } = SessionCommand::from_json_line(line).unwrap()
        else {
            panic!("expected create");
        };
        assert_eq!(team1.unwrap().picks, vec!["Ahri"]);
        assert_eq!(team2.unwrap().bans, vec!["Zed"]);
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(SessionCommand::from_json_line(r#"{"command":"undo"}"#).is_err());
        assert!(SessionCommand::from_json_line("not json").is_err());
    }

    #[test]
    fn error_response_serialization() {
        let resp = SessionResponse::from_draft_error(
            "s1",
            &DraftError::ChampionUnavailable {
                champion: "Ahri".into(),
            },
        );
        let json: serde_json::Value =
            serde_json::from_str(&resp.to_json_line().unwrap()).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["kind"], "invalid_action");
        assert_eq!(json["session_id"], "s1");

        let resp = SessionResponse::error(None, ErrorKind::BadRequest, "bad");
        let json: serde_json::Value =
            serde_json::from_str(&resp.to_json_line().unwrap()).unwrap();
        assert!(json.get("session_id").is_none());
    }

    #[test]
    fn schedule_errors_are_internal() {
        let resp = SessionResponse::from_draft_error(
            "s1",
            &DraftError::InvalidFormat {
                message: "empty schedule".into(),
            },
        );
        assert!(matches!(
            resp,
            SessionResponse::Error {
                kind: ErrorKind::Internal,
                ..
            }
        ));
    }

    #[test]
    fn draft_complete_has_its_own_kind() {
        let resp = SessionResponse::from_draft_error("s1", &DraftError::DraftComplete);
        assert!(matches!(
            resp,
            SessionResponse::Error {
                kind: ErrorKind::DraftComplete,
                ..
            }
        ));
    }
}
