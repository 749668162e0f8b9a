// Historical draft corpus: completed-draft records produced by ingestion.

use serde::{Deserialize, Serialize};

use crate::draft::slot::Side;

/// Picks and bans made by one side in a completed draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDraft {
    #[serde(default)]
    pub picks: Vec<String>,
    #[serde(default)]
    pub bans: Vec<String>,
}

impl TeamDraft {
    pub fn new<P, B>(picks: P, bans: B) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        TeamDraft {
            picks: picks.into_iter().map(Into::into).collect(),
            bans: bans.into_iter().map(Into::into).collect(),
        }
    }
}

/// One historical draft with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedDraft {
    /// Source match identifier, when ingestion provides one.
    #[serde(default)]
    pub match_id: Option<String>,
    pub team1: TeamDraft,
    pub team2: TeamDraft,
    pub winner: Side,
}

impl CompletedDraft {
    pub fn new(team1: TeamDraft, team2: TeamDraft, winner: Side) -> Self {
        CompletedDraft {
            match_id: None,
            team1,
            team2,
            winner,
        }
    }

    pub fn team(&self, side: Side) -> &TeamDraft {
        match side {
            Side::Team1 => &self.team1,
            Side::Team2 => &self.team2,
        }
    }

    pub fn won(&self, side: Side) -> bool {
        self.winner == side
    }

    /// Every champion name in the record, in the order the pool interns them:
    /// team1 picks, team1 bans, team2 picks, team2 bans.
    pub fn champions(&self) -> impl Iterator<Item = &str> {
        self.team1
            .picks
            .iter()
            .chain(&self.team1.bans)
            .chain(&self.team2.picks)
            .chain(&self.team2.bans)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_missing_bans_and_match_id() {
        let json = r#"{
            "team1": {"picks": ["Ahri", "Lee Sin"]},
            "team2": {"picks": ["Zed"], "bans": ["Yasuo"]},
            "winner": "team2"
        }"#;
        let draft: CompletedDraft = serde_json::from_str(json).unwrap();
        assert!(draft.match_id.is_none());
        assert!(draft.team1.bans.is_empty());
        assert_eq!(draft.team2.bans, vec!["Yasuo"]);
        assert!(draft.won(Side::Team2));
        assert!(!draft.won(Side::Team1));
    }

    #[test]
    fn champions_iterates_in_intern_order() {
        let draft = CompletedDraft::new(
            TeamDraft::new(["A", "B"], ["X"]),
            TeamDraft::new(["C"], ["Y"]),
            Side::Team1,
        );
        let names: Vec<&str> = draft.champions().collect();
        assert_eq!(names, vec!["A", "B", "X", "C", "Y"]);
    }
}
