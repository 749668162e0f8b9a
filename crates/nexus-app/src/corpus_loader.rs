// Corpus loading: completed drafts from JSON or `|`-separated CSV files.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use nexus_draft::{CompletedDraft, Side, TeamDraft};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::{Config, CorpusFormat};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

/// One CSV row. Champion lists are `|`-separated; extra columns are ignored.
#[derive(Debug, Deserialize)]
struct RawDraftRow {
    #[serde(default)]
    match_id: Option<String>,
    #[serde(default)]
    team1_picks: String,
    #[serde(default)]
    team1_bans: String,
    #[serde(default)]
    team2_picks: String,
    #[serde(default)]
    team2_bans: String,
    winner: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn split_champions(field: &str) -> Vec<String> {
    field
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reject records no real draft could produce. Returns the reason.
fn check_record(draft: &CompletedDraft) -> Result<(), String> {
    if draft.team1.picks.is_empty() && draft.team2.picks.is_empty() {
        return Err("no picks on either side".into());
    }
    let mut seen = HashSet::new();
    for name in draft.champions() {
        let name = name.trim();
        if name.is_empty() {
            return Err("blank champion name".into());
        }
        if !seen.insert(name) {
            return Err(format!("champion '{name}' appears more than once"));
        }
    }
    Ok(())
}

fn label(draft: &CompletedDraft, index: usize) -> String {
    draft
        .match_id
        .clone()
        .unwrap_or_else(|| format!("#{index}"))
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

/// Parse a JSON array of draft records. Records that fail to deserialize or
/// are inconsistent are skipped with a warning.
pub fn load_json_from_reader<R: Read>(rdr: R) -> Result<Vec<CompletedDraft>, serde_json::Error> {
    let values: Vec<serde_json::Value> = serde_json::from_reader(rdr)?;
    let mut drafts = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<CompletedDraft>(value) {
            Ok(draft) => {
                if let Err(reason) = check_record(&draft) {
                    warn!("skipping draft {}: {}", label(&draft, index), reason);
                    continue;
                }
                drafts.push(draft);
            }
            Err(e) => {
                warn!("skipping malformed draft record #{}: {}", index, e);
            }
        }
    }
    Ok(drafts)
}

/// Parse CSV rows with columns `match_id, team1_picks, team1_bans,
/// team2_picks, team2_bans, winner`.
pub fn load_csv_from_reader<R: Read>(rdr: R) -> Result<Vec<CompletedDraft>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut drafts = Vec::new();
    for (index, result) in reader.deserialize::<RawDraftRow>().enumerate() {
        match result {
            Ok(raw) => {
                let Some(winner) = Side::from_str_side(&raw.winner) else {
                    warn!("skipping draft row #{}: unknown winner '{}'", index, raw.winner);
                    continue;
                };
                let mut draft = CompletedDraft::new(
                    TeamDraft::new(
                        split_champions(&raw.team1_picks),
                        split_champions(&raw.team1_bans),
                    ),
                    TeamDraft::new(
                        split_champions(&raw.team2_picks),
                        split_champions(&raw.team2_bans),
                    ),
                    winner,
                );
                draft.match_id = raw.match_id.filter(|id| !id.trim().is_empty());
                if let Err(reason) = check_record(&draft) {
                    warn!("skipping draft {}: {}", label(&draft, index), reason);
                    continue;
                }
                drafts.push(draft);
            }
            Err(e) => {
                warn!("skipping malformed draft row: {}", e);
            }
        }
    }
    Ok(drafts)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

pub fn load_corpus_file(
    path: &Path,
    format: CorpusFormat,
) -> Result<Vec<CompletedDraft>, CorpusError> {
    let file = std::fs::File::open(path).map_err(|e| CorpusError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let drafts = match format {
        CorpusFormat::Json => load_json_from_reader(file).map_err(|e| CorpusError::Json {
            path: path.display().to_string(),
            source: e,
        })?,
        CorpusFormat::Csv => load_csv_from_reader(file).map_err(|e| CorpusError::Csv {
            path: path.display().to_string(),
            source: e,
        })?,
    };
    info!("Loaded {} drafts from {}", drafts.len(), path.display());
    Ok(drafts)
}

/// Load the corpus named in the config. A missing file yields an empty
/// corpus, so the engine starts with neutral models.
pub fn load_corpus(config: &Config) -> Result<Vec<CompletedDraft>, CorpusError> {
    let path = Path::new(&config.corpus.path);
    if !path.exists() {
        warn!(
            "corpus file {} not found; starting with an empty corpus",
            path.display()
        );
        return Ok(Vec::new());
    }
    load_corpus_file(path, config.corpus.format)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
