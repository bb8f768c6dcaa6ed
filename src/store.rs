//! Local persistence: saved player name, personal best, and the cached
//! leaderboard (XDG config or ~/.config/maketen). The session core never
//! touches this; the app reads at startup and writes on change.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

const NAME_FILE: &str = "player";
const BEST_FILE: &str = "best";
const RANK_FILE: &str = "leaderboard.json";
const SUBMISSION_FILE: &str = "last_submission.json";

/// One cached leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankRow {
    pub name: String,
    pub score: u32,
}

/// Config directory for this game (config dir / maketen).
fn config_dir() -> Result<PathBuf> {
    let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if xdg.is_empty() {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".config")
        } else {
            PathBuf::from(xdg)
        }
    } else {
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from("."))
    };
    Ok(base.join("maketen"))
}

/// Saved player name; empty string on missing/unreadable file.
pub fn load_name() -> String {
    config_dir()
        .ok()
        .and_then(|d| fs::read_to_string(d.join(NAME_FILE)).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

pub fn save_name(name: &str) -> Result<()> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir)?;
    let mut f = fs::File::create(dir.join(NAME_FILE))?;
    writeln!(f, "{}", name.trim())?;
    Ok(())
}

/// Personal best score; 0 on missing/parse error.
pub fn load_best() -> u32 {
    config_dir()
        .ok()
        .and_then(|d| fs::read_to_string(d.join(BEST_FILE)).ok())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

pub fn save_best(score: u32) -> Result<()> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir)?;
    let mut f = fs::File::create(dir.join(BEST_FILE))?;
    writeln!(f, "{}", score)?;
    Ok(())
}

/// Cached leaderboard rows; empty on missing/corrupt cache, never an error.
pub fn load_leaderboard() -> Vec<RankRow> {
    config_dir()
        .ok()
        .and_then(|d| fs::read_to_string(d.join(RANK_FILE)).ok())
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn save_leaderboard(rows: &[RankRow]) -> Result<()> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(rows)?;
    fs::write(dir.join(RANK_FILE), json)?;
    Ok(())
}

/// Drop zone for the external upload transport: the signed body of the most
/// recently finished session, overwritten each game.
pub fn save_submission(json: &str) -> Result<()> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir)?;
    fs::write(dir.join(SUBMISSION_FILE), json)?;
    Ok(())
}
