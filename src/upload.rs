//! Score submission payload and leaderboard cache merge.
//!
//! The actual transport is an external collaborator; this module only
//! produces the signed JSON body and keeps the local cache coherent. The
//! signature is a keyed SHA-256 over `name|score|timestamp|salt` with a
//! client-embedded salt — tamper-evidence for honest clients, nothing more,
//! and deliberately left that way.

use crate::session::{AuditSummary, MatchEntry, SkillEntry};
use crate::store::RankRow;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

/// Shared with the backend's verifier. Embedded in the client, so anyone
/// reading this source can forge scores; a known weakness.
const SECRET_SALT: &str = "t3N#sum!gR1d_qv7&Lk0^bag$Xc4*combo9";

/// Rows kept when merging a result into the cached leaderboard.
const RANK_LIMIT: usize = 10;

/// The JSON body an upload transport would POST.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub name: String,
    pub score: u32,
    pub timestamp: u64,
    pub sign: String,
    pub audit_matches: Vec<MatchEntry>,
    pub audit_skills: Vec<SkillEntry>,
}

/// Hex SHA-256 over `name|score|timestamp|salt`.
pub fn signature(name: &str, score: u32, timestamp_ms: u64) -> String {
    let msg = format!("{name}|{score}|{timestamp_ms}|{SECRET_SALT}");
    hex::encode(Sha256::digest(msg.as_bytes()))
}

/// Stamp and sign a finished session's summary.
pub fn build_submission(summary: &AuditSummary) -> Submission {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    Submission {
        sign: signature(&summary.name, summary.score, timestamp),
        name: summary.name.clone(),
        score: summary.score,
        timestamp,
        audit_matches: summary.match_log.clone(),
        audit_skills: summary.skill_log.clone(),
    }
}

pub fn to_json(submission: &Submission) -> serde_json::Result<String> {
    serde_json::to_string(submission)
}

/// Merge a finished score into the cached rows: best score per name wins,
/// sorted descending, truncated. This is also the NetworkError fallback —
/// the result screen always has something to show.
pub fn merge_into_cache(mut rows: Vec<RankRow>, name: &str, score: u32) -> Vec<RankRow> {
    if let Some(existing) = rows.iter_mut().find(|r| r.name == name) {
        existing.score = existing.score.max(score);
    } else {
        rows.push(RankRow {
            name: name.to_string(),
            score,
        });
    }
    rows.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
    rows.truncate(RANK_LIMIT);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_shape_and_determinism() {
        let a = signature("ada", 1200, 1_700_000_000_000);
        let b = signature("ada", 1200, 1_700_000_000_000);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_signature_binds_every_field() {
        let base = signature("ada", 1200, 1000);
        assert_ne!(base, signature("adb", 1200, 1000));
        assert_ne!(base, signature("ada", 1201, 1000));
        assert_ne!(base, signature("ada", 1200, 1001));
    }

    #[test]
    fn test_submission_json_shape() {
        let summary = AuditSummary {
            name: "ada".into(),
            score: 300,
            duration_ms: 45_000,
            match_log: Vec::new(),
            skill_log: Vec::new(),
        };
        let sub = build_submission(&summary);
        assert_eq!(sub.sign, signature("ada", 300, sub.timestamp));
        let json = to_json(&sub).unwrap();
        assert!(json.contains("\"name\":\"ada\""));
        assert!(json.contains("\"score\":300"));
        assert!(json.contains("\"sign\":"));
        assert!(json.contains("\"audit_skills\":"));
    }

    #[test]
    fn test_merge_keeps_best_per_name_sorted_and_bounded() {
        let rows = vec![
            RankRow {
                name: "ada".into(),
                score: 500,
            },
            RankRow {
                name: "bob".into(),
                score: 900,
            },
        ];
        let merged = merge_into_cache(rows, "ada", 1200);
        assert_eq!(merged[0].name, "ada");
        assert_eq!(merged[0].score, 1200);
        assert_eq!(merged[1].name, "bob");

        // Lower re-submission never demotes a stored best.
        let merged = merge_into_cache(merged, "ada", 100);
        assert_eq!(merged[0].score, 1200);

        // Cache stays bounded.
        let mut many = Vec::new();
        for i in 0..20 {
            many = merge_into_cache(many, &format!("p{i}"), i);
        }
        assert_eq!(many.len(), 10);
    }
}
