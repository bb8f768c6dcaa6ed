//! Session state machine: countdown, timer, combo, scoring, rewards,
//! abilities and the append-only audit logs.

use crate::bag::{Bag, BagPolicy};
use crate::grid::{Coord, Grid, MAX_DIM};
use crate::{gravity, solver};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;

/// Longest accepted player name, in characters.
pub const MAX_NAME_LEN: usize = 16;
/// Countdown before play begins ("2 beats").
pub const COUNTDOWN_MS: u64 = 2000;
/// Seconds added to the clock per resolved match.
pub const MATCH_TIME_BONUS_SECS: u32 = 3;
/// Rolling combo window; a match re-arms it, expiry breaks the streak.
pub const COMBO_WINDOW_MS: u64 = 5000;
/// Combo depth from which the per-match combo bonus kicks in.
pub const COMBO_BONUS_MIN: u32 = 3;
/// Bonus points per combo step once past the threshold.
pub const COMBO_BONUS_STEP: u32 = 50;
/// Hard ceiling on a single match award.
pub const MATCH_POINTS_CEILING: u32 = 5000;
/// Flat bonus for emptying the board with a match.
pub const PERFECT_CLEAR_BONUS: u32 = 2000;
/// First reward threshold and its initial gap.
pub const FIRST_REWARD_SCORE: u32 = 1000;
/// The gap grows by this much after every reward, so each one is harder.
pub const REWARD_GAP_STEP: u32 = 500;
/// Seconds granted per reward.
pub const REWARD_TIME_BONUS_SECS: u32 = 5;
/// How long a hint highlight stays up before auto-clearing.
pub const HINT_DURATION_MS: u64 = 10_000;
/// Length of the freeze ability's pause.
pub const FREEZE_DURATION_MS: u64 = 5000;
/// Permutation attempts before a shuffle accepts an unsolved board.
pub const SHUFFLE_MAX_ATTEMPTS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Countdown,
    Active,
    Paused,
    Ended(EndReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EndReason {
    TimeUp,
    Deadlock,
    Abandoned,
}

/// Name validation failures at `start`; the session stays Idle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartError {
    #[error("player name must not be empty")]
    EmptyName,
    #[error("player name is longer than {max} characters")]
    NameTooLong { max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    Match,
    PerfectClear,
}

/// One scoring event, appended before any presentation side effect.
#[derive(Debug, Clone, Serialize)]
pub struct MatchEntry {
    pub at_ms: u64,
    pub points: u32,
    pub tile_values: Vec<u8>,
    pub kind: ActionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Skill {
    Hint,
    Shuffle,
    AutoShuffle,
    Delete,
    Wipe,
    Freeze,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SkillEntry {
    pub at_ms: u64,
    pub skill: Skill,
}

/// Discrete named events for the renderer/audio collaborators. The core
/// neither knows nor cares what a listener does with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    CountdownStarted,
    Started,
    Matched {
        count: usize,
        points: u32,
        combo: u32,
        cells: Vec<Coord>,
    },
    PerfectClear,
    ComboBroken,
    RewardReached { threshold: u32 },
    SkillUsed(Skill),
    Refilled,
    Ended(EndReason),
}

/// Read-only end-of-session summary for the result screen and the upload
/// collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct AuditSummary {
    pub name: String,
    pub score: u32,
    pub duration_ms: u64,
    pub match_log: Vec<MatchEntry>,
    pub skill_log: Vec<SkillEntry>,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub rows: usize,
    pub cols: usize,
    pub start_time_secs: u32,
    pub countdown_ms: u64,
    pub bag_policy: BagPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 16,
            start_time_secs: 60,
            countdown_ms: COUNTDOWN_MS,
            bag_policy: BagPolicy::default(),
        }
    }
}

/// Award for an `n`-tile match at combo depth `combo` (already incremented
/// for this match). Base 100 per tile, doubling for every tile beyond two,
/// plus the combo bonus, saturating at the per-event ceiling.
fn match_points(n: usize, combo: u32) -> u32 {
    let base = 100u32.saturating_mul(n as u32);
    let mult = 1u32 << (n.saturating_sub(2)).min(12) as u32;
    let combo_bonus = if combo >= COMBO_BONUS_MIN {
        COMBO_BONUS_STEP.saturating_mul(combo)
    } else {
        0
    };
    base.saturating_mul(mult)
        .saturating_add(combo_bonus)
        .min(MATCH_POINTS_CEILING)
}

/// The whole game state. Owns grid and bag; nothing else mutates score,
/// time or combo. All deferred effects (hint auto-clear, freeze
/// auto-resume, combo expiry) are deadlines counted down inside `tick`, so
/// a restart resets them structurally and a stale timer can never leak
/// into a fresh session.
#[derive(Debug)]
pub struct Session<R: Rng> {
    config: SessionConfig,
    phase: Phase,
    grid: Grid,
    bag: Bag<R>,
    rng: R,
    name: String,
    score: u32,
    time_left: u32,
    elapsed_ms: u64,
    timer_acc_ms: u64,
    countdown_left_ms: u64,
    freeze_left_ms: u64,
    combo: u32,
    combo_timer_ms: u64,
    refill_deferred: bool,
    hint_clear_at_ms: Option<u64>,
    hint_charges: u32,
    shuffle_charges: u32,
    bomb_available: bool,
    freeze_available: bool,
    delete_mode: bool,
    next_reward_score: u32,
    reward_gap: u32,
    match_log: Vec<MatchEntry>,
    skill_log: Vec<SkillEntry>,
    events: VecDeque<GameEvent>,
}

impl Session<rand::rngs::ThreadRng> {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_rng(config, rand::rng())
    }
}

impl<R: Rng + Clone> Session<R> {
    pub fn with_rng(mut config: SessionConfig, rng: R) -> Self {
        config.rows = config.rows.clamp(2, MAX_DIM);
        config.cols = config.cols.clamp(2, MAX_DIM);
        let mut bag = Bag::with_rng(config.bag_policy, rng.clone());
        let values = bag.deal(config.rows * config.cols);
        let grid = Grid::from_values(config.rows, config.cols, &values);
        Self {
            phase: Phase::Idle,
            grid,
            bag,
            rng,
            name: String::new(),
            score: 0,
            time_left: config.start_time_secs,
            elapsed_ms: 0,
            timer_acc_ms: 0,
            countdown_left_ms: 0,
            freeze_left_ms: 0,
            combo: 0,
            combo_timer_ms: 0,
            refill_deferred: false,
            hint_clear_at_ms: None,
            hint_charges: 1,
            shuffle_charges: 1,
            bomb_available: true,
            freeze_available: true,
            delete_mode: false,
            next_reward_score: FIRST_REWARD_SCORE,
            reward_gap: FIRST_REWARD_SCORE,
            match_log: Vec::new(),
            skill_log: Vec::new(),
            events: VecDeque::new(),
            config,
        }
    }
}

impl<R: Rng> Session<R> {
    /// Validate the name, reset every session field, deal a fresh board and
    /// enter Countdown. Safe to call over a finished (or abandoned) session;
    /// all pending deadlines die with the old state.
    pub fn start(&mut self, name: &str) -> Result<(), StartError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(StartError::EmptyName);
        }
        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(StartError::NameTooLong { max: MAX_NAME_LEN });
        }

        self.name = trimmed.to_string();
        self.score = 0;
        self.time_left = self.config.start_time_secs;
        self.elapsed_ms = 0;
        self.timer_acc_ms = 0;
        self.freeze_left_ms = 0;
        self.combo = 0;
        self.combo_timer_ms = 0;
        self.refill_deferred = false;
        self.hint_clear_at_ms = None;
        self.hint_charges = 1;
        self.shuffle_charges = 1;
        self.bomb_available = true;
        self.freeze_available = true;
        self.delete_mode = false;
        self.next_reward_score = FIRST_REWARD_SCORE;
        self.reward_gap = FIRST_REWARD_SCORE;
        self.match_log.clear();
        self.skill_log.clear();
        self.events.clear();

        self.deal_board();
        self.countdown_left_ms = self.config.countdown_ms;
        self.phase = Phase::Countdown;
        self.events.push_back(GameEvent::CountdownStarted);
        Ok(())
    }

    /// Deal a full board from the bag. If the deal is dead, permute in place
    /// (same bounded loop as the shuffle ability) so play can always begin
    /// with at least one move when one exists in the dealt multiset.
    fn deal_board(&mut self) {
        let n = self.config.rows * self.config.cols;
        let values = self.bag.deal(n);
        self.grid.replace_all(&values);
        if solver::find_match(&self.grid).is_none() {
            self.permute_until_solvable();
        }
        // Initial drop-in: deeper rows settle first.
        let rows = self.grid.rows();
        for coord in self.grid.coords().collect::<Vec<_>>() {
            if let Some(t) = self.grid.tile_mut(coord.row, coord.col) {
                t.fall_offset = -((rows - coord.row) as f32);
            }
        }
    }

    /// Advance game time. The caller owns the frame loop and feeds measured
    /// elapsed wall time; everything time-based in the session hangs off
    /// this single entry point.
    pub fn tick(&mut self, dt: Duration) {
        let dt_ms = dt.as_millis().min(u128::from(u64::MAX)) as u64;
        self.grid.settle(dt.as_secs_f32());
        match self.phase {
            Phase::Idle | Phase::Ended(_) => {}
            Phase::Countdown => {
                self.countdown_left_ms = self.countdown_left_ms.saturating_sub(dt_ms);
                if self.countdown_left_ms == 0 {
                    self.phase = Phase::Active;
                    self.events.push_back(GameEvent::Started);
                }
            }
            Phase::Paused => {
                self.freeze_left_ms = self.freeze_left_ms.saturating_sub(dt_ms);
                if self.freeze_left_ms == 0 {
                    self.phase = Phase::Active;
                }
            }
            Phase::Active => self.tick_active(dt_ms),
        }
    }

    fn tick_active(&mut self, dt_ms: u64) {
        self.elapsed_ms += dt_ms;

        // Countdown clock, whole seconds.
        self.timer_acc_ms += dt_ms;
        while self.timer_acc_ms >= 1000 {
            self.timer_acc_ms -= 1000;
            self.time_left = self.time_left.saturating_sub(1);
            if self.time_left == 0 {
                self.end(EndReason::TimeUp);
                return;
            }
        }

        // Combo decay; expiry performs any refill the streak deferred.
        if self.combo > 0 {
            if self.combo_timer_ms <= dt_ms {
                self.combo_timer_ms = 0;
                self.combo = 0;
                self.events.push_back(GameEvent::ComboBroken);
                if self.refill_deferred {
                    self.refill_deferred = false;
                    gravity::bulk_refill(&mut self.grid, &mut self.bag);
                    self.events.push_back(GameEvent::Refilled);
                    self.check_board();
                    if matches!(self.phase, Phase::Ended(_)) {
                        return;
                    }
                }
            } else {
                self.combo_timer_ms -= dt_ms;
            }
        }

        // Hint highlight auto-clear.
        if let Some(at) = self.hint_clear_at_ms {
            if self.elapsed_ms >= at {
                self.grid.clear_hints();
                self.hint_clear_at_ms = None;
            }
        }
    }

    /// Replace the current selection (drag interpreter output). Ignored
    /// outside Active play or while the bomb is armed.
    pub fn apply_selection(&mut self, coords: &[Coord]) {
        if self.phase == Phase::Active && !self.delete_mode {
            self.grid.select_only(coords);
        }
    }

    /// Drop any hint highlight early (pointer touched the board).
    pub fn clear_hints(&mut self) {
        self.grid.clear_hints();
        self.hint_clear_at_ms = None;
    }

    /// Pointer released: resolve the selection. A match removes the tiles,
    /// scores, extends the clock, advances the combo and runs gravity plus
    /// the deadlock check. Anything else just drops the selection.
    pub fn resolve_selection(&mut self) -> bool {
        if self.phase != Phase::Active || self.delete_mode {
            self.grid.clear_selection();
            return false;
        }
        let sel = self.grid.selection();
        self.grid.clear_selection();
        let sum: u32 = sel.iter().map(|(_, v)| u32::from(*v)).sum();
        if sel.is_empty() || sum != solver::TARGET_SUM {
            return false;
        }

        self.combo += 1;
        self.combo_timer_ms = COMBO_WINDOW_MS;
        let values: Vec<u8> = sel.iter().map(|(_, v)| *v).collect();
        let coords: Vec<Coord> = sel.iter().map(|(c, _)| *c).collect();
        let points = match_points(values.len(), self.combo);
        self.score = self.score.saturating_add(points);
        self.time_left = self.time_left.saturating_add(MATCH_TIME_BONUS_SECS);
        self.match_log.push(MatchEntry {
            at_ms: self.elapsed_ms,
            points,
            tile_values: values.clone(),
            kind: ActionKind::Match,
        });
        self.events.push_back(GameEvent::Matched {
            count: values.len(),
            points,
            combo: self.combo,
            cells: coords.clone(),
        });

        self.grid.mark_removed(&coords);
        if self.grid.is_cleared() {
            self.perfect_clear();
        } else if self.combo >= 2 {
            // Mid-streak: no fresh tiles, the streak has to live off what
            // is already on the board.
            gravity::compact_and_drop(&mut self.grid, &mut self.bag, false);
            self.refill_deferred = true;
        } else {
            gravity::compact_and_drop(&mut self.grid, &mut self.bag, true);
        }

        self.check_rewards();
        self.check_board();
        true
    }

    fn perfect_clear(&mut self) {
        self.score = self.score.saturating_add(PERFECT_CLEAR_BONUS);
        self.match_log.push(MatchEntry {
            at_ms: self.elapsed_ms,
            points: PERFECT_CLEAR_BONUS,
            tile_values: Vec::new(),
            kind: ActionKind::PerfectClear,
        });
        self.events.push_back(GameEvent::PerfectClear);
        self.combo = 0;
        self.combo_timer_ms = 0;
        self.refill_deferred = false;
        gravity::bulk_refill(&mut self.grid, &mut self.bag);
        self.events.push_back(GameEvent::Refilled);
    }

    /// Reward ladder: each crossing grants time and charges, then pushes the
    /// next threshold further out than the last.
    fn check_rewards(&mut self) {
        while self.score >= self.next_reward_score {
            self.time_left = self.time_left.saturating_add(REWARD_TIME_BONUS_SECS);
            self.hint_charges += 1;
            self.shuffle_charges += 1;
            self.events.push_back(GameEvent::RewardReached {
                threshold: self.next_reward_score,
            });
            let next = self.next_reward_score.saturating_add(self.reward_gap);
            if next == self.next_reward_score {
                break; // ladder saturated
            }
            self.next_reward_score = next;
            self.reward_gap += REWARD_GAP_STEP;
        }
    }

    /// Deadlock handling after any removal. Board-cleared is handled by the
    /// callers (it is a refill, not a deadlock). While a streak has holes
    /// pending refill the verdict is deferred to combo expiry. Otherwise
    /// shuffle charges are burned one at a time until a move exists or the
    /// session truly deadlocks.
    fn check_board(&mut self) {
        if self.grid.is_cleared() {
            return;
        }
        loop {
            if solver::find_match(&self.grid).is_some() {
                return;
            }
            if self.combo > 0 && self.refill_deferred {
                return;
            }
            if self.shuffle_charges > 0 {
                self.shuffle_charges -= 1;
                self.skill_log.push(SkillEntry {
                    at_ms: self.elapsed_ms,
                    skill: Skill::AutoShuffle,
                });
                self.permute_until_solvable();
                self.events.push_back(GameEvent::SkillUsed(Skill::AutoShuffle));
            } else {
                self.end(EndReason::Deadlock);
                return;
            }
        }
    }

    /// Fisher–Yates the surviving values in place until the solver approves,
    /// giving up (and accepting an unsolved board) after the attempt budget.
    fn permute_until_solvable(&mut self) {
        let mut values = self.grid.live_values();
        for _ in 0..SHUFFLE_MAX_ATTEMPTS {
            values.shuffle(&mut self.rng);
            self.grid.assign_values(&values);
            if solver::find_match(&self.grid).is_some() {
                return;
            }
        }
    }

    /// Hint: highlight the solver's rectangle for a while. The charge is
    /// only spent when there is something to show.
    pub fn use_hint(&mut self) -> bool {
        if self.phase != Phase::Active || self.hint_charges == 0 {
            return false;
        }
        let Some(cells) = solver::find_match(&self.grid) else {
            return false;
        };
        self.hint_charges -= 1;
        self.skill_log.push(SkillEntry {
            at_ms: self.elapsed_ms,
            skill: Skill::Hint,
        });
        self.grid.clear_hints();
        self.grid.set_hinted(&cells);
        self.hint_clear_at_ms = Some(self.elapsed_ms + HINT_DURATION_MS);
        self.events.push_back(GameEvent::SkillUsed(Skill::Hint));
        true
    }

    /// Manual shuffle: permute surviving values, validated like any shuffle.
    pub fn use_shuffle(&mut self) -> bool {
        if self.phase != Phase::Active || self.shuffle_charges == 0 {
            return false;
        }
        self.shuffle_charges -= 1;
        self.skill_log.push(SkillEntry {
            at_ms: self.elapsed_ms,
            skill: Skill::Shuffle,
        });
        self.permute_until_solvable();
        self.events.push_back(GameEvent::SkillUsed(Skill::Shuffle));
        true
    }

    /// Arm or disarm the targeted delete. Only meaningful while the bomb is
    /// still unspent.
    pub fn toggle_delete_mode(&mut self) -> bool {
        if self.phase != Phase::Active || !self.bomb_available {
            return false;
        }
        self.delete_mode = !self.delete_mode;
        true
    }

    /// Spend the bomb on one settled tile. No score, but the combo timer is
    /// re-armed so an active streak survives the detour.
    pub fn use_delete(&mut self, coord: Coord) -> bool {
        if self.phase != Phase::Active || !self.delete_mode || !self.bomb_available {
            return false;
        }
        let Some(tile) = self.grid.get(coord) else {
            return false;
        };
        if !tile.selectable() {
            return false;
        }
        self.bomb_available = false;
        self.delete_mode = false;
        self.skill_log.push(SkillEntry {
            at_ms: self.elapsed_ms,
            skill: Skill::Delete,
        });
        self.grid.mark_removed(&[coord]);
        if self.combo > 0 {
            self.combo_timer_ms = COMBO_WINDOW_MS;
        }
        self.events.push_back(GameEvent::SkillUsed(Skill::Delete));
        if self.grid.is_cleared() {
            self.refill_deferred = false;
            gravity::bulk_refill(&mut self.grid, &mut self.bag);
            self.events.push_back(GameEvent::Refilled);
        } else if self.combo > 0 {
            gravity::compact_and_drop(&mut self.grid, &mut self.bag, false);
            self.refill_deferred = true;
        } else {
            gravity::compact_and_drop(&mut self.grid, &mut self.bag, true);
        }
        self.check_board();
        true
    }

    /// Spend the bomb on the whole board: wipe everything, score nothing,
    /// keep the streak alive, force the bulk refill.
    pub fn use_wipe(&mut self) -> bool {
        if self.phase != Phase::Active || !self.bomb_available {
            return false;
        }
        self.bomb_available = false;
        self.delete_mode = false;
        self.skill_log.push(SkillEntry {
            at_ms: self.elapsed_ms,
            skill: Skill::Wipe,
        });
        let all: Vec<Coord> = self.grid.coords().collect();
        self.grid.mark_removed(&all);
        if self.combo > 0 {
            self.combo_timer_ms = COMBO_WINDOW_MS;
        }
        self.refill_deferred = false;
        gravity::bulk_refill(&mut self.grid, &mut self.bag);
        self.events.push_back(GameEvent::SkillUsed(Skill::Wipe));
        self.events.push_back(GameEvent::Refilled);
        self.check_board();
        true
    }

    /// Freeze: stop the clock (and combo decay) for a few seconds.
    pub fn use_freeze(&mut self) -> bool {
        if self.phase != Phase::Active || !self.freeze_available {
            return false;
        }
        self.freeze_available = false;
        self.skill_log.push(SkillEntry {
            at_ms: self.elapsed_ms,
            skill: Skill::Freeze,
        });
        self.freeze_left_ms = FREEZE_DURATION_MS;
        self.phase = Phase::Paused;
        self.events.push_back(GameEvent::SkillUsed(Skill::Freeze));
        true
    }

    /// Player walked away mid-game.
    pub fn abandon(&mut self) {
        if matches!(
            self.phase,
            Phase::Countdown | Phase::Active | Phase::Paused
        ) {
            self.end(EndReason::Abandoned);
        }
    }

    fn end(&mut self, reason: EndReason) {
        if matches!(self.phase, Phase::Ended(_)) {
            return;
        }
        self.phase = Phase::Ended(reason);
        self.delete_mode = false;
        self.grid.clear_selection();
        self.events.push_back(GameEvent::Ended(reason));
    }

    pub fn audit_summary(&self) -> AuditSummary {
        AuditSummary {
            name: self.name.clone(),
            score: self.score,
            duration_ms: self.elapsed_ms,
            match_log: self.match_log.clone(),
            skill_log: self.skill_log.clone(),
        }
    }

    /// Hand the queued events to the presentation layer.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    /// Snap every tile to rest (no-animation mode).
    pub fn settle_instantly(&mut self) {
        self.grid.settle_all();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended(_))
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    /// Remaining fraction of the combo window, for the HUD gauge.
    pub fn combo_ratio(&self) -> f64 {
        if self.combo == 0 {
            0.0
        } else {
            (self.combo_timer_ms as f64 / COMBO_WINDOW_MS as f64).min(1.0)
        }
    }

    pub fn countdown_left_ms(&self) -> u64 {
        self.countdown_left_ms
    }

    pub fn freeze_left_ms(&self) -> u64 {
        self.freeze_left_ms
    }

    pub fn hint_charges(&self) -> u32 {
        self.hint_charges
    }

    pub fn shuffle_charges(&self) -> u32 {
        self.shuffle_charges
    }

    pub fn bomb_available(&self) -> bool {
        self.bomb_available
    }

    pub fn freeze_available(&self) -> bool {
        self.freeze_available
    }

    pub fn delete_mode(&self) -> bool {
        self.delete_mode
    }

    pub fn next_reward_score(&self) -> u32 {
        self.next_reward_score
    }

    pub fn match_log(&self) -> &[MatchEntry] {
        &self.match_log
    }

    pub fn skill_log(&self) -> &[SkillEntry] {
        &self.skill_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config(rows: usize, cols: usize) -> SessionConfig {
        SessionConfig {
            rows,
            cols,
            start_time_secs: 60,
            countdown_ms: COUNTDOWN_MS,
            bag_policy: BagPolicy::Uniform,
        }
    }

    /// Session ticked past countdown into Active, with a forced board.
    fn active_session(rows: usize, cols: usize, values: &[u8]) -> Session<StdRng> {
        let mut s = Session::with_rng(config(rows, cols), StdRng::seed_from_u64(99));
        s.start("tester").unwrap();
        s.tick(Duration::from_millis(COUNTDOWN_MS));
        assert_eq!(s.phase(), Phase::Active);
        s.grid = Grid::from_values(rows, cols, values);
        s.drain_events();
        s
    }

    fn select_and_resolve(s: &mut Session<StdRng>, coords: &[Coord]) -> bool {
        s.apply_selection(coords);
        s.resolve_selection()
    }

    #[test]
    fn test_start_rejects_empty_name() {
        let mut s = Session::with_rng(config(4, 4), StdRng::seed_from_u64(1));
        assert_eq!(s.start(""), Err(StartError::EmptyName));
        assert_eq!(s.start("   "), Err(StartError::EmptyName));
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.match_log().is_empty());
    }

    #[test]
    fn test_start_rejects_too_long_name() {
        let mut s = Session::with_rng(config(4, 4), StdRng::seed_from_u64(1));
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            s.start(&long),
            Err(StartError::NameTooLong { max: MAX_NAME_LEN })
        );
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn test_countdown_gates_input_and_timer() {
        let mut s = Session::with_rng(config(4, 4), StdRng::seed_from_u64(2));
        s.start("tester").unwrap();
        assert_eq!(s.phase(), Phase::Countdown);
        assert!(!s.resolve_selection());
        assert!(!s.use_hint());
        s.tick(Duration::from_millis(COUNTDOWN_MS / 2));
        assert_eq!(s.phase(), Phase::Countdown);
        assert_eq!(s.time_left(), 60);
        s.tick(Duration::from_millis(COUNTDOWN_MS / 2));
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.time_left(), 60);
    }

    #[test]
    fn test_initial_board_is_solvable_and_dropping_in() {
        let mut s = Session::with_rng(config(10, 16), StdRng::seed_from_u64(3));
        s.start("tester").unwrap();
        assert!(solver::find_match(s.grid()).is_some());
        assert!(s.grid().tiles().all(|(_, t)| t.fall_offset < 0.0));
    }

    #[test]
    fn test_two_by_two_match_scenario() {
        let mut s = active_session(2, 2, &[3, 7, 7, 3]);
        // All four sum to 20: not a match, nothing logged.
        let all: Vec<Coord> = s.grid().coords().collect();
        assert!(!select_and_resolve(&mut s, &all));
        assert_eq!(s.score(), 0);
        assert!(s.match_log().is_empty());

        // Top row sums to 10: match, removal, gravity, clock bonus.
        assert!(select_and_resolve(
            &mut s,
            &[Coord::new(0, 0), Coord::new(0, 1)]
        ));
        assert_eq!(s.score(), 200);
        assert_eq!(s.time_left(), 63);
        assert_eq!(s.combo(), 1);
        assert_eq!(s.match_log().len(), 1);
        let e = &s.match_log()[0];
        assert_eq!(e.points, 200);
        assert_eq!(e.tile_values, vec![3, 7]);
        assert_eq!(e.kind, ActionKind::Match);
        // First match of a window compacts with refill: board is full again.
        assert_eq!(s.grid().live_count(), 4);
    }

    #[test]
    fn test_score_monotonic_and_capped_per_event() {
        // 8 tiles of value 5 in one row; select the first two repeatedly
        // won't work after removal, so check the formula directly instead.
        assert_eq!(match_points(2, 1), 200);
        assert_eq!(match_points(3, 1), 600);
        assert_eq!(match_points(4, 1), 1600);
        assert_eq!(match_points(5, 1), 4000);
        // n=6 would be 9600 raw: clamped to the ceiling.
        assert_eq!(match_points(6, 1), MATCH_POINTS_CEILING);
        // Combo bonus only past the threshold.
        assert_eq!(match_points(2, 2), 200);
        assert_eq!(match_points(2, 3), 200 + 150);
        assert_eq!(match_points(2, 5), 200 + 250);
    }

    #[test]
    fn test_perfect_clear_bonus_and_forced_refill() {
        let mut s = active_session(2, 2, &[1, 2, 3, 4]);
        let all: Vec<Coord> = s.grid().coords().collect();
        assert!(select_and_resolve(&mut s, &all));
        // 4-tile match: 400 * 4 = 1600, plus the flat perfect-clear 2000.
        assert_eq!(s.score(), 3600);
        assert_eq!(s.combo(), 0, "perfect clear forces the combo to reset");
        assert_eq!(s.match_log().len(), 2);
        assert_eq!(s.match_log()[1].kind, ActionKind::PerfectClear);
        assert_eq!(s.match_log()[1].points, PERFECT_CLEAR_BONUS);
        // Bulk refill regardless of deferral policy.
        assert_eq!(s.grid().live_count(), 4);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::PerfectClear));
        assert!(events.contains(&GameEvent::Refilled));
    }

    #[test]
    fn test_reward_ladder_crossing_and_growing_gap() {
        let mut s = active_session(2, 2, &[3, 7, 7, 3]);
        s.score = 4999;
        s.next_reward_score = 5000;
        s.reward_gap = 1000;
        let hints_before = s.hint_charges();
        let time_before = s.time_left();
        assert!(select_and_resolve(
            &mut s,
            &[Coord::new(0, 0), Coord::new(0, 1)]
        ));
        assert_eq!(s.score(), 5199);
        assert_eq!(s.next_reward_score(), 6000);
        assert_eq!(s.reward_gap, 1500);
        assert_eq!(s.hint_charges(), hints_before + 1);
        // +3 match bonus, +5 reward bonus.
        assert_eq!(s.time_left(), time_before + 8);
    }

    #[test]
    fn test_reward_gaps_strictly_increase() {
        let mut s = active_session(2, 2, &[3, 7, 7, 3]);
        s.score = 100_000;
        let mut gaps = Vec::new();
        let mut last_threshold = 0;
        s.check_rewards();
        for ev in s.drain_events() {
            if let GameEvent::RewardReached { threshold } = ev {
                if last_threshold > 0 {
                    gaps.push(threshold - last_threshold);
                }
                last_threshold = threshold;
            }
        }
        assert!(gaps.len() >= 3);
        assert!(gaps.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_deadlock_with_no_charges_ends_exactly_once() {
        let mut s = active_session(4, 4, &[9; 16]);
        s.shuffle_charges = 0;
        s.check_board();
        assert_eq!(s.phase(), Phase::Ended(EndReason::Deadlock));
        let ends = s
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::Ended(_)))
            .count();
        assert_eq!(ends, 1);
        // A second check cannot end it again.
        s.check_board();
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_deadlock_burns_charges_before_ending() {
        // All 9s never sum to 10 under any permutation, so every shuffle
        // attempt fails and the charges drain to a true deadlock.
        let mut s = active_session(4, 4, &[9; 16]);
        s.shuffle_charges = 3;
        s.check_board();
        assert_eq!(s.shuffle_charges(), 0);
        assert_eq!(s.phase(), Phase::Ended(EndReason::Deadlock));
        let autos = s
            .skill_log()
            .iter()
            .filter(|e| e.skill == Skill::AutoShuffle)
            .count();
        assert_eq!(autos, 3);
    }

    #[test]
    fn test_deadlock_deferred_while_streak_has_holes() {
        let mut s = active_session(4, 4, &[9; 16]);
        s.combo = 2;
        s.refill_deferred = true;
        s.shuffle_charges = 1;
        s.check_board();
        // Verdict deferred: no shuffle burned, session still running.
        assert_eq!(s.shuffle_charges(), 1);
        assert_eq!(s.phase(), Phase::Active);
    }

    #[test]
    fn test_combo_expiry_performs_deferred_refill() {
        let mut s = active_session(2, 2, &[3, 7, 7, 3]);
        assert!(select_and_resolve(
            &mut s,
            &[Coord::new(0, 0), Coord::new(0, 1)]
        ));
        // Land a second match inside the window to open a streak; the board
        // was refilled after the first, so force one with a known pair.
        s.grid = Grid::from_values(2, 2, &[4, 6, 9, 9]);
        assert!(select_and_resolve(
            &mut s,
            &[Coord::new(0, 0), Coord::new(0, 1)]
        ));
        assert_eq!(s.combo(), 2);
        assert!(s.refill_deferred, "streak match must defer its refill");
        assert!(s.grid().live_count() < 4);

        // Let the window lapse: combo breaks and the holes fill in.
        s.tick(Duration::from_millis(COMBO_WINDOW_MS));
        assert_eq!(s.combo(), 0);
        assert_eq!(s.grid().live_count(), 4);
    }

    #[test]
    fn test_freeze_stops_clock_and_auto_resumes() {
        let mut s = active_session(2, 2, &[3, 7, 7, 3]);
        let t = s.time_left();
        assert!(s.use_freeze());
        assert_eq!(s.phase(), Phase::Paused);
        s.tick(Duration::from_millis(3000));
        assert_eq!(s.phase(), Phase::Paused);
        assert_eq!(s.time_left(), t);
        s.tick(Duration::from_millis(2000));
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.time_left(), t);
        // Single use.
        assert!(!s.use_freeze());
    }

    #[test]
    fn test_hint_highlights_then_auto_clears() {
        let mut s = active_session(2, 2, &[3, 7, 7, 3]);
        assert!(s.use_hint());
        assert_eq!(s.hint_charges(), 0);
        assert!(s.grid().tiles().any(|(_, t)| t.hinted));
        s.tick(Duration::from_millis(HINT_DURATION_MS));
        assert!(s.grid().tiles().all(|(_, t)| !t.hinted));
        // No charge left: silent no-op.
        assert!(!s.use_hint());
    }

    #[test]
    fn test_hint_keeps_charge_on_dead_board() {
        let mut s = active_session(4, 4, &[9; 16]);
        assert!(!s.use_hint());
        assert_eq!(s.hint_charges(), 1);
        assert!(s.skill_log().is_empty());
    }

    #[test]
    fn test_manual_shuffle_keeps_board_solvable() {
        let mut s = active_session(1, 4, &[9, 9, 6, 4]);
        assert!(s.use_shuffle());
        assert_eq!(s.shuffle_charges(), 0);
        assert!(solver::find_match(s.grid()).is_some());
        assert_eq!(s.skill_log()[0].skill, Skill::Shuffle);
        // Shuffle reorders, never rewrites, the surviving multiset.
        let mut vals = s.grid().live_values();
        vals.sort_unstable();
        assert_eq!(vals, vec![4, 6, 9, 9]);
    }

    #[test]
    fn test_delete_requires_armed_mode_and_settled_tile() {
        let mut s = active_session(2, 2, &[3, 7, 7, 3]);
        // Not armed: no-op.
        assert!(!s.use_delete(Coord::new(0, 0)));
        assert!(s.toggle_delete_mode());
        // Falling tile: rejected, bomb stays armed.
        s.grid.tile_mut(0, 0).unwrap().fall_offset = -1.0;
        assert!(!s.use_delete(Coord::new(0, 0)));
        assert!(s.bomb_available());
        // Settled neighbour: consumed.
        assert!(s.use_delete(Coord::new(0, 1)));
        assert!(!s.bomb_available());
        assert!(!s.delete_mode());
        assert_eq!(s.skill_log()[0].skill, Skill::Delete);
        assert!(s.match_log().is_empty(), "bomb never scores");
    }

    #[test]
    fn test_wipe_refills_without_scoring() {
        let mut s = active_session(2, 2, &[3, 7, 7, 3]);
        s.combo = 1;
        s.combo_timer_ms = 100;
        assert!(s.use_wipe());
        assert_eq!(s.score(), 0);
        assert_eq!(s.grid().live_count(), 4);
        // Streak preserved: timer re-armed rather than broken.
        assert_eq!(s.combo(), 1);
        assert_eq!(s.combo_timer_ms, COMBO_WINDOW_MS);
        assert_eq!(s.skill_log()[0].skill, Skill::Wipe);
        // Bomb gone: targeted delete is no longer available either.
        assert!(!s.toggle_delete_mode());
    }

    #[test]
    fn test_time_up_ends_session() {
        let mut s = active_session(2, 2, &[3, 7, 7, 3]);
        s.time_left = 2;
        s.tick(Duration::from_millis(1999));
        assert_eq!(s.phase(), Phase::Active);
        s.tick(Duration::from_millis(1));
        assert_eq!(s.phase(), Phase::Ended(EndReason::TimeUp));
        // Terminal: abilities and matches are dead.
        assert!(!s.use_hint());
        assert!(!select_and_resolve(
            &mut s,
            &[Coord::new(0, 0), Coord::new(0, 1)]
        ));
    }

    #[test]
    fn test_restart_resets_stale_deadlines() {
        let mut s = active_session(2, 2, &[3, 7, 7, 3]);
        assert!(s.use_hint());
        assert!(s.use_freeze());
        assert_eq!(s.phase(), Phase::Paused);
        // Restart mid-freeze: a fresh session, nothing left over.
        s.start("tester").unwrap();
        assert_eq!(s.phase(), Phase::Countdown);
        assert_eq!(s.hint_charges(), 1);
        assert!(s.freeze_available());
        assert!(s.hint_clear_at_ms.is_none());
        assert_eq!(s.freeze_left_ms(), 0);
        assert!(s.match_log().is_empty());
        assert!(s.skill_log().is_empty());
    }

    #[test]
    fn test_audit_summary_snapshot() {
        let mut s = active_session(2, 2, &[3, 7, 7, 3]);
        select_and_resolve(&mut s, &[Coord::new(0, 0), Coord::new(0, 1)]);
        s.abandon();
        let summary = s.audit_summary();
        assert_eq!(summary.name, "tester");
        assert_eq!(summary.score, 200);
        assert_eq!(summary.match_log.len(), 1);
        assert_eq!(s.phase(), Phase::Ended(EndReason::Abandoned));
    }
}
