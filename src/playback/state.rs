use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackPhase {
    #[default]
    Idle,
    Running,
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub phase: PlaybackPhase,
    /// Generation token; bumped on every start or replay.
    pub run_id: u64,
    pub active_index: Option<usize>,
    pub elapsed_ms: f64,
    pub total_ms: u64,
    pub started_at: Option<DateTime<Utc>>,
}

impl PlaybackState {
    pub fn new(total_ms: u64) -> Self {
        Self {
            total_ms,
            ..Self::default()
        }
    }

    /// Resets to the first segment of a fresh run and returns its token.
    pub fn begin_run(&mut self, started_at: DateTime<Utc>) -> u64 {
        *self = Self {
            phase: PlaybackPhase::Running,
            run_id: self.run_id.wrapping_add(1),
            active_index: Some(0),
            elapsed_ms: 0.0,
            total_ms: self.total_ms,
            started_at: Some(started_at),
        };
        self.run_id
    }

    pub fn is_current(&self, run_id: u64) -> bool {
        self.run_id == run_id && self.phase != PlaybackPhase::Idle
    }

    /// Applies a reveal scheduled by run `run_id`. Returns false when the
    /// callback is stale or would move the active segment backwards.
    pub fn reveal(&mut self, run_id: u64, index: usize) -> bool {
        if !self.is_current(run_id) || self.phase == PlaybackPhase::Finished {
            return false;
        }
        match self.active_index {
            Some(current) if current >= index => false,
            _ => {
                self.active_index = Some(index);
                true
            }
        }
    }

    /// Applies a progress tick from run `run_id`. `last_index` is forced
    /// active on finish so the final segment is shown even when its reveal
    /// timer has not run yet.
    pub fn advance(&mut self, run_id: u64, elapsed_ms: f64, last_index: usize) -> bool {
        if !self.is_current(run_id) || self.phase == PlaybackPhase::Finished {
            return false;
        }

        let total = self.total_ms as f64;
        let clamped = elapsed_ms.clamp(0.0, total);
        if clamped > self.elapsed_ms {
            self.elapsed_ms = clamped;
        }

        if self.elapsed_ms >= total {
            self.elapsed_ms = total;
            self.phase = PlaybackPhase::Finished;
            self.active_index = Some(last_index);
        }
        true
    }

    pub fn progress(&self) -> f64 {
        if self.phase == PlaybackPhase::Idle || self.total_ms == 0 {
            return 0.0;
        }
        (self.elapsed_ms / self.total_ms as f64).clamp(0.0, 1.0)
    }

    pub fn remaining_ms(&self) -> f64 {
        (self.total_ms as f64 - self.elapsed_ms).max(0.0)
    }

    /// Number of revealed segments, i.e. the length of the visible prefix.
    pub fn revealed_count(&self) -> usize {
        self.active_index.map_or(0, |index| index + 1)
    }

    pub fn is_segment_active(&self, index: usize) -> bool {
        self.active_index == Some(index) && self.phase != PlaybackPhase::Finished
    }
}
