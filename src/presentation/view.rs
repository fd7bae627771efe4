use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    playback::{PlaybackPhase, PlaybackState},
    script::Script,
};

use super::format::remaining_label;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SegmentMarker {
    /// The segment currently being narrated.
    Now,
    /// Earlier segment that stays on screen.
    Echo,
    /// Final segment once the run has finished.
    Arrival,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevealedSegment {
    pub index: usize,
    pub id: String,
    pub label: String,
    pub text: String,
    pub marker: SegmentMarker,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub phase: PlaybackPhase,
    pub run_id: u64,
    pub active_index: Option<usize>,
    pub progress: f64,
    pub remaining_label: String,
    pub elapsed_ms: f64,
    pub total_ms: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub segments: Vec<RevealedSegment>,
}

impl PlaybackSnapshot {
    pub fn from_state(state: &PlaybackState, script: &Script) -> Self {
        Self {
            phase: state.phase,
            run_id: state.run_id,
            active_index: state.active_index,
            progress: state.progress(),
            remaining_label: remaining_label(state),
            elapsed_ms: state.elapsed_ms,
            total_ms: state.total_ms,
            started_at: state.started_at,
            segments: revealed_segments(state, script),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase == PlaybackPhase::Finished
    }
}

pub fn marker_for(state: &PlaybackState, index: usize, last_index: usize) -> SegmentMarker {
    if state.is_segment_active(index) {
        SegmentMarker::Now
    } else if state.phase == PlaybackPhase::Finished && index == last_index {
        SegmentMarker::Arrival
    } else {
        SegmentMarker::Echo
    }
}

pub fn revealed_segments(state: &PlaybackState, script: &Script) -> Vec<RevealedSegment> {
    let count = state.revealed_count().min(script.len());
    let last_index = script.last_index();
    script.segments()[..count]
        .iter()
        .enumerate()
        .map(|(index, segment)| RevealedSegment {
            index,
            id: segment.id.clone(),
            label: segment.label.clone(),
            text: segment.text.clone(),
            marker: marker_for(state, index, last_index),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(snapshot: &PlaybackSnapshot) -> Vec<SegmentMarker> {
        snapshot.segments.iter().map(|s| s.marker).collect()
    }

    #[test]
    fn idle_snapshot_is_empty() {
        let script = Script::builtin();
        let state = PlaybackState::new(script.total_duration_ms());
        let snapshot = PlaybackSnapshot::from_state(&state, &script);
        assert!(snapshot.segments.is_empty());
        assert_eq!(snapshot.progress, 0.0);
        assert_eq!(snapshot.remaining_label, "00:20");
    }

    #[test]
    fn running_snapshot_marks_active_segment() {
        let script = Script::builtin();
        let mut state = PlaybackState::new(script.total_duration_ms());
        let run = state.begin_run(Utc::now());
        state.reveal(run, 1);
        state.reveal(run, 2);
        state.advance(run, 12_000.0, script.last_index());

        let snapshot = PlaybackSnapshot::from_state(&state, &script);
        assert_eq!(snapshot.segments.len(), 3);
        assert_eq!(
            markers(&snapshot),
            vec![SegmentMarker::Echo, SegmentMarker::Echo, SegmentMarker::Now]
        );
        assert_eq!(snapshot.segments[2].id, "crossing");
        assert!((snapshot.progress - 0.6).abs() < 1e-9);
    }

    #[test]
    fn finished_snapshot_shows_arrival() {
        let script = Script::builtin();
        let mut state = PlaybackState::new(script.total_duration_ms());
        let run = state.begin_run(Utc::now());
        state.advance(run, 20_000.0, script.last_index());

        let snapshot = PlaybackSnapshot::from_state(&state, &script);
        assert!(snapshot.is_finished());
        assert_eq!(snapshot.segments.len(), 5);
        assert_eq!(snapshot.segments[4].marker, SegmentMarker::Arrival);
        assert!(snapshot
            .segments
            .iter()
            .all(|s| s.marker != SegmentMarker::Now));
        assert_eq!(snapshot.remaining_label, "00:00");
    }

    #[test]
    fn snapshot_serializes_in_camel_case() {
        let script = Script::builtin();
        let mut state = PlaybackState::new(script.total_duration_ms());
        state.begin_run(Utc::now());
        let json = serde_json::to_value(PlaybackSnapshot::from_state(&state, &script)).unwrap();
        assert_eq!(json["phase"], "running");
        assert_eq!(json["remainingLabel"], "00:20");
        assert_eq!(json["segments"][0]["marker"], "now");
    }
}
