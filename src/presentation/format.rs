use crate::playback::{PlaybackPhase, PlaybackState};

/// Countdown label such as `00:07`, rounded up to the next whole second.
pub fn remaining_label(state: &PlaybackState) -> String {
    if state.phase == PlaybackPhase::Finished {
        return "00:00".to_string();
    }
    let seconds = (state.remaining_ms().max(0.0) / 1000.0).ceil() as u64;
    format!("00:{seconds:02}")
}

/// Fixed-width text bar, e.g. `[######----]`.
pub fn progress_bar(progress: f64, width: usize) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(elapsed_ms: f64) -> PlaybackState {
        let mut state = PlaybackState::new(20_000);
        let run = state.begin_run(Utc::now());
        state.advance(run, elapsed_ms, 4);
        state
    }

    #[test]
    fn label_counts_down_whole_seconds() {
        assert_eq!(remaining_label(&at(0.0)), "00:20");
        assert_eq!(remaining_label(&at(15_000.0)), "00:05");
        assert_eq!(remaining_label(&at(20_000.0)), "00:00");
    }

    #[test]
    fn label_rounds_partial_seconds_up() {
        assert_eq!(remaining_label(&at(14_001.0)), "00:06");
        assert_eq!(remaining_label(&at(19_999.0)), "00:01");
    }

    #[test]
    fn idle_label_shows_full_duration() {
        assert_eq!(remaining_label(&PlaybackState::new(20_000)), "00:20");
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0, 4), "[----]");
        assert_eq!(progress_bar(0.5, 4), "[##--]");
        assert_eq!(progress_bar(1.0, 4), "[####]");
        assert_eq!(progress_bar(1.7, 4), "[####]");
        assert_eq!(progress_bar(-0.2, 4), "[----]");
    }
}
