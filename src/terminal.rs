use std::io::{self, Write};

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    playback::{commands::execute, PlaybackController, PlaybackPhase, PlayerCommand},
    presentation::{progress_bar, PlaybackSnapshot, SegmentMarker},
    settings::{OutputFormat, PlayerSettings},
};

fn marker_tag(marker: SegmentMarker) -> &'static str {
    match marker {
        SegmentMarker::Now => "Now",
        SegmentMarker::Echo => "Echo",
        SegmentMarker::Arrival => "Arrival",
    }
}

fn phase_tag(phase: PlaybackPhase) -> &'static str {
    match phase {
        PlaybackPhase::Idle => "idle",
        PlaybackPhase::Running => "running",
        PlaybackPhase::Finished => "finished",
    }
}

/// Frames are only redrawn when something a viewer can see has changed.
pub fn should_render(previous: Option<&PlaybackSnapshot>, next: &PlaybackSnapshot) -> bool {
    match previous {
        None => true,
        Some(previous) => {
            previous.phase != next.phase
                || previous.run_id != next.run_id
                || previous.active_index != next.active_index
                || previous.remaining_label != next.remaining_label
        }
    }
}

pub fn render_text(snapshot: &PlaybackSnapshot, bar_width: usize) -> String {
    let mut out = format!(
        "{} {} {}\n",
        progress_bar(snapshot.progress, bar_width),
        snapshot.remaining_label,
        phase_tag(snapshot.phase)
    );
    for segment in &snapshot.segments {
        out.push_str(&format!(
            "  {:>5}  {:<7}  {}\n",
            segment.label,
            marker_tag(segment.marker),
            segment.text
        ));
    }
    match snapshot.phase {
        PlaybackPhase::Idle => out.push_str("(s) start  (q) quit\n"),
        PlaybackPhase::Finished => out.push_str("(r) replay  (q) quit\n"),
        PlaybackPhase::Running => {}
    }
    out
}

pub fn render(snapshot: &PlaybackSnapshot, settings: &PlayerSettings) -> Result<String> {
    match settings.output {
        OutputFormat::Text => Ok(render_text(snapshot, settings.bar_width)),
        OutputFormat::Json => {
            let mut line =
                serde_json::to_string(snapshot).context("Failed to serialize snapshot")?;
            line.push('\n');
            Ok(line)
        }
    }
}

fn write_frame(frame: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(frame.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to write frame to stdout")
}

/// Drives the controller from stdin and draws its snapshots on stdout until
/// the user quits, or stdin closes and no run is in progress.
pub async fn run_player(controller: PlaybackController, settings: &PlayerSettings) -> Result<()> {
    let mut snapshots = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let mut last_frame = snapshots.borrow_and_update().clone();
    write_frame(&render(&last_frame, settings)?)?;

    if settings.autostart {
        controller.start().await?;
    }

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if should_render(Some(&last_frame), &snapshot) {
                    write_frame(&render(&snapshot, settings)?)?;
                    last_frame = snapshot;
                }
                if !stdin_open && last_frame.phase != PlaybackPhase::Running {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    info!("stdin closed; exiting once playback is done");
                    stdin_open = false;
                    if last_frame.phase != PlaybackPhase::Running {
                        break;
                    }
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match line.parse::<PlayerCommand>() {
                    Ok(command) => command,
                    Err(err) => {
                        warn!("{err}");
                        continue;
                    }
                };
                match execute(&controller, command).await {
                    Ok(Some(_)) => {}
                    Ok(None) => break,
                    Err(err) => warn!("{command:?} rejected: {err}"),
                }
            }
        }
    }

    controller.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{playback::PlaybackState, script::Script};
    use chrono::Utc;

    fn snapshot_at(elapsed_ms: f64, reveals: &[usize]) -> PlaybackSnapshot {
        let script = Script::builtin();
        let mut state = PlaybackState::new(script.total_duration_ms());
        let run = state.begin_run(Utc::now());
        for &index in reveals {
            state.reveal(run, index);
        }
        state.advance(run, elapsed_ms, script.last_index());
        PlaybackSnapshot::from_state(&state, &script)
    }

    #[test]
    fn text_frame_lists_revealed_segments() {
        let frame = render_text(&snapshot_at(5_500.0, &[1]), 10);
        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines[0], "[###-------] 00:15 running");
        assert!(lines[1].contains("Echo"));
        assert!(lines[2].contains("Now"));
        assert!(lines[2].contains("00:05"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn finished_frame_offers_replay() {
        let frame = render_text(&snapshot_at(20_000.0, &[]), 4);
        assert!(frame.starts_with("[####] 00:00 finished"));
        assert!(frame.contains("Arrival"));
        assert!(frame.ends_with("(r) replay  (q) quit\n"));
    }

    #[test]
    fn json_frame_is_one_line() {
        let settings = PlayerSettings {
            output: OutputFormat::Json,
            ..PlayerSettings::default()
        };
        let frame = render(&snapshot_at(1_000.0, &[]), &settings).unwrap();
        assert_eq!(frame.matches('\n').count(), 1);
        let value: serde_json::Value = serde_json::from_str(frame.trim()).unwrap();
        assert_eq!(value["remainingLabel"], "00:19");
    }

    #[test]
    fn redraws_only_on_visible_change() {
        let first = snapshot_at(1_000.0, &[]);
        let same_second = snapshot_at(1_400.0, &[]);
        let next_second = snapshot_at(2_100.0, &[]);
        assert!(should_render(None, &first));
        assert!(!should_render(Some(&first), &same_second));
        assert!(should_render(Some(&first), &next_second));
        assert!(should_render(Some(&first), &snapshot_at(1_000.0, &[1])));
    }
}
