use std::{sync::Arc, time::Duration};

use anyhow::{bail, Result};
use chrono::Utc;
use log::{debug, info};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{presentation::PlaybackSnapshot, script::Script};

use super::{
    clock::{elapsed_ms, Clock, TokioClock},
    PlaybackPhase, PlaybackState,
};

pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

struct Shared {
    state: Mutex<PlaybackState>,
    script: Script,
    clock: Arc<dyn Clock>,
    snapshots: watch::Sender<PlaybackSnapshot>,
}

impl Shared {
    fn publish(&self, state: &PlaybackState) {
        self.snapshots
            .send_replace(PlaybackSnapshot::from_state(state, &self.script));
    }
}

/// Timers and frame loop belonging to the current run.
#[derive(Default)]
struct RunTasks {
    cancel_token: Option<CancellationToken>,
    handles: Vec<JoinHandle<()>>,
}

impl RunTasks {
    fn cancel(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

#[derive(Clone)]
pub struct PlaybackController {
    shared: Arc<Shared>,
    run_tasks: Arc<Mutex<RunTasks>>,
    frame_interval: Duration,
}

impl PlaybackController {
    pub fn new(script: Script) -> Self {
        Self::with_clock(script, Arc::new(TokioClock), DEFAULT_FRAME_INTERVAL)
    }

    pub fn with_clock(script: Script, clock: Arc<dyn Clock>, frame_interval: Duration) -> Self {
        let state = PlaybackState::new(script.total_duration_ms());
        let (snapshots, _) = watch::channel(PlaybackSnapshot::from_state(&state, &script));

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                script,
                clock,
                snapshots,
            }),
            run_tasks: Arc::new(Mutex::new(RunTasks::default())),
            // A zero period would make `time::interval` panic.
            frame_interval: frame_interval.max(Duration::from_millis(1)),
        }
    }

    pub fn script(&self) -> &Script {
        &self.shared.script
    }

    pub async fn get_state(&self) -> PlaybackState {
        self.shared.state.lock().await.clone()
    }

    pub async fn snapshot(&self) -> PlaybackSnapshot {
        let guard = self.shared.state.lock().await;
        PlaybackSnapshot::from_state(&guard, &self.shared.script)
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.shared.snapshots.subscribe()
    }

    /// Begins playback from the first segment. Fails while a run is in
    /// progress; use [`replay`](Self::replay) to restart one.
    pub async fn start(&self) -> Result<PlaybackSnapshot> {
        self.begin_run(|phase| {
            if phase == PlaybackPhase::Running {
                bail!("playback already running");
            }
            Ok(())
        })
        .await
    }

    /// Restarts playback. Accepted mid-run as well as after the finish.
    pub async fn replay(&self) -> Result<PlaybackSnapshot> {
        self.begin_run(|phase| {
            if phase == PlaybackPhase::Idle {
                bail!("nothing to replay; playback has not started");
            }
            Ok(())
        })
        .await
    }

    /// Cancels every pending timer of the current run.
    pub async fn shutdown(&self) {
        self.run_tasks.lock().await.cancel();
        debug!("playback tasks cancelled");
    }

    async fn begin_run(
        &self,
        check_phase: impl FnOnce(PlaybackPhase) -> Result<()>,
    ) -> Result<PlaybackSnapshot> {
        // Held across the whole restart so concurrent starts serialize.
        let mut tasks = self.run_tasks.lock().await;

        let (run_id, run_start, snapshot) = {
            let mut state = self.shared.state.lock().await;
            check_phase(state.phase)?;
            let previous = state.phase;
            let run_start = self.shared.clock.now();
            let run_id = state.begin_run(Utc::now());
            self.shared.publish(&state);
            info!(
                "playback run {} started (previous phase {:?}, {} segments over {}ms)",
                run_id,
                previous,
                self.shared.script.len(),
                state.total_ms
            );
            (
                run_id,
                run_start,
                PlaybackSnapshot::from_state(&state, &self.shared.script),
            )
        };

        tasks.cancel();

        let cancel_token = CancellationToken::new();
        let mut handles = Vec::with_capacity(self.shared.script.len());

        for (index, segment) in self.shared.script.segments().iter().enumerate().skip(1) {
            let deadline = run_start + Duration::from_millis(segment.reveal_at_ms);
            handles.push(tokio::spawn(reveal_at(
                self.shared.clone(),
                run_id,
                index,
                deadline,
                cancel_token.clone(),
            )));
        }

        handles.push(tokio::spawn(progress_loop(
            self.shared.clone(),
            run_id,
            run_start,
            self.frame_interval,
            cancel_token.clone(),
        )));

        tasks.cancel_token = Some(cancel_token);
        tasks.handles = handles;

        Ok(snapshot)
    }
}

async fn reveal_at(
    shared: Arc<Shared>,
    run_id: u64,
    index: usize,
    deadline: Instant,
    cancel_token: CancellationToken,
) {
    tokio::select! {
        _ = time::sleep_until(deadline) => {}
        _ = cancel_token.cancelled() => return,
    }

    let mut state = shared.state.lock().await;
    if state.reveal(run_id, index) {
        debug!("run {} revealed segment {}", run_id, index);
        shared.publish(&state);
    } else {
        debug!(
            "discarding reveal of segment {} for run {} (current run {})",
            index, run_id, state.run_id
        );
    }
}

async fn progress_loop(
    shared: Arc<Shared>,
    run_id: u64,
    run_start: Instant,
    frame_interval: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let last_index = shared.script.last_index();

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = cancel_token.cancelled() => break,
        }

        let elapsed = elapsed_ms(shared.clock.as_ref(), run_start);
        let mut state = shared.state.lock().await;
        if !state.advance(run_id, elapsed, last_index) {
            debug!("progress loop for stale run {} exiting", run_id);
            break;
        }
        shared.publish(&state);

        if state.phase == PlaybackPhase::Finished {
            info!("playback run {} finished after {}ms", run_id, state.total_ms);
            break;
        }
    }
}
