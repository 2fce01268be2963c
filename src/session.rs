//! Race session - the host-side driver around the simulation
//!
//! Owns the canonical `RaceState` and funnels every mutation (frames, clock
//! seconds, pause/resume, stop) through one command path so the frame tick and
//! the countdown can never interleave mid-update. Also guarantees the race-over
//! callback fires exactly once per race.

use std::collections::VecDeque;

use rand::Rng;

use crate::config::RaceConfig;
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{ControlInput, RaceEvent, RaceState, countdown_second, step};

/// Lifecycle callbacks consumed by the screen layer
pub trait RaceObserver {
    /// Fired exactly once when a race ends
    fn on_race_over(&mut self, score: u64, completed: bool);
    /// Fired when the player (or the host) asks to pause
    fn on_pause_requested(&mut self) {}
    /// Every domain event, in emission order
    fn on_event(&mut self, _event: &RaceEvent) {}
}

/// Observer that just records what it was told. Hosts drain it each frame.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<RaceEvent>,
    /// (score, completed) for every race-over callback received
    pub race_overs: Vec<(u64, bool)>,
    pub pause_requests: u32,
}

impl RaceObserver for EventLog {
    fn on_race_over(&mut self, score: u64, completed: bool) {
        self.race_overs.push((score, completed));
    }

    fn on_pause_requested(&mut self) {
        self.pause_requests += 1;
    }

    fn on_event(&mut self, event: &RaceEvent) {
        self.events.push(event.clone());
    }
}

/// One serialized update to the race
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceCommand {
    /// Run one simulation tick with this input
    Frame(ControlInput),
    /// One wall-clock second has passed
    ClockSecond,
    Pause,
    Resume,
    /// Cancel the race: no further ticks or callbacks
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Racing,
    Paused,
    /// Race ended and was reported
    Finished,
    /// Cancelled by the host
    Stopped,
}

pub struct RaceSession<O: RaceObserver> {
    config: RaceConfig,
    /// Time limit of level 1, used on restart
    base_time_limit: u32,
    state: RaceState,
    observer: O,
    phase: SessionPhase,
    queue: VecDeque<RaceCommand>,
    /// Unsimulated real time (seconds) carried between `advance` calls
    frame_accumulator: f32,
    /// Ticks run since the last countdown second
    ticks_since_second: u32,
    /// Steering presses not yet consumed by a tick
    pending_steer: (bool, bool),
    /// Race-over latch for the current race
    reported: bool,
    /// Host sends `ClockSecond` from its own interval; `advance` only ticks
    wall_clock: bool,
}

impl<O: RaceObserver> RaceSession<O> {
    pub fn new(config: RaceConfig, observer: O) -> Self {
        log::info!(
            "Race start: {} on level {} ({}s, seed {})",
            config.vehicle.name,
            config.level,
            config.time_limit_secs,
            config.seed
        );
        let state = RaceState::new(&config);
        Self {
            base_time_limit: config.time_limit_secs,
            config,
            state,
            observer,
            phase: SessionPhase::Racing,
            queue: VecDeque::new(),
            frame_accumulator: 0.0,
            ticks_since_second: 0,
            pending_steer: (false, false),
            reported: false,
            wall_clock: false,
        }
    }

    pub fn state(&self) -> &RaceState {
        &self.state
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Let the host drive the countdown from a real one-second interval.
    /// When set, `advance` stops deriving clock seconds from ticks.
    pub fn set_wall_clock(&mut self, enabled: bool) {
        self.wall_clock = enabled;
        self.ticks_since_second = 0;
    }

    /// Queue a command for the next `drain`
    pub fn enqueue(&mut self, command: RaceCommand) {
        if self.phase != SessionPhase::Stopped {
            self.queue.push_back(command);
        }
    }

    /// Apply queued commands in arrival order. Returns how many were applied.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Some(command) = self.queue.pop_front() {
            self.apply(command);
            applied += 1;
        }
        applied
    }

    /// Apply a single command to the race
    pub fn apply(&mut self, command: RaceCommand) {
        match command {
            RaceCommand::Frame(input) => {
                if self.phase != SessionPhase::Racing {
                    return;
                }
                if input.pause {
                    self.request_pause();
                    return;
                }
                let events = step(&mut self.state, &input);
                self.dispatch(events);
            }
            RaceCommand::ClockSecond => {
                if self.phase != SessionPhase::Racing {
                    return;
                }
                let events = countdown_second(&mut self.state);
                self.dispatch(events);
            }
            RaceCommand::Pause => {
                if self.phase == SessionPhase::Racing {
                    self.request_pause();
                }
            }
            RaceCommand::Resume => {
                if self.phase == SessionPhase::Paused {
                    // Time spent paused never reaches the simulation
                    self.frame_accumulator = 0.0;
                    self.pending_steer = (false, false);
                    self.phase = SessionPhase::Racing;
                    log::info!("Race resumed");
                }
            }
            RaceCommand::Stop => {
                if self.phase != SessionPhase::Stopped {
                    log::info!("Race stopped at tick {}", self.state.time_ticks);
                }
                self.phase = SessionPhase::Stopped;
                self.queue.clear();
            }
        }
    }

    /// Real-time driver: run fixed ticks for `dt` seconds of wall time and
    /// fire a countdown second every `TICKS_PER_SECOND` ticks.
    ///
    /// Steering is an edge: it applies to the next tick run, once, even if
    /// this call is too short to run any.
    /// Hosts that run their own one-second interval should call
    /// `set_wall_clock(true)` and send `RaceCommand::ClockSecond` themselves.
    /// Returns the number of ticks run.
    pub fn advance(&mut self, dt: f32, input: &ControlInput) -> u32 {
        self.drain();
        if self.phase != SessionPhase::Racing {
            return 0;
        }
        if input.pause {
            self.apply(RaceCommand::Frame(*input));
            return 0;
        }

        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
        self.frame_accumulator += dt;

        self.pending_steer.0 |= input.steer_left;
        self.pending_steer.1 |= input.steer_right;

        let mut ticks = 0;
        while self.frame_accumulator >= SIM_DT
            && ticks < MAX_SUBSTEPS
            && self.phase == SessionPhase::Racing
        {
            self.frame_accumulator -= SIM_DT;
            let (steer_left, steer_right) = std::mem::take(&mut self.pending_steer);
            self.apply(RaceCommand::Frame(ControlInput {
                steer_left,
                steer_right,
                ..*input
            }));
            ticks += 1;

            if self.wall_clock {
                continue;
            }
            self.ticks_since_second += 1;
            if self.ticks_since_second >= TICKS_PER_SECOND {
                self.ticks_since_second = 0;
                self.apply(RaceCommand::ClockSecond);
            }
        }
        ticks
    }

    /// Window lost focus
    pub fn focus_lost(&mut self, settings: &Settings) {
        if settings.auto_pause_on_blur && self.phase == SessionPhase::Racing {
            log::info!("Auto-paused (window blur)");
            self.apply(RaceCommand::Pause);
        }
    }

    /// Continue to the next level after a completed race.
    /// Returns false if the last race did not end on time.
    pub fn next_level(&mut self) -> bool {
        let completed = self.phase == SessionPhase::Finished
            && self.state.result().is_some_and(|r| r.completed);
        if !completed {
            return false;
        }
        let seed = self.state.rng.random();
        let config = self.config.next_level(seed);
        log::info!(
            "Level {} (time limit {}s, difficulty {:.1})",
            config.level,
            config.time_limit_secs,
            crate::difficulty_for_level(config.level)
        );
        self.start(config);
        true
    }

    /// Start over from level 1 with the original time limit.
    /// Returns false if the session was stopped.
    pub fn restart(&mut self) -> bool {
        if self.phase == SessionPhase::Stopped {
            log::warn!("Restart ignored: race was stopped");
            return false;
        }
        let seed = self.state.rng.random();
        let config = RaceConfig {
            vehicle: self.config.vehicle.clone(),
            level: 1,
            time_limit_secs: self.base_time_limit,
            seed,
        };
        log::info!("Race restarted with seed {}", seed);
        self.start(config);
        true
    }

    /// JSON snapshot of the current state for the renderer
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.state)
    }

    fn start(&mut self, config: RaceConfig) {
        self.state = RaceState::new(&config);
        self.config = config;
        self.phase = SessionPhase::Racing;
        self.queue.clear();
        self.frame_accumulator = 0.0;
        self.ticks_since_second = 0;
        self.pending_steer = (false, false);
        self.reported = false;
    }

    fn request_pause(&mut self) {
        self.phase = SessionPhase::Paused;
        log::info!("Race paused at tick {}", self.state.time_ticks);
        self.observer.on_pause_requested();
    }

    fn dispatch(&mut self, events: Vec<RaceEvent>) {
        for event in &events {
            self.observer.on_event(event);
        }

        if self.reported {
            return;
        }
        if let Some(result) = self.state.result() {
            self.reported = true;
            self.phase = SessionPhase::Finished;
            log::info!(
                "Race over: score {} ({})",
                result.score,
                if result.completed { "completed" } else { "crashed out" }
            );
            self.observer.on_race_over(result.score, result.completed);
        }
    }
}
