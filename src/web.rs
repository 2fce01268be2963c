//! Browser bindings
//!
//! The page owns the canvas, DOM and `requestAnimationFrame` loop. It forwards
//! key events here, calls `frame` once per animation frame, draws the returned
//! JSON state and shows whatever `take_notifications` hands back.

use wasm_bindgen::prelude::*;

use crate::config::RaceConfig;
use crate::controls::Controls;
use crate::highscores::HighScores;
use crate::notify::{self, Notification};
use crate::session::{EventLog, RaceCommand, RaceSession, SessionPhase};
use crate::settings::Settings;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    log::info!("Lane Racer starting...");
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// One race screen's worth of state
#[wasm_bindgen]
pub struct WebRace {
    session: RaceSession<EventLog>,
    controls: Controls,
    settings: Settings,
    high_scores: HighScores,
    pending: Vec<Notification>,
}

#[wasm_bindgen]
impl WebRace {
    #[wasm_bindgen(constructor)]
    pub fn new(vehicle_id: &str, track_id: &str, level: u32) -> Result<WebRace, JsValue> {
        let seed = js_sys::Date::now() as u64;
        let config = RaceConfig::from_catalog(vehicle_id, track_id, level, seed).map_err(|e| {
            log::warn!("Rejected race config: {}", e);
            js_error(e)
        })?;
        let pending = vec![notify::race_started(&config.vehicle)];
        Ok(WebRace {
            session: RaceSession::new(config, EventLog::default()),
            controls: Controls::new(),
            settings: Settings::load(),
            high_scores: HighScores::load(),
            pending,
        })
    }

    /// Returns true if the key is bound (so the page can preventDefault)
    pub fn key_down(&mut self, key: &str) -> bool {
        self.controls.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.controls.key_up(key)
    }

    /// Advance by `dt` seconds of wall time and return the state as JSON
    pub fn frame(&mut self, dt: f32) -> Result<String, JsValue> {
        let input = self.controls.take();
        self.session.advance(dt, &input);
        self.collect_notifications();
        self.session.snapshot_json().map_err(js_error)
    }

    pub fn pause(&mut self) {
        self.session.apply(RaceCommand::Pause);
    }

    pub fn resume(&mut self) {
        self.controls.reset();
        self.session.apply(RaceCommand::Resume);
    }

    /// Leaving the race screen
    pub fn stop(&mut self) {
        self.session.apply(RaceCommand::Stop);
    }

    pub fn blur(&mut self) {
        self.controls.reset();
        self.session.focus_lost(&self.settings);
    }

    pub fn is_paused(&self) -> bool {
        self.session.phase() == SessionPhase::Paused
    }

    pub fn is_finished(&self) -> bool {
        self.session.phase() == SessionPhase::Finished
    }

    pub fn next_level(&mut self) -> bool {
        let advanced = self.session.next_level();
        if advanced {
            let config = self.session.config();
            self.pending
                .push(notify::level_started(config.level, config.time_limit_secs));
        }
        advanced
    }

    pub fn restart(&mut self) -> bool {
        self.controls.reset();
        self.session.restart()
    }

    /// Switch the countdown to the page's own `setInterval(.., 1000)`
    pub fn use_wall_clock(&mut self, enabled: bool) {
        self.session.set_wall_clock(enabled);
    }

    /// One real second elapsed (only meaningful after `use_wall_clock(true)`)
    pub fn clock_second(&mut self) {
        self.session.enqueue(RaceCommand::ClockSecond);
        self.session.drain();
        self.collect_notifications();
    }

    /// Notifications raised since the last call, as a JSON array
    pub fn take_notifications(&mut self) -> Result<String, JsValue> {
        let json = serde_json::to_string(&self.pending).map_err(js_error)?;
        self.pending.clear();
        Ok(json)
    }

    pub fn has_high_scores(&self) -> bool {
        !self.high_scores.is_empty()
    }

    /// Leaderboard place the current score would take, for the HUD
    pub fn potential_rank(&self) -> Option<u32> {
        self.high_scores
            .potential_rank(self.session.state().score)
            .map(|rank| rank as u32)
    }

    pub fn high_scores(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.high_scores).map_err(js_error)
    }

    pub fn settings(&self) -> Result<String, JsValue> {
        self.settings.to_json().map_err(js_error)
    }

    pub fn set_settings(&mut self, json: &str) -> Result<(), JsValue> {
        self.settings = Settings::from_json(json).map_err(js_error)?;
        self.settings.save();
        Ok(())
    }
}

impl WebRace {
    fn collect_notifications(&mut self) {
        let observer = self.session.observer_mut();
        let events = std::mem::take(&mut observer.events);
        let race_overs = std::mem::take(&mut observer.race_overs);
        observer.pause_requests = 0;

        self.pending
            .extend(notify::notifications_for(&events, &self.settings));

        for (score, completed) in race_overs {
            let Some(result) = self.session.state().result() else {
                continue;
            };
            let new_best = self.high_scores.is_new_best(score);
            if self
                .high_scores
                .add_result(&result, js_sys::Date::now())
                .is_some()
            {
                self.high_scores.save();
            }
            self.pending.push(notify::race_over(score, completed));
            if new_best {
                self.pending.push(notify::new_high_score(score));
            }
        }
    }
}
