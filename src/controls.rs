//! Keyboard state to control snapshot
//!
//! Held keys (throttle, brake, nitro) stay set until released. Steering and
//! pause are one-shot: they fire once per key press and are cleared when the
//! host consumes the snapshot.

use crate::sim::ControlInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Accelerate,
    Brake,
    SteerLeft,
    SteerRight,
    Nitro,
    Pause,
}

/// Map a `KeyboardEvent.key` value to a control
pub fn control_for_key(key: &str) -> Option<Control> {
    match key.to_lowercase().as_str() {
        "arrowup" | "w" => Some(Control::Accelerate),
        "arrowdown" | "s" | " " => Some(Control::Brake),
        "arrowleft" | "a" => Some(Control::SteerLeft),
        "arrowright" | "d" => Some(Control::SteerRight),
        "n" | "shift" => Some(Control::Nitro),
        "p" | "escape" => Some(Control::Pause),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Controls {
    input: ControlInput,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Press a control (keyboard or on-screen button)
    pub fn press(&mut self, control: Control) {
        match control {
            Control::Accelerate => self.input.accelerate = true,
            Control::Brake => self.input.brake = true,
            Control::SteerLeft => self.input.steer_left = true,
            Control::SteerRight => self.input.steer_right = true,
            Control::Nitro => self.input.nitro = true,
            Control::Pause => self.input.pause = true,
        }
    }

    /// Release a held control. One-shot controls are unaffected.
    pub fn release(&mut self, control: Control) {
        match control {
            Control::Accelerate => self.input.accelerate = false,
            Control::Brake => self.input.brake = false,
            Control::Nitro => self.input.nitro = false,
            Control::SteerLeft | Control::SteerRight | Control::Pause => {}
        }
    }

    /// Returns true if the key is bound
    pub fn key_down(&mut self, key: &str) -> bool {
        match control_for_key(key) {
            Some(control) => {
                self.press(control);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        match control_for_key(key) {
            Some(control) => {
                self.release(control);
                true
            }
            None => false,
        }
    }

    /// Snapshot for the next frame; clears one-shot controls
    pub fn take(&mut self) -> ControlInput {
        let snapshot = self.input;
        self.input.steer_left = false;
        self.input.steer_right = false;
        self.input.pause = false;
        snapshot
    }

    /// Drop everything, e.g. when the window loses focus and key-ups are lost
    pub fn reset(&mut self) {
        self.input = ControlInput::default();
    }
}
