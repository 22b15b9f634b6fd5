//! Control inputs
//!
//! The simulation only ever sees a [`ControlInput`]. Anything that can answer
//! steer/accelerate/brake implements [`InputSource`]; the platform layer feeds
//! raw key, button and orientation events into the sources below.

use serde::{Deserialize, Serialize};

use crate::clamp_finite;

/// One tick's driver command
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlInput {
    /// -1 = full left, 1 = full right
    pub steer: f32,
    /// Throttle, 0-1
    pub accelerate: f32,
    /// Brake, 0-1
    pub brake: f32,
}

impl ControlInput {
    pub fn new(steer: f32, accelerate: f32, brake: f32) -> Self {
        Self {
            steer,
            accelerate,
            brake,
        }
    }

    /// Read the current command from any source
    pub fn sample(source: &dyn InputSource) -> Self {
        Self::new(source.steer(), source.accelerate(), source.brake()).sanitized()
    }

    /// Clamp every axis into range; NaN becomes zero
    pub fn sanitized(self) -> Self {
        Self {
            steer: clamp_finite(self.steer, -1.0, 1.0),
            accelerate: clamp_finite(self.accelerate, 0.0, 1.0),
            brake: clamp_finite(self.brake, 0.0, 1.0),
        }
    }
}

/// Anything that can drive the car
pub trait InputSource {
    fn steer(&self) -> f32;
    fn accelerate(&self) -> f32;
    fn brake(&self) -> f32;
}

/// Logical driving controls shared by keyboard and touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    SteerLeft,
    SteerRight,
    Accelerate,
    Brake,
}

impl Control {
    /// Map a DOM `KeyboardEvent.code` to a control (arrows and WASD)
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" | "KeyA" => Some(Control::SteerLeft),
            "ArrowRight" | "KeyD" => Some(Control::SteerRight),
            "ArrowUp" | "KeyW" => Some(Control::Accelerate),
            "ArrowDown" | "KeyS" => Some(Control::Brake),
            _ => None,
        }
    }

    /// Map an on-screen button id to a control
    pub fn from_button_id(id: &str) -> Option<Self> {
        match id {
            "steer-left" => Some(Control::SteerLeft),
            "steer-right" => Some(Control::SteerRight),
            "gas" => Some(Control::Accelerate),
            "brake" => Some(Control::Brake),
            _ => None,
        }
    }
}

/// Held/released state of the four digital controls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DigitalControls {
    steer_left: bool,
    steer_right: bool,
    accelerate: bool,
    brake: bool,
}

impl DigitalControls {
    fn set(&mut self, control: Control, held: bool) {
        match control {
            Control::SteerLeft => self.steer_left = held,
            Control::SteerRight => self.steer_right = held,
            Control::Accelerate => self.accelerate = held,
            Control::Brake => self.brake = held,
        }
    }

    fn steer(&self) -> f32 {
        let mut s = 0.0;
        if self.steer_left {
            s -= 1.0;
        }
        if self.steer_right {
            s += 1.0;
        }
        s
    }

    fn accelerate(&self) -> f32 {
        if self.accelerate { 1.0 } else { 0.0 }
    }

    fn brake(&self) -> f32 {
        if self.brake { 1.0 } else { 0.0 }
    }
}

/// Keyboard (arrows / WASD)
#[derive(Debug, Clone, Default)]
pub struct KeyboardInput {
    held: DigitalControls,
}

impl KeyboardInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a key event; returns true if the key is a driving key
    /// (the platform layer should then suppress the default action)
    pub fn handle_key(&mut self, code: &str, pressed: bool) -> bool {
        match Control::from_key_code(code) {
            Some(control) => {
                self.held.set(control, pressed);
                true
            }
            None => false,
        }
    }

    /// Release everything (window blur)
    pub fn release_all(&mut self) {
        self.held = DigitalControls::default();
    }
}

impl InputSource for KeyboardInput {
    fn steer(&self) -> f32 {
        self.held.steer()
    }
    fn accelerate(&self) -> f32 {
        self.held.accelerate()
    }
    fn brake(&self) -> f32 {
        self.held.brake()
    }
}

/// On-screen touch buttons
#[derive(Debug, Clone, Default)]
pub struct TouchInput {
    held: DigitalControls,
}

impl TouchInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Touch start / mouse down (`held = true`), touch end / mouse up / leave (`false`)
    pub fn handle_button(&mut self, button_id: &str, held: bool) {
        if let Some(control) = Control::from_button_id(button_id) {
            self.held.set(control, held);
        }
    }

    pub fn release_all(&mut self) {
        self.held = DigitalControls::default();
    }
}

impl InputSource for TouchInput {
    fn steer(&self) -> f32 {
        self.held.steer()
    }
    fn accelerate(&self) -> f32 {
        self.held.accelerate()
    }
    fn brake(&self) -> f32 {
        self.held.brake()
    }
}

/// Device tilt steering (left-right `gamma` angle, degrees)
#[derive(Debug, Clone)]
pub struct TiltInput {
    steer: f32,
    /// Degrees of tilt for full raw deflection
    pub full_tilt_deg: f32,
    /// Tilt below this many degrees is ignored
    pub dead_zone_deg: f32,
    pub sensitivity: f32,
}

impl Default for TiltInput {
    fn default() -> Self {
        Self {
            steer: 0.0,
            full_tilt_deg: 30.0,
            dead_zone_deg: 5.0,
            sensitivity: 3.0,
        }
    }
}

impl TiltInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a device-orientation reading; `None` when the device reports no gamma
    pub fn handle_orientation(&mut self, gamma: Option<f32>) {
        let gamma = gamma.filter(|g| g.is_finite()).unwrap_or(0.0);
        let raw = (gamma / self.full_tilt_deg).clamp(-1.0, 1.0);
        self.steer = if (raw * self.full_tilt_deg).abs() < self.dead_zone_deg {
            0.0
        } else {
            raw * self.sensitivity
        };
    }
}

impl InputSource for TiltInput {
    fn steer(&self) -> f32 {
        self.steer.clamp(-1.0, 1.0)
    }
    // Tilt only steers
    fn accelerate(&self) -> f32 {
        0.0
    }
    fn brake(&self) -> f32 {
        0.0
    }
}

/// Which source steers the car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SteeringMode {
    #[default]
    Touch,
    Tilt,
}

impl SteeringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SteeringMode::Touch => "touch",
            SteeringMode::Tilt => "tilt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "touch" => Some(SteeringMode::Touch),
            "tilt" => Some(SteeringMode::Tilt),
            _ => None,
        }
    }
}

/// Keyboard + touch always available; tilt steers when selected
#[derive(Debug, Clone, Default)]
pub struct CombinedInput {
    pub mode: SteeringMode,
    pub keyboard: KeyboardInput,
    pub touch: TouchInput,
    pub tilt: TiltInput,
}

impl CombinedInput {
    pub fn new(mode: SteeringMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

impl InputSource for CombinedInput {
    fn steer(&self) -> f32 {
        match self.mode {
            SteeringMode::Tilt => self.tilt.steer(),
            SteeringMode::Touch => {
                let touch = self.touch.steer();
                if touch != 0.0 { touch } else { self.keyboard.steer() }
            }
        }
    }

    fn accelerate(&self) -> f32 {
        self.keyboard.accelerate().max(self.touch.accelerate())
    }

    fn brake(&self) -> f32 {
        self.keyboard.brake().max(self.touch.brake())
    }
}
