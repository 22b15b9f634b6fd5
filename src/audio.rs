//! Audio contract
//!
//! Procedural sound described as data: which cue a simulation event
//! triggers, the tones that make up each cue, and the engine voice targets
//! for a given engine level. The front end owns the actual synthesis.

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

/// Engine level (0..1 of max speed) to the engine voice's drive scale
///
/// The voice was tuned against km/h / 50, and max speed is 162 km/h.
pub const ENGINE_DRIVE_SCALE: f32 = 3.24;
/// Below this drive the engine voice fades out
pub const ENGINE_IDLE_DRIVE: f32 = 0.2;

/// One-shot sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Coin collected
    CoinPickup,
    /// Run ended by an obstacle or by leaving the road
    Crash,
    /// Obstacle passed within the near-miss margin
    Warning,
    /// Finite course completed
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
}

/// A single enveloped oscillator note
///
/// Gain starts at `gain` and decays exponentially towards silence over
/// `duration_s`; pitch glides from `start_hz` to `end_hz` over the same span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    pub gain: f32,
    pub delay_s: f32,
    pub duration_s: f32,
    pub highpass_hz: Option<f32>,
}

impl Tone {
    const fn note(waveform: Waveform, hz: f32, gain: f32, delay_s: f32, duration_s: f32) -> Self {
        Self {
            waveform,
            start_hz: hz,
            end_hz: hz,
            gain,
            delay_s,
            duration_s,
            highpass_hz: None,
        }
    }

    const fn glide(mut self, end_hz: f32) -> Self {
        self.end_hz = end_hz;
        self
    }

    const fn highpass(mut self, hz: f32) -> Self {
        self.highpass_hz = Some(hz);
        self
    }

    /// End of the note relative to the cue trigger
    pub fn end_s(&self) -> f32 {
        self.delay_s + self.duration_s
    }
}

const COIN: [Tone; 1] = [Tone::note(Waveform::Sine, 800.0, 0.15, 0.0, 0.3).glide(1200.0)];

const CRASH: [Tone; 1] =
    [Tone::note(Waveform::Triangle, 300.0, 0.3, 0.0, 0.5).glide(50.0).highpass(200.0)];

const WARNING: [Tone; 1] = [Tone::note(Waveform::Sine, 600.0, 0.1, 0.0, 0.1)];

// Rising four-note arpeggio
const FINISH: [Tone; 4] = [
    Tone::note(Waveform::Triangle, 400.0, 0.2, 0.0, 0.4),
    Tone::note(Waveform::Triangle, 500.0, 0.2, 0.1, 0.4),
    Tone::note(Waveform::Triangle, 600.0, 0.2, 0.2, 0.4),
    Tone::note(Waveform::Triangle, 800.0, 0.2, 0.3, 0.5),
];

impl SoundCue {
    /// Notes that make up this cue, in trigger order
    pub fn tones(self) -> &'static [Tone] {
        match self {
            SoundCue::CoinPickup => &COIN,
            SoundCue::Crash => &CRASH,
            SoundCue::Warning => &WARNING,
            SoundCue::Finish => &FINISH,
        }
    }

    /// Total length of the cue in seconds
    pub fn duration_s(self) -> f32 {
        self.tones().iter().map(Tone::end_s).fold(0.0, f32::max)
    }
}

/// Which cue, if any, a simulation event triggers
pub fn cue_for(event: &GameEvent) -> Option<SoundCue> {
    match event {
        GameEvent::PickupCollected { .. } => Some(SoundCue::CoinPickup),
        GameEvent::NearMiss { .. } => Some(SoundCue::Warning),
        GameEvent::Crashed { .. } | GameEvent::OffTrack => Some(SoundCue::Crash),
        GameEvent::Completed => Some(SoundCue::Finish),
    }
}

/// Cues for a frame's events, in event order
pub fn cues_for(events: &[GameEvent]) -> Vec<SoundCue> {
    events.iter().filter_map(cue_for).collect()
}

/// Continuous engine voice targets
///
/// Triangle oscillator through a lowpass filter. The front end should glide
/// towards these values rather than jump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineTone {
    pub frequency_hz: f32,
    pub lowpass_hz: f32,
    pub gain: f32,
}

impl EngineTone {
    pub const SILENT: Self = Self {
        frequency_hz: 200.0,
        lowpass_hz: 600.0,
        gain: 0.0,
    };

    /// Engine voice for a normalized engine level in `[0, 1]`
    pub fn for_level(level: f32) -> Self {
        let level = crate::clamp_finite(level, 0.0, 1.0);
        let drive = level * ENGINE_DRIVE_SCALE;
        if drive < ENGINE_IDLE_DRIVE {
            return Self::SILENT;
        }
        Self {
            frequency_hz: 200.0 + drive * 15.0,
            lowpass_hz: 600.0 + drive * 40.0,
            gain: (drive * 0.02).min(0.04),
        }
    }

    pub fn is_silent(&self) -> bool {
        self.gain <= 0.0
    }
}

/// Volume settings applied on top of the cue and engine gains
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mixer {
    pub master_volume: f32,
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Mixer {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Mixer {
    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = crate::clamp_finite(vol, 0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = crate::clamp_finite(vol, 0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Cue tones with gains scaled by the current volume; empty when silent
    pub fn voice(&self, cue: SoundCue) -> Vec<Tone> {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return Vec::new();
        }
        cue.tones()
            .iter()
            .map(|t| Tone {
                gain: t.gain * vol,
                ..*t
            })
            .collect()
    }

    /// Engine voice scaled by master volume only
    pub fn engine(&self, level: f32) -> EngineTone {
        let mut tone = EngineTone::for_level(level);
        if self.muted {
            tone.gain = 0.0;
        } else {
            tone.gain *= self.master_volume;
        }
        tone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_every_event_has_a_cue() {
        let events = [
            GameEvent::PickupCollected {
                id: 1,
                pos: Vec2::ZERO,
            },
            GameEvent::NearMiss { obstacle_id: 2 },
            GameEvent::Crashed { obstacle_id: 3 },
            GameEvent::OffTrack,
            GameEvent::Completed,
        ];
        assert_eq!(
            cues_for(&events),
            vec![
                SoundCue::CoinPickup,
                SoundCue::Warning,
                SoundCue::Crash,
                SoundCue::Crash,
                SoundCue::Finish,
            ]
        );
    }

    #[test]
    fn test_cue_durations() {
        assert!((SoundCue::CoinPickup.duration_s() - 0.3).abs() < 1e-6);
        assert!((SoundCue::Crash.duration_s() - 0.5).abs() < 1e-6);
        assert!((SoundCue::Warning.duration_s() - 0.1).abs() < 1e-6);
        assert!((SoundCue::Finish.duration_s() - 0.8).abs() < 1e-6);
        assert_eq!(SoundCue::Crash.tones()[0].highpass_hz, Some(200.0));
    }

    #[test]
    fn test_engine_silent_when_crawling() {
        assert!(EngineTone::for_level(0.0).is_silent());
        // 0.05 * 3.24 = 0.162 < 0.2
        assert!(EngineTone::for_level(0.05).is_silent());
        assert!(EngineTone::for_level(f32::NAN).is_silent());
        assert!(!EngineTone::for_level(0.1).is_silent());
    }

    #[test]
    fn test_engine_tone_rises_with_level() {
        let low = EngineTone::for_level(0.25);
        let high = EngineTone::for_level(1.0);
        assert!(high.frequency_hz > low.frequency_hz);
        assert!(high.lowpass_hz > low.lowpass_hz);
        assert!((high.frequency_hz - (200.0 + 3.24 * 15.0)).abs() < 1e-3);
        assert!((high.gain - 0.04).abs() < 1e-6);
        // Over-range levels are clamped
        assert_eq!(EngineTone::for_level(3.0), high);
    }

    #[test]
    fn test_mixer_scales_and_mutes() {
        let mut mixer = Mixer::default();
        mixer.set_master_volume(0.5);
        mixer.set_sfx_volume(2.0);
        assert_eq!(mixer.sfx_volume, 1.0);
        let tones = mixer.voice(SoundCue::CoinPickup);
        assert!((tones[0].gain - 0.075).abs() < 1e-6);
        assert!((mixer.engine(1.0).gain - 0.02).abs() < 1e-6);

        assert!(mixer.toggle_mute());
        assert!(mixer.voice(SoundCue::Crash).is_empty());
        assert!(mixer.engine(1.0).is_silent());
        assert_eq!(mixer.effective_volume(), 0.0);
    }
}
