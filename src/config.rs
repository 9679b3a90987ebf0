//! Engine configuration.
//!
//! Defaults reproduce the vibraphone voice: a 10 ms linear strike up to 0.4,
//! then an exponential fall to the inaudible floor over 0.8 s (4 s with the
//! pedal down), through a lowpass at three times the fundamental.
//!
//! With the `serde` feature the whole tree can be loaded from TOML; every
//! table and field is optional and falls back to its default:
//!
//! ```toml
//! [envelope]
//! decay = 1.2
//!
//! [output.backend]
//! kind = "device"
//! name = "pulse"
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field} must be {requirement}, got {value}")]
    Invalid {
        field: &'static str,
        requirement: &'static str,
        value: f64,
    },

    #[cfg(feature = "serde")]
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
}

/// Amplitude envelope and release windows. Times are in seconds, levels are
/// fractions of full scale.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeConfig {
    /// Linear ramp from silence to `peak`
    pub attack: f64,
    pub peak: f32,
    /// Exponential fall to `floor` with the sustain pedal up
    pub decay: f64,
    /// Exponential fall to `floor` with the sustain pedal down
    pub sustained_decay: f64,
    /// Fade applied to a voice that is struck again while still sounding
    pub retrigger_release: f64,
    /// Fade applied to every voice when the pedal is lifted
    pub forced_release: f64,
    /// Target of every exponential ramp (exact zero is unreachable)
    pub floor: f32,
    /// Extra time after the envelope lands on `floor` before the oscillator stops
    pub stop_margin: f64,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 0.01,
            peak: 0.4,
            decay: 0.8,
            sustained_decay: 4.0,
            retrigger_release: 0.02,
            forced_release: 0.25,
            floor: 0.0001,
            stop_margin: 0.1,
        }
    }
}

impl EnvelopeConfig {
    /// Decay window for the given pedal state.
    pub fn decay_for(&self, sustain_active: bool) -> f64 {
        if sustain_active {
            self.sustained_decay
        } else {
            self.decay
        }
    }
}

/// Filter voicing applied to every note.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct ToneConfig {
    /// Lowpass cutoff as a multiple of the note's fundamental
    pub cutoff_ratio: f32,
    /// Lowpass quality factor
    pub resonance: f32,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            cutoff_ratio: 3.0,
            resonance: 1.0,
        }
    }
}

/// Where rendered audio goes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
#[derive(Debug, Clone, PartialEq)]
pub enum OutputBackend {
    /// A cpal output device; the host default when `name` is `None`
    Device { name: Option<String> },
    /// Blocks are pulled by the caller through `AudioContext::render`
    Offline { sample_rate: f32 },
}

impl Default for OutputBackend {
    fn default() -> Self {
        OutputBackend::Device { name: None }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub backend: OutputBackend,
    /// Capacity of the control → render command ring
    pub command_capacity: usize,
    /// Capacity of the render → control termination ring
    pub event_capacity: usize,
    /// Signal chains the render side reserves room for up front
    pub voice_capacity: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            backend: OutputBackend::default(),
            command_capacity: 1024,
            event_capacity: 256,
            voice_capacity: 64,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub envelope: EnvelopeConfig,
    pub tone: ToneConfig,
    pub output: OutputConfig,
}

impl EngineConfig {
    /// Default voicing rendered offline at `sample_rate`.
    pub fn offline(sample_rate: f32) -> Self {
        Self {
            output: OutputConfig {
                backend: OutputBackend::Offline { sample_rate },
                ..OutputConfig::default()
            },
            ..Self::default()
        }
    }

    #[cfg(feature = "serde")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let env = &self.envelope;
        positive("envelope.attack", env.attack)?;
        positive("envelope.decay", env.decay)?;
        positive("envelope.sustained_decay", env.sustained_decay)?;
        positive("envelope.retrigger_release", env.retrigger_release)?;
        positive("envelope.forced_release", env.forced_release)?;
        if env.decay <= env.attack {
            return Err(invalid("envelope.decay", "longer than attack", env.decay));
        }
        if env.sustained_decay <= env.attack {
            return Err(invalid(
                "envelope.sustained_decay",
                "longer than attack",
                env.sustained_decay,
            ));
        }

        if !(env.stop_margin >= 0.0 && env.stop_margin.is_finite()) {
            return Err(invalid("envelope.stop_margin", "non-negative", env.stop_margin));
        }
        if !(env.peak > 0.0 && env.peak <= 1.0) {
            return Err(invalid("envelope.peak", "in (0, 1]", env.peak as f64));
        }
        if !(env.floor > 0.0 && env.floor < env.peak) {
            return Err(invalid("envelope.floor", "in (0, peak)", env.floor as f64));
        }

        positive("tone.cutoff_ratio", self.tone.cutoff_ratio as f64)?;
        positive("tone.resonance", self.tone.resonance as f64)?;

        let out = &self.output;
        if out.command_capacity == 0 {
            return Err(invalid("output.command_capacity", "non-zero", 0.0));
        }
        if out.event_capacity == 0 {
            return Err(invalid("output.event_capacity", "non-zero", 0.0));
        }
        if out.voice_capacity == 0 {
            return Err(invalid("output.voice_capacity", "non-zero", 0.0));
        }
        if let OutputBackend::Offline { sample_rate } = out.backend {
            positive("output.backend.sample_rate", sample_rate as f64)?;
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, "positive", value))
    }
}

fn invalid(field: &'static str, requirement: &'static str, value: f64) -> ConfigError {
    ConfigError::Invalid {
        field,
        requirement,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_vibraphone_voicing() {
        let config = EngineConfig::default();
        let env = &config.envelope;

        assert!((env.attack - 0.01).abs() < 1e-12);
        assert!((env.peak - 0.4).abs() < 1e-6);
        assert!((env.decay_for(false) - 0.8).abs() < 1e-12);
        assert!((env.decay_for(true) - 4.0).abs() < 1e-12);
        assert!((env.retrigger_release - 0.02).abs() < 1e-12);
        assert!((env.forced_release - 0.25).abs() < 1e-12);
        assert!((env.floor - 0.0001).abs() < 1e-9);
        assert!((env.stop_margin - 0.1).abs() < 1e-12);
        assert!((config.tone.cutoff_ratio - 3.0).abs() < 1e-6);
        assert!((config.tone.resonance - 1.0).abs() < 1e-6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_floor_above_peak() {
        let mut config = EngineConfig::default();
        config.envelope.floor = 0.5;

        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "envelope.floor"),
            other => panic!("expected invalid floor, got {other:?}"),
        }
    }

    #[test]
    fn rejects_zero_capacities() {
        for field in ["command", "event", "voice"] {
            let mut config = EngineConfig::default();
            match field {
                "command" => config.output.command_capacity = 0,
                "event" => config.output.event_capacity = 0,
                _ => config.output.voice_capacity = 0,
            }

            match config.validate() {
                Err(ConfigError::Invalid { field: name, .. }) => {
                    assert_eq!(name, format!("output.{field}_capacity"))
                }
                other => panic!("expected zero {field} capacity to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_zero_offline_sample_rate() {
        let config = EngineConfig::offline(0.0);
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [envelope]
            decay = 1.2

            [output.backend]
            kind = "offline"
            sample_rate = 44100.0
            "#,
        )
        .expect("config should parse");

        assert!((config.envelope.decay - 1.2).abs() < 1e-12);
        assert!((config.envelope.sustained_decay - 4.0).abs() < 1e-12);
        assert_eq!(
            config.output.backend,
            OutputBackend::Offline {
                sample_rate: 44_100.0
            }
        );
        assert_eq!(config.output.command_capacity, 1024);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn toml_values_are_validated() {
        let result = EngineConfig::from_toml_str("[envelope]\nattack = -1.0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
