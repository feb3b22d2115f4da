/// Narration settings shared by every utterance the controller builds.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeechSettings {
    voice_name: Option<String>,
    rate: f32,
    pitch: f32,
}

#[derive(Clone, Debug, Default)]
pub struct SpeechSettingsDraft {
    pub voice_name: Option<String>,
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
}

impl SpeechSettings {
    pub const MIN_RATE: f32 = 0.6;
    pub const MAX_RATE: f32 = 1.4;
    pub const MIN_PITCH: f32 = 0.6;
    pub const MAX_PITCH: f32 = 1.4;

    #[must_use]
    pub fn voice_name(&self) -> Option<&str> {
        self.voice_name.as_deref()
    }

    #[must_use]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    #[must_use]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[must_use]
    pub fn with_rate(self, rate: f32) -> Self {
        Self {
            rate: clamp_or_default(rate, Self::MIN_RATE, Self::MAX_RATE),
            ..self
        }
    }

    #[must_use]
    pub fn with_pitch(self, pitch: f32) -> Self {
        Self {
            pitch: clamp_or_default(pitch, Self::MIN_PITCH, Self::MAX_PITCH),
            ..self
        }
    }

    #[must_use]
    pub fn with_voice_name(self, voice_name: Option<String>) -> Self {
        Self {
            voice_name: normalize_optional(voice_name),
            ..self
        }
    }
}

impl SpeechSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize the draft: blank voice names become `None`, rate and pitch
    /// are clamped to their supported ranges.
    #[must_use]
    pub fn normalize(self) -> SpeechSettings {
        SpeechSettings::default()
            .with_voice_name(self.voice_name)
            .with_rate(self.rate.unwrap_or(1.0))
            .with_pitch(self.pitch.unwrap_or(1.0))
    }
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            voice_name: None,
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

fn clamp_or_default(value: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        1.0
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
