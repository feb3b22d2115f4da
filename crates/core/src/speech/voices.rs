use crate::speech::Voice;

/// Known voices plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct VoiceCatalog {
    voices: Vec<Voice>,
    preferred: Option<String>,
    selected: Option<usize>,
}

/// First voice whose language matches the primary subtag of `language`,
/// else the first voice at all.
#[must_use]
pub fn default_voice<'a>(voices: &'a [Voice], language: &str) -> Option<&'a Voice> {
    let prefix = language
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    voices
        .iter()
        .find(|voice| !prefix.is_empty() && voice.lang.to_lowercase().starts_with(&prefix))
        .or_else(|| voices.first())
}

impl VoiceCatalog {
    /// Remember `name` as the preferred voice; takes effect on the next
    /// refresh or reselect.
    pub fn prefer(&mut self, name: &str) {
        self.preferred = Some(name.to_owned());
    }

    #[must_use]
    pub fn preferred(&self) -> Option<&str> {
        self.preferred.as_deref()
    }

    /// Replace the voice list, keeping the preferred voice if it is offered.
    pub fn refresh(&mut self, voices: Vec<Voice>, language: &str) {
        self.voices = voices;
        self.reselect(language);
    }

    /// Re-apply the selection rule for a new lesson language.
    pub fn reselect(&mut self, language: &str) {
        let preferred = self
            .preferred
            .as_deref()
            .and_then(|name| self.voices.iter().position(|v| v.name == name));
        self.selected = preferred.or_else(|| {
            default_voice(&self.voices, language)
                .and_then(|chosen| self.voices.iter().position(|v| v == chosen))
        });
    }

    /// Select a voice by name; unknown names leave the selection unchanged.
    pub fn select(&mut self, name: &str) -> bool {
        match self.voices.iter().position(|v| v.name == name) {
            Some(index) => {
                self.preferred = Some(name.to_owned());
                self.selected = Some(index);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Voice> {
        self.selected.and_then(|index| self.voices.get(index))
    }

    #[must_use]
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }
}
