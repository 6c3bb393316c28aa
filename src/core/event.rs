/// Key transition carried by a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPhase {
    Press,
    Release,
}

/// Result of a single poll
///
/// Only `Key` carries data. Events are produced fresh each poll and never retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Event {
    /// Nothing happened, or something the runtime does not care about
    #[default]
    None,
    Key { phase: KeyPhase },
}

impl Event {
    pub const fn press() -> Self {
        Event::Key {
            phase: KeyPhase::Press,
        }
    }

    pub const fn release() -> Self {
        Event::Key {
            phase: KeyPhase::Release,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Event::None)
    }

    pub fn is_key(&self) -> bool {
        matches!(self, Event::Key { .. })
    }

    pub fn key_phase(&self) -> Option<KeyPhase> {
        match self {
            Event::Key { phase } => Some(*phase),
            Event::None => None,
        }
    }
}

impl From<KeyPhase> for Event {
    fn from(phase: KeyPhase) -> Self {
        Event::Key { phase }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_none() {
        assert_eq!(Event::default(), Event::None);
        assert!(Event::default().is_none());
    }

    #[test]
    fn key_phase_only_for_keys() {
        assert_eq!(Event::press().key_phase(), Some(KeyPhase::Press));
        assert_eq!(Event::release().key_phase(), Some(KeyPhase::Release));
        assert_eq!(Event::None.key_phase(), None);
    }

    #[test]
    fn key_events_compare_by_phase() {
        assert_eq!(Event::press(), Event::from(KeyPhase::Press));
        assert_ne!(Event::press(), Event::release());
        assert!(Event::release().is_key());
        assert!(!Event::None.is_key());
    }
}
