//! Arena phase.

/// Coarse state of the arena; doors may require a specific phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArenaPhase {
    /// Actors are placed, the start zone is still sealed.
    #[default]
    Starting,
    /// Normal play; the start zone is permeable.
    Playing,
    /// The level is cleared and the player heads back to the start zone.
    Returning,
    Finished,
}

impl ArenaPhase {
    /// Resolve a phase name from level data (case-insensitive).
    pub fn parse(name: &str) -> Option<ArenaPhase> {
        match name.trim().to_ascii_lowercase().as_str() {
            "starting" => Some(ArenaPhase::Starting),
            "playing" => Some(ArenaPhase::Playing),
            "returning" => Some(ArenaPhase::Returning),
            "finished" => Some(ArenaPhase::Finished),
            _ => None,
        }
    }

    #[inline]
    pub fn is_playing(self) -> bool {
        self == ArenaPhase::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!(ArenaPhase::parse("Playing"), Some(ArenaPhase::Playing));
        assert_eq!(ArenaPhase::parse(" returning "), Some(ArenaPhase::Returning));
        assert_eq!(ArenaPhase::parse("Paused"), None);
    }
}
