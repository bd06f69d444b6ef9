// File: ./src/model/prefs.rs
// Persisted UI preferences
use crate::model::item::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Basic mode ignores priority, due date and tag when adding tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Basic,
    Advanced,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Basic => Mode::Advanced,
            Mode::Advanced => Mode::Basic,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Basic => "basic",
            Mode::Advanced => "advanced",
        })
    }
}

impl FromStr for Mode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Mode::Basic),
            "advanced" => Ok(Mode::Advanced),
            other => Err(ParseError::Mode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Midnight,
    Sunset,
    Forest,
    Ocean,
    Aurora,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::Light,
        Theme::Midnight,
        Theme::Sunset,
        Theme::Forest,
        Theme::Ocean,
        Theme::Aurora,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Midnight => "Midnight",
            Theme::Sunset => "Sunset",
            Theme::Forest => "Forest",
            Theme::Ocean => "Ocean",
            Theme::Aurora => "Aurora",
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Midnight | Theme::Ocean | Theme::Aurora)
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl FromStr for Theme {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.name().to_lowercase() == lower)
            .ok_or(ParseError::Theme(lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_cycle_visits_every_theme() {
        let mut seen = vec![Theme::Light];
        let mut t = Theme::Light.next();
        while t != Theme::Light {
            seen.push(t);
            t = t.next();
        }
        assert_eq!(seen, Theme::ALL.to_vec());
    }

    #[test]
    fn dark_themes() {
        let dark: Vec<Theme> = Theme::ALL.into_iter().filter(Theme::is_dark).collect();
        assert_eq!(dark, vec![Theme::Midnight, Theme::Ocean, Theme::Aurora]);
        assert_eq!("Ocean".parse::<Theme>(), Ok(Theme::Ocean));
        assert_eq!("advanced".parse::<Mode>(), Ok(Mode::Advanced));
    }
}
