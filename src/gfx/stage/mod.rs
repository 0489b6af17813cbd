//! # Lighting Stage
//!
//! Environment-based lighting from a named preset plus an ambient intensity
//! scalar. A preset resolves to a small set of colors (zenith, horizon,
//! ground, ambient tint) and a key light; the gradient environment dome and
//! the mesh shading both draw from it. Unknown presets fall back to a flat
//! neutral-gray environment - a warning, never an error.

use crate::config::Rgb;
use crate::error::ConfigIssue;

/// Colors and key light a preset resolves to
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentColors {
    pub zenith: Rgb,
    pub horizon: Rgb,
    pub ground: Rgb,
    /// Uniform ambient tint applied to all lightable nodes
    pub ambient: Rgb,
    /// Normalized direction the key light shines from
    pub key_direction: [f32; 3],
    pub key_color: Rgb,
}

/// A named image-based lighting configuration
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentPreset {
    pub name: &'static str,
    pub colors: EnvironmentColors,
}

macro_rules! preset {
    ($name:literal, $zenith:expr, $horizon:expr, $ground:expr, $ambient:expr, $dir:expr, $key:expr) => {
        EnvironmentPreset {
            name: $name,
            colors: EnvironmentColors {
                zenith: $zenith,
                horizon: $horizon,
                ground: $ground,
                ambient: $ambient,
                key_direction: $dir,
                key_color: $key,
            },
        }
    };
}

/// The preset table. Colors approximate the look of the matching HDRI
/// environments used by the original staging setups.
pub const PRESETS: &[EnvironmentPreset] = &[
    preset!(
        "apartment",
        Rgb::new(0.64, 0.58, 0.50),
        Rgb::new(0.78, 0.70, 0.58),
        Rgb::new(0.30, 0.26, 0.22),
        Rgb::new(0.58, 0.54, 0.48),
        [0.4, 0.8, 0.45],
        Rgb::new(1.0, 0.95, 0.85)
    ),
    preset!(
        "city",
        Rgb::new(0.45, 0.52, 0.62),
        Rgb::new(0.70, 0.68, 0.64),
        Rgb::new(0.22, 0.22, 0.24),
        Rgb::new(0.52, 0.54, 0.58),
        [0.35, 0.75, 0.55],
        Rgb::new(0.95, 0.93, 0.88)
    ),
    preset!(
        "dawn",
        Rgb::new(0.35, 0.40, 0.58),
        Rgb::new(0.95, 0.62, 0.42),
        Rgb::new(0.20, 0.17, 0.18),
        Rgb::new(0.55, 0.45, 0.42),
        [0.1, 0.35, 0.93],
        Rgb::new(1.0, 0.75, 0.55)
    ),
    preset!(
        "forest",
        Rgb::new(0.38, 0.52, 0.38),
        Rgb::new(0.55, 0.62, 0.42),
        Rgb::new(0.14, 0.18, 0.12),
        Rgb::new(0.38, 0.46, 0.35),
        [0.25, 0.9, 0.35],
        Rgb::new(0.9, 0.95, 0.8)
    ),
    preset!(
        "lobby",
        Rgb::new(0.58, 0.52, 0.42),
        Rgb::new(0.75, 0.66, 0.52),
        Rgb::new(0.32, 0.28, 0.22),
        Rgb::new(0.58, 0.52, 0.44),
        [0.0, 0.95, 0.3],
        Rgb::new(1.0, 0.92, 0.78)
    ),
    preset!(
        "night",
        Rgb::new(0.04, 0.05, 0.10),
        Rgb::new(0.10, 0.10, 0.16),
        Rgb::new(0.02, 0.02, 0.04),
        Rgb::new(0.10, 0.11, 0.18),
        [-0.3, 0.8, 0.52],
        Rgb::new(0.55, 0.60, 0.80)
    ),
    preset!(
        "park",
        Rgb::new(0.42, 0.58, 0.80),
        Rgb::new(0.68, 0.74, 0.62),
        Rgb::new(0.20, 0.26, 0.16),
        Rgb::new(0.50, 0.56, 0.52),
        [0.3, 0.85, 0.42],
        Rgb::new(1.0, 0.97, 0.88)
    ),
    preset!(
        "studio",
        Rgb::new(0.72, 0.72, 0.74),
        Rgb::new(0.85, 0.85, 0.86),
        Rgb::new(0.40, 0.40, 0.42),
        Rgb::new(0.70, 0.70, 0.72),
        [0.5, 0.8, 0.33],
        Rgb::new(1.0, 1.0, 1.0)
    ),
    preset!(
        "sunset",
        Rgb::new(0.30, 0.25, 0.45),
        Rgb::new(0.98, 0.55, 0.30),
        Rgb::new(0.18, 0.13, 0.13),
        Rgb::new(0.60, 0.42, 0.36),
        [-0.15, 0.25, 0.96],
        Rgb::new(1.0, 0.65, 0.40)
    ),
    preset!(
        "warehouse",
        Rgb::new(0.40, 0.42, 0.44),
        Rgb::new(0.55, 0.54, 0.50),
        Rgb::new(0.18, 0.18, 0.18),
        Rgb::new(0.42, 0.42, 0.42),
        [0.0, 1.0, 0.1],
        Rgb::new(0.92, 0.90, 0.85)
    ),
];

/// Flat fallback used when a preset name is unknown.
pub const NEUTRAL_GRAY: EnvironmentPreset = preset!(
    "neutral-gray",
    Rgb::new(0.5, 0.5, 0.5),
    Rgb::new(0.5, 0.5, 0.5),
    Rgb::new(0.5, 0.5, 0.5),
    Rgb::new(0.5, 0.5, 0.5),
    [0.0, 1.0, 0.0],
    Rgb::new(1.0, 1.0, 1.0)
);

/// Looks up a preset by name.
pub fn lookup_preset(name: &str) -> Option<&'static EnvironmentPreset> {
    PRESETS.iter().find(|preset| preset.name == name)
}

/// The staged lighting environment
///
/// Owns the resolved preset, the intensity multiplier and the background
/// color. Intensity zero disables environment lighting while the background
/// color stays in effect.
pub struct LightingStage {
    preset: EnvironmentPreset,
    fallback: bool,
    pub intensity: f32,
    pub background: Rgb,
}

impl LightingStage {
    /// Resolves a preset name into a stage.
    ///
    /// Unknown names produce the neutral-gray environment and an
    /// [`ConfigIssue::UnknownPreset`]; the caller decides how to report it.
    pub fn new(preset_name: &str, intensity: f32, background: Rgb) -> (Self, Option<ConfigIssue>) {
        let (preset, issue) = match lookup_preset(preset_name) {
            Some(preset) => (*preset, None),
            None => (
                NEUTRAL_GRAY,
                Some(ConfigIssue::UnknownPreset {
                    requested: preset_name.to_string(),
                }),
            ),
        };

        let stage = Self {
            preset,
            fallback: issue.is_some(),
            intensity: intensity.max(0.0),
            background,
        };
        (stage, issue)
    }

    pub fn preset_name(&self) -> &'static str {
        self.preset.name
    }

    /// True when the requested preset was unknown and neutral gray is in use.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn colors(&self) -> &EnvironmentColors {
        &self.preset.colors
    }

    /// Ambient contribution already scaled by intensity.
    pub fn ambient_light(&self) -> Rgb {
        self.preset.colors.ambient.scaled(self.intensity)
    }

    /// Key light color already scaled by intensity.
    pub fn key_light(&self) -> Rgb {
        self.preset.colors.key_color.scaled(self.intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_preset_resolves() {
        let (stage, issue) = LightingStage::new("city", 0.5, Rgb::new(0.0, 0.0, 0.0));
        assert!(issue.is_none());
        assert!(!stage.is_fallback());
        assert_eq!(stage.preset_name(), "city");
    }

    #[test]
    fn test_all_presets_lookup_by_name() {
        for preset in PRESETS {
            assert!(lookup_preset(preset.name).is_some());
        }
        assert_eq!(PRESETS.len(), 10);
    }

    #[test]
    fn test_unknown_preset_falls_back_to_neutral_gray() {
        let (stage, issue) =
            LightingStage::new("nonexistent-preset", 0.5, Rgb::new(0.02, 0.02, 0.02));
        assert!(matches!(issue, Some(ConfigIssue::UnknownPreset { .. })));
        assert!(stage.is_fallback());
        assert_eq!(stage.colors().zenith, Rgb::new(0.5, 0.5, 0.5));
        assert_eq!(stage.colors().ground, Rgb::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_zero_intensity_disables_lighting_keeps_background() {
        let background = Rgb::new(0.02, 0.02, 0.02);
        let (stage, _) = LightingStage::new("city", 0.0, background);
        assert_eq!(stage.ambient_light(), Rgb::new(0.0, 0.0, 0.0));
        assert_eq!(stage.key_light(), Rgb::new(0.0, 0.0, 0.0));
        assert_eq!(stage.background, background);
    }

    #[test]
    fn test_negative_intensity_clamps_to_zero() {
        let (stage, _) = LightingStage::new("city", -2.0, Rgb::new(0.0, 0.0, 0.0));
        assert_eq!(stage.intensity, 0.0);
    }
}
