//! Viewer configuration surface
//!
//! One plain struct covers every recognized option. Raw values (hex color
//! strings, unclamped scalars) are resolved into typed [`SceneSettings`]
//! before the scene is composed; out-of-range values are clamped and
//! reported as [`ConfigIssue`]s rather than rejected, since all of this is
//! cosmetic configuration.

use crate::error::ConfigIssue;
use crate::gfx::resources::reflector::ReflectorParams;

/// Linear RGB color triple
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parses a `#rrggbb` hex string (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        Some(Self {
            r: ((value >> 16) & 0xff) as f32 / 255.0,
            g: ((value >> 8) & 0xff) as f32 / 255.0,
            b: (value & 0xff) as f32 / 255.0,
        })
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Scales all channels, used for intensity-weighted lighting terms.
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }
}

/// Reflective surface material options, as supplied by the host
///
/// `base_color` is a hex string here; the resolved, clamped form is
/// [`ReflectorParams`].
#[derive(Debug, Clone)]
pub struct ReflectorConfig {
    /// Gaussian blur kernel (x, y) in capture-buffer texels
    pub blur: (u32, u32),
    /// Offscreen capture buffer edge length; powers of two are a performance
    /// hint, not a requirement
    pub resolution: u32,
    /// Blend between blurred (1.0) and sharp (0.0) reflection
    pub mix_blur: f32,
    /// Reflection opacity
    pub opacity: f32,
    /// Surface tint as `#rrggbb`
    pub base_color: String,
}

impl Default for ReflectorConfig {
    fn default() -> Self {
        Self {
            blur: (300, 100),
            resolution: 2048,
            mix_blur: 1.0,
            opacity: 0.5,
            base_color: "#101010".to_string(),
        }
    }
}

/// Every option the viewer recognizes
///
/// Defaults reproduce the showcase configuration: a dark stage lit by the
/// "city" environment at half intensity, auto-rotating orbit camera with
/// zoom disabled, and a heavily blurred half-opacity reflector.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Device pixel ratio clamp range `[min, max]`
    pub pixel_ratio_range: [f64; 2],
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    /// Background color as `#rrggbb`
    pub background: String,
    /// Named environment preset, e.g. "city"
    pub environment_preset: String,
    /// Non-negative environment lighting multiplier; zero disables
    /// environment lighting but keeps the background color
    pub environment_intensity: f32,
    /// Spin the camera around the target while idle
    pub auto_rotate: bool,
    /// Auto-rotate speed in turns per minute (at a 60 Hz refresh)
    pub auto_rotate_speed: f32,
    /// When false, scroll and pinch input is ignored entirely
    pub zoom_enabled: bool,
    /// Reflective surface material options
    pub reflector: ReflectorConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            pixel_ratio_range: [1.0, 2.0],
            field_of_view: 45.0,
            background: "#050505".to_string(),
            environment_preset: "city".to_string(),
            environment_intensity: 0.5,
            auto_rotate: true,
            auto_rotate_speed: 2.0,
            zoom_enabled: false,
            reflector: ReflectorConfig::default(),
        }
    }
}

/// Resolved, validated configuration the scene is composed from
#[derive(Debug, Clone)]
pub struct SceneSettings {
    pub pixel_ratio_range: [f64; 2],
    pub field_of_view: f32,
    pub background: Rgb,
    pub environment_preset: String,
    pub environment_intensity: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub zoom_enabled: bool,
    pub reflector: ReflectorParams,
}

impl ViewerConfig {
    /// Resolves raw options into typed settings, clamping anything
    /// out of range and collecting one issue per substitution.
    ///
    /// Preset lookup is deliberately NOT done here; the lighting stage owns
    /// the preset table and reports `UnknownPreset` itself.
    pub fn resolve(&self) -> (SceneSettings, Vec<ConfigIssue>) {
        let mut issues = Vec::new();

        let pixel_ratio_range = resolve_pixel_ratio_range(self.pixel_ratio_range, &mut issues);

        let field_of_view = if self.field_of_view > 0.0 && self.field_of_view < 180.0 {
            self.field_of_view
        } else {
            issues.push(ConfigIssue::InvalidConfigValue {
                field: "field_of_view",
                supplied: format!("{}", self.field_of_view),
                substituted: "45".to_string(),
            });
            45.0
        };

        let background = resolve_color("background", &self.background, Rgb::new(0.02, 0.02, 0.02), &mut issues);

        let environment_intensity = if self.environment_intensity >= 0.0 {
            self.environment_intensity
        } else {
            issues.push(ConfigIssue::InvalidConfigValue {
                field: "environment_intensity",
                supplied: format!("{}", self.environment_intensity),
                substituted: "0".to_string(),
            });
            0.0
        };

        let base_color = resolve_color(
            "reflector.base_color",
            &self.reflector.base_color,
            Rgb::new(0.06, 0.06, 0.06),
            &mut issues,
        );
        let reflector = ReflectorParams::new(
            self.reflector.blur,
            self.reflector.resolution,
            self.reflector.mix_blur,
            self.reflector.opacity,
            base_color,
        )
        .clamped(&mut issues);

        let settings = SceneSettings {
            pixel_ratio_range,
            field_of_view,
            background,
            environment_preset: self.environment_preset.clone(),
            environment_intensity,
            auto_rotate: self.auto_rotate,
            auto_rotate_speed: self.auto_rotate_speed.max(0.0),
            zoom_enabled: self.zoom_enabled,
            reflector,
        };

        (settings, issues)
    }
}

fn resolve_pixel_ratio_range(range: [f64; 2], issues: &mut Vec<ConfigIssue>) -> [f64; 2] {
    let [min, max] = range;
    if min > 0.0 && max > 0.0 && min <= max {
        return range;
    }
    issues.push(ConfigIssue::InvalidConfigValue {
        field: "pixel_ratio_range",
        supplied: format!("[{}, {}]", min, max),
        substituted: "[1, 2]".to_string(),
    });
    [1.0, 2.0]
}

fn resolve_color(
    field: &'static str,
    hex: &str,
    fallback: Rgb,
    issues: &mut Vec<ConfigIssue>,
) -> Rgb {
    match Rgb::from_hex(hex) {
        Some(color) => color,
        None => {
            issues.push(ConfigIssue::InvalidConfigValue {
                field,
                supplied: hex.to_string(),
                substituted: "fallback color".to_string(),
            });
            fallback
        }
    }
}

/// Clamps a window scale factor into the configured device pixel ratio range.
pub fn clamp_pixel_ratio(range: [f64; 2], scale_factor: f64) -> f64 {
    scale_factor.clamp(range[0], range[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parse() {
        let color = Rgb::from_hex("#101010").unwrap();
        assert!((color.r - 16.0 / 255.0).abs() < 1e-6);
        assert_eq!(color.r, color.g);
        assert_eq!(color.g, color.b);

        assert!(Rgb::from_hex("050505").is_some());
        assert!(Rgb::from_hex("#12345").is_none());
        assert!(Rgb::from_hex("#gggggg").is_none());
    }

    #[test]
    fn test_default_matches_showcase() {
        let config = ViewerConfig::default();
        assert_eq!(config.pixel_ratio_range, [1.0, 2.0]);
        assert_eq!(config.field_of_view, 45.0);
        assert!(!config.zoom_enabled);
        assert!(config.auto_rotate);
        assert_eq!(config.reflector.resolution, 2048);
        assert_eq!(config.reflector.blur, (300, 100));
    }

    #[test]
    fn test_resolve_clean_config_has_no_issues() {
        let (settings, issues) = ViewerConfig::default().resolve();
        assert!(issues.is_empty());
        assert_eq!(settings.environment_preset, "city");
        assert_eq!(settings.environment_intensity, 0.5);
    }

    #[test]
    fn test_resolve_clamps_bad_values() {
        let config = ViewerConfig {
            field_of_view: -10.0,
            environment_intensity: -1.0,
            pixel_ratio_range: [2.0, 1.0],
            ..Default::default()
        };
        let (settings, issues) = config.resolve();
        assert_eq!(settings.field_of_view, 45.0);
        assert_eq!(settings.environment_intensity, 0.0);
        assert_eq!(settings.pixel_ratio_range, [1.0, 2.0]);
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn test_resolve_bad_hex_substitutes_fallback() {
        let config = ViewerConfig {
            background: "not-a-color".to_string(),
            ..Default::default()
        };
        let (settings, issues) = config.resolve();
        assert!(issues
            .iter()
            .any(|i| matches!(i, ConfigIssue::InvalidConfigValue { field: "background", .. })));
        assert!(settings.background.r < 0.1);
    }

    #[test]
    fn test_pixel_ratio_clamp() {
        assert_eq!(clamp_pixel_ratio([1.0, 2.0], 3.0), 2.0);
        assert_eq!(clamp_pixel_ratio([1.0, 2.0], 0.5), 1.0);
        assert_eq!(clamp_pixel_ratio([1.0, 2.0], 1.5), 1.5);
    }
}
