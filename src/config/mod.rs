//=========================================================================
// Application Configuration
//=========================================================================
//
// Explicit configuration value passed down to the engine. Nothing here
// is global.
//
// Sources, lowest to highest precedence:
//   defaults → TOML file (`--config`) → command-line flags
//
// Example file:
// ```toml
// frames_per_second = 30
// scene = "svg:world.svg"
// tap = "explode"
//
// [window]
// width = 480
// height = 320
//
// [sounds]
// explosion = "explosion.pcm"
// ```
//
//=========================================================================

//=== Module Declarations =================================================

mod cli;

//=== External Dependencies ===============================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

//=== Public API ==========================================================

pub use cli::{parse_args, CliCommand, CliOptions, USAGE};

//=== Constants ===========================================================

/// Box count for `random` without an explicit count.
pub const DEFAULT_RANDOM_BOXES: usize = 50;

//=== ConfigError =========================================================

/// Configuration loading and validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The config file could not be read.
    Io { path: PathBuf, message: String },

    /// The config file is not valid TOML for `AppConfig`.
    Parse(String),

    /// A value is out of range or malformed.
    InvalidValue { option: String, value: String },

    /// A flag that needs a value was last on the command line.
    MissingValue(String),

    /// Unrecognised command-line argument.
    UnknownArgument(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "Failed to read config {}: {}", path.display(), message)
            }
            Self::Parse(e) => write!(f, "Invalid config file: {}", e),
            Self::InvalidValue { option, value } => {
                write!(f, "Invalid value '{}' for {}", value, option)
            }
            Self::MissingValue(flag) => write!(f, "Missing value for {}", flag),
            Self::UnknownArgument(arg) => write!(f, "Unknown argument: {}", arg),
        }
    }
}

impl std::error::Error for ConfigError {}

fn invalid(option: &str, value: impl fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        option: option.to_owned(),
        value: value.to_string(),
    }
}

//=== TapAction ===========================================================

/// What a tap does to the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TapAction {
    /// Radial force pushing every box away from the tap.
    #[default]
    Explode,

    /// Drop a small spinning box at the tap.
    Drop,

    /// Remove the box under the tap.
    Remove,
}

impl FromStr for TapAction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "explode" => Ok(Self::Explode),
            "drop" => Ok(Self::Drop),
            "remove" => Ok(Self::Remove),
            other => Err(invalid("tap", other)),
        }
    }
}

//=== SceneConfig =========================================================

/// Initial scene source.
///
/// Written as `pyramid`, `random`, `random:N`, `grid:PATH` or `svg:PATH`;
/// paths are relative to the asset root.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum SceneConfig {
    /// Built-in character grid.
    #[default]
    Pyramid,

    /// Ground at a third of the height and boxes scattered along the top.
    Random { count: usize },

    /// Character grid file.
    Grid { path: String },

    /// SVG scene file.
    Svg { path: String },
}

impl FromStr for SceneConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, arg) = match s.split_once(':') {
            Some((kind, arg)) => (kind, Some(arg)),
            None => (s, None),
        };

        match (kind, arg) {
            ("pyramid", None) => Ok(Self::Pyramid),
            ("random", None) => Ok(Self::Random { count: DEFAULT_RANDOM_BOXES }),
            ("random", Some(n)) => n
                .parse()
                .map(|count| Self::Random { count })
                .map_err(|_| invalid("scene", s)),
            ("grid", Some(path)) if !path.is_empty() => Ok(Self::Grid { path: path.to_owned() }),
            ("svg", Some(path)) if !path.is_empty() => Ok(Self::Svg { path: path.to_owned() }),
            _ => Err(invalid("scene", s)),
        }
    }
}

impl TryFrom<String> for SceneConfig {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for SceneConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pyramid => write!(f, "pyramid"),
            Self::Random { count } => write!(f, "random:{}", count),
            Self::Grid { path } => write!(f, "grid:{}", path),
            Self::Svg { path } => write!(f, "svg:{}", path),
        }
    }
}

//=== Sections ============================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "boxfall".into(),
            width: 480,
            height: 320,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetConfig {
    /// Directory scene and sound names are resolved against.
    pub root: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self { root: PathBuf::from("assets") }
    }
}

/// Optional raw PCM sound effects, named relative to the asset root.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SoundConfig {
    pub explosion: Option<String>,
    pub impact: Option<String>,
}

//=== AppConfig ===========================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub frames_per_second: u32,
    pub scene: SceneConfig,
    pub tap: TapAction,

    /// Destroy the scene when the app is paused.
    pub release_on_pause: bool,

    pub assets: AssetConfig,
    pub sounds: SoundConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            frames_per_second: 30,
            scene: SceneConfig::default(),
            tap: TapAction::default(),
            release_on_pause: true,
            assets: AssetConfig::default(),
            sounds: SoundConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))
    }

    /// Reads and parses a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_owned(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frames_per_second == 0 {
            return Err(invalid("frames_per_second", self.frames_per_second));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid(
                "window size",
                format!("{}x{}", self.window.width, self.window.height),
            ));
        }
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    //=====================================================================
    // Defaults and TOML
    //=====================================================================

    #[test]
    fn defaults() {
        let c = AppConfig::default();
        assert_eq!(c.window, WindowConfig { title: "boxfall".into(), width: 480, height: 320 });
        assert_eq!(c.frames_per_second, 30);
        assert_eq!(c.scene, SceneConfig::Pyramid);
        assert_eq!(c.tap, TapAction::Explode);
        assert!(c.release_on_pause);
        assert_eq!(c.assets.root, PathBuf::from("assets"));
        assert_eq!(c.sounds, SoundConfig::default());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn toml_overrides_fields() {
        let c = AppConfig::from_toml_str(
            r#"
            frames_per_second = 60
            scene = "svg:world.svg"
            tap = "drop"
            release_on_pause = false

            [window]
            width = 800

            [sounds]
            impact = "impact.pcm"
            "#,
        )
        .unwrap();

        assert_eq!(c.frames_per_second, 60);
        assert_eq!(c.scene, SceneConfig::Svg { path: "world.svg".into() });
        assert_eq!(c.tap, TapAction::Drop);
        assert!(!c.release_on_pause);
        assert_eq!(c.window.width, 800);
        assert_eq!(c.window.height, 320);
        assert_eq!(c.sounds.impact.as_deref(), Some("impact.pcm"));
        assert_eq!(c.sounds.explosion, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            AppConfig::from_toml_str("fps = 60"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn bad_scene_in_toml_is_rejected() {
        assert!(matches!(
            AppConfig::from_toml_str("scene = \"cube\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let path = Path::new("/definitely/not/here.toml");
        assert!(matches!(AppConfig::load(path), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn validate_rejects_zero_values() {
        let mut c = AppConfig::default();
        c.frames_per_second = 0;
        assert!(c.validate().is_err());

        let mut c = AppConfig::default();
        c.window.height = 0;
        assert!(c.validate().is_err());
    }

    //=====================================================================
    // Value Parsing
    //=====================================================================

    #[test]
    fn scene_forms() {
        assert_eq!("pyramid".parse(), Ok(SceneConfig::Pyramid));
        assert_eq!("random".parse(), Ok(SceneConfig::Random { count: DEFAULT_RANDOM_BOXES }));
        assert_eq!("random:7".parse(), Ok(SceneConfig::Random { count: 7 }));
        assert_eq!("grid:tower.txt".parse(), Ok(SceneConfig::Grid { path: "tower.txt".into() }));
        assert_eq!("svg:a/b.svg".parse(), Ok(SceneConfig::Svg { path: "a/b.svg".into() }));

        assert!("svg:".parse::<SceneConfig>().is_err());
        assert!("random:x".parse::<SceneConfig>().is_err());
        assert!("pyramid:1".parse::<SceneConfig>().is_err());
    }

    #[test]
    fn scene_display_round_trips() {
        let scene = SceneConfig::Grid { path: "g.txt".into() };
        assert_eq!(scene.to_string().parse(), Ok(scene));
    }

    #[test]
    fn tap_forms() {
        assert_eq!("remove".parse(), Ok(TapAction::Remove));
        assert_eq!(
            "boom".parse::<TapAction>(),
            Err(ConfigError::InvalidValue { option: "tap".into(), value: "boom".into() })
        );
    }
}
