//=========================================================================
// Command Line
//=========================================================================
//
// Flag parsing and overrides on top of the file configuration.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;

use log::LevelFilter;

//=== Internal Dependencies ===============================================

use super::{invalid, AppConfig, ConfigError, SceneConfig, TapAction};

//=== Usage ===============================================================

pub const USAGE: &str = "\
Usage: boxfall [OPTIONS]

Options:
  --config PATH            Load settings from a TOML file
  --size WxH               Window size in pixels (default 480x320)
  --fps N                  Frames per second (default 30)
  --scene SCENE            pyramid | random[:N] | grid:PATH | svg:PATH
  --tap ACTION             explode | drop | remove
  --assets DIR             Asset root directory (default ./assets)
  --keep-scene-on-pause    Keep the scene in memory while paused
  --verbose                Debug logging
  --debug                  Trace logging
  --help                   Print this help
";

//=== CliCommand ==========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Run(CliOptions),
    Help,
}

//=== CliOptions ==========================================================

/// Parsed flags. `None` leaves the file or default value in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub size: Option<(u32, u32)>,
    pub fps: Option<u32>,
    pub scene: Option<SceneConfig>,
    pub tap: Option<TapAction>,
    pub assets: Option<PathBuf>,
    pub keep_scene_on_pause: bool,
    pub log_level: LevelFilter,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            config: None,
            size: None,
            fps: None,
            scene: None,
            tap: None,
            assets: None,
            keep_scene_on_pause: false,
            log_level: LevelFilter::Info,
        }
    }
}

impl CliOptions {
    /// Loads the config file (if any), applies the flags and validates.
    pub fn resolve(&self) -> Result<AppConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Overrides `config` with every flag that was given.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some((width, height)) = self.size {
            config.window.width = width;
            config.window.height = height;
        }
        if let Some(fps) = self.fps {
            config.frames_per_second = fps;
        }
        if let Some(scene) = &self.scene {
            config.scene = scene.clone();
        }
        if let Some(tap) = self.tap {
            config.tap = tap;
        }
        if let Some(root) = &self.assets {
            config.assets.root = root.clone();
        }
        if self.keep_scene_on_pause {
            config.release_on_pause = false;
        }
    }
}

//=== Parsing =============================================================

/// Parses arguments, excluding the program name.
pub fn parse_args<I, S>(args: I) -> Result<CliCommand, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut options = CliOptions::default();
    let mut args = args.into_iter().map(Into::<String>::into);

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().ok_or_else(|| ConfigError::MissingValue(flag.to_owned()));

        match arg.as_str() {
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--config" => options.config = Some(PathBuf::from(value("--config")?)),
            "--size" => options.size = Some(parse_size(&value("--size")?)?),
            "--fps" => {
                let raw = value("--fps")?;
                let fps: u32 = raw.parse().map_err(|_| invalid("--fps", &raw))?;
                options.fps = Some(fps);
            }
            "--scene" => options.scene = Some(value("--scene")?.parse()?),
            "--tap" => options.tap = Some(value("--tap")?.parse()?),
            "--assets" => options.assets = Some(PathBuf::from(value("--assets")?)),
            "--keep-scene-on-pause" => options.keep_scene_on_pause = true,
            "--verbose" | "-v" => options.log_level = options.log_level.max(LevelFilter::Debug),
            "--debug" => options.log_level = LevelFilter::Trace,
            other => return Err(ConfigError::UnknownArgument(other.to_owned())),
        }
    }

    Ok(CliCommand::Run(options))
}

fn parse_size(raw: &str) -> Result<(u32, u32), ConfigError> {
    raw.split_once(['x', 'X'])
        .and_then(|(w, h)| Some((w.trim().parse().ok()?, h.trim().parse().ok()?)))
        .filter(|&(w, h)| w > 0 && h > 0)
        .ok_or_else(|| invalid("--size", raw))
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> CliOptions {
        match parse_args(args.iter().copied()) {
            Ok(CliCommand::Run(options)) => options,
            other => panic!("Expected Run, got {:?}", other),
        }
    }

    //=====================================================================
    // Parsing
    //=====================================================================

    #[test]
    fn no_args_is_default() {
        assert_eq!(run(&[]), CliOptions::default());
    }

    #[test]
    fn all_flags() {
        let o = run(&[
            "--config", "boxfall.toml",
            "--size", "640x480",
            "--fps", "60",
            "--scene", "random:10",
            "--tap", "remove",
            "--assets", "res",
            "--keep-scene-on-pause",
            "--verbose",
        ]);

        assert_eq!(o.config, Some(PathBuf::from("boxfall.toml")));
        assert_eq!(o.size, Some((640, 480)));
        assert_eq!(o.fps, Some(60));
        assert_eq!(o.scene, Some(SceneConfig::Random { count: 10 }));
        assert_eq!(o.tap, Some(TapAction::Remove));
        assert_eq!(o.assets, Some(PathBuf::from("res")));
        assert!(o.keep_scene_on_pause);
        assert_eq!(o.log_level, LevelFilter::Debug);
    }

    #[test]
    fn debug_beats_verbose() {
        assert_eq!(run(&["--debug", "--verbose"]).log_level, LevelFilter::Trace);
        assert_eq!(run(&["--verbose", "--debug"]).log_level, LevelFilter::Trace);
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(parse_args(["--fps", "10", "--help", "--bogus"]), Ok(CliCommand::Help));
    }

    #[test]
    fn errors() {
        assert_eq!(parse_args(["--fps"]), Err(ConfigError::MissingValue("--fps".into())));
        assert_eq!(parse_args(["--wat"]), Err(ConfigError::UnknownArgument("--wat".into())));
        assert!(matches!(parse_args(["--size", "640"]), Err(ConfigError::InvalidValue { .. })));
        assert!(matches!(parse_args(["--size", "0x10"]), Err(ConfigError::InvalidValue { .. })));
        assert!(matches!(parse_args(["--fps", "fast"]), Err(ConfigError::InvalidValue { .. })));
        assert!(matches!(parse_args(["--scene", "cube"]), Err(ConfigError::InvalidValue { .. })));
    }

    //=====================================================================
    // Overrides
    //=====================================================================

    #[test]
    fn flags_override_config() {
        let mut config = AppConfig::default();
        run(&["--size", "100x50", "--tap", "drop", "--keep-scene-on-pause"]).apply(&mut config);

        assert_eq!((config.window.width, config.window.height), (100, 50));
        assert_eq!(config.tap, TapAction::Drop);
        assert!(!config.release_on_pause);
        assert_eq!(config.frames_per_second, 30);
    }

    #[test]
    fn resolve_validates() {
        assert!(run(&["--fps", "0"]).resolve().is_err());
        assert_eq!(run(&[]).resolve(), Ok(AppConfig::default()));
    }
}
