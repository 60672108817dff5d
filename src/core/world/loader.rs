//=========================================================================
// Scene Loader
//=========================================================================
//
// Builds a fresh `World` for a viewport from the configured scene source.
// Called on the render thread every time a window is (re)initialised.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::info;
#[cfg(feature = "audio")]
use log::warn;

//=== Internal Dependencies ===============================================

use super::{SceneDescription, SceneError, Viewport, World, WorldSounds, PYRAMID};
use crate::config::{SceneConfig, SoundConfig};
use crate::core::assets::AssetClient;
use crate::core::audio::{AudioPlayer, MuteAudio, SoundBuffer};
#[cfg(feature = "audio")]
use crate::core::audio::KiraAudio;

//=== SceneSetup ==========================================================

/// World factory handed to the render loop.
pub type SceneSetup = Box<dyn FnMut(Viewport) -> Result<World, SceneError> + Send>;

//=== SceneLoader =========================================================

/// Loads scene files and sounds through the asset server.
#[derive(Debug, Clone)]
pub struct SceneLoader {
    scene: SceneConfig,
    sounds: SoundConfig,
    assets: AssetClient,
}

impl SceneLoader {
    pub fn new(scene: SceneConfig, sounds: SoundConfig, assets: AssetClient) -> Self {
        Self { scene, sounds, assets }
    }

    /// Builds the world. Missing or malformed assets are errors.
    pub fn build(&self, viewport: Viewport) -> Result<World, SceneError> {
        let mut world = World::new(viewport);
        let sounds = self.load_sounds()?;
        let (explosion, impact) = output_players(&sounds);
        world.set_audio(explosion, impact, sounds);

        match &self.scene {
            SceneConfig::Pyramid => {
                world.load_from_description(&SceneDescription::Grid(
                    PYRAMID.iter().map(|r| r.to_string()).collect(),
                ))?;
            }
            SceneConfig::Random { count } => world.populate_random(*count),
            SceneConfig::Grid { path } => {
                let text = self.assets.read_to_string(path)?;
                world.load_from_description(&SceneDescription::grid_from_text(&text))?;
            }
            SceneConfig::Svg { path } => {
                let text = self.assets.read_to_string(path)?;
                world.load_from_description(&SceneDescription::Svg(text))?;
            }
        }

        info!(
            target: "world",
            "Scene '{}' ready: {} boxes in {}x{}",
            self.scene,
            world.box_count(),
            viewport.width,
            viewport.height
        );
        Ok(world)
    }

    /// Wraps the loader as a render-loop scene setup.
    pub fn into_setup(self) -> SceneSetup {
        Box::new(move |viewport| self.build(viewport))
    }

    fn load_sounds(&self) -> Result<WorldSounds, SceneError> {
        let load = |name: &Option<String>| -> Result<Option<SoundBuffer>, SceneError> {
            match name {
                Some(name) => Ok(Some(SoundBuffer::new(name, self.assets.read(name)?))),
                None => Ok(None),
            }
        };

        Ok(WorldSounds {
            explosion: load(&self.sounds.explosion)?,
            impact: load(&self.sounds.impact)?,
        })
    }
}

//=== Players =============================================================

/// One shared speaker when any sound is configured and an output device
/// opens, silent players otherwise.
fn output_players(sounds: &WorldSounds) -> (Box<dyn AudioPlayer>, Box<dyn AudioPlayer>) {
    #[cfg(feature = "audio")]
    if sounds.explosion.is_some() || sounds.impact.is_some() {
        match KiraAudio::new() {
            Ok(speaker) => return (Box::new(speaker.clone()), Box::new(speaker)),
            Err(e) => warn!(target: "audio", "{}; sounds are muted", e),
        }
    }

    #[cfg(not(feature = "audio"))]
    let _ = sounds;

    (Box::new(MuteAudio::new()), Box::new(MuteAudio::new()))
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assets::{spawn_asset_server, AssetError};
    use std::fs;
    use std::path::PathBuf;

    fn temp_root(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("boxfall-scenes-{}-{}", tag, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn loader(root: &PathBuf, scene: SceneConfig, sounds: SoundConfig) -> SceneLoader {
        let (client, _handle) = spawn_asset_server(root).unwrap();
        SceneLoader::new(scene, sounds, client)
    }

    #[test]
    fn pyramid_needs_no_assets() {
        let root = temp_root("pyramid");
        let world = loader(&root, SceneConfig::Pyramid, SoundConfig::default())
            .build(Viewport::new(480, 320))
            .unwrap();

        assert!(world.box_count() > 0);
        assert!(world.ground().is_some());
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn random_scene_uses_count() {
        let root = temp_root("random");
        let world = loader(&root, SceneConfig::Random { count: 12 }, SoundConfig::default())
            .build(Viewport::new(300, 300))
            .unwrap();

        assert_eq!(world.box_count(), 12);
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn grid_and_svg_files_are_read_from_assets() {
        let root = temp_root("files");
        fs::write(root.join("tower.txt"), "+\n+\n").unwrap();
        fs::write(
            root.join("world.svg"),
            r#"<svg width="100" height="100"><g><rect x="0" y="0" width="10" height="10"/><line x1="0" y1="90" x2="100" y2="90"/></g></svg>"#,
        )
        .unwrap();

        let grid = loader(&root, SceneConfig::Grid { path: "tower.txt".into() }, SoundConfig::default())
            .build(Viewport::new(100, 100))
            .unwrap();
        assert_eq!(grid.box_count(), 2);

        let svg = loader(&root, SceneConfig::Svg { path: "world.svg".into() }, SoundConfig::default())
            .build(Viewport::new(200, 200))
            .unwrap();
        assert_eq!(svg.box_count(), 1);

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn missing_scene_file_is_fatal() {
        let root = temp_root("missing");
        let result = loader(&root, SceneConfig::Svg { path: "nope.svg".into() }, SoundConfig::default())
            .build(Viewport::new(100, 100));

        assert!(matches!(
            result,
            Err(SceneError::Asset(AssetError::NotFound(ref name))) if name == "nope.svg"
        ));
        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn configured_sounds_must_exist() {
        let root = temp_root("sounds");
        fs::write(root.join("explosion.pcm"), [0u8; 8]).unwrap();

        let ok = SoundConfig {
            explosion: Some("explosion.pcm".into()),
            impact: None,
        };
        assert!(loader(&root, SceneConfig::Pyramid, ok).build(Viewport::new(100, 100)).is_ok());

        let missing = SoundConfig {
            explosion: None,
            impact: Some("impact.pcm".into()),
        };
        assert!(loader(&root, SceneConfig::Pyramid, missing).build(Viewport::new(100, 100)).is_err());

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn no_configured_sounds_means_silent_players() {
        let (explosion, impact) = output_players(&WorldSounds::default());
        assert!(!explosion.is_audible());
        assert!(!impact.is_audible());
    }

    #[cfg(feature = "audio")]
    #[test]
    fn configured_sounds_use_the_speaker_when_a_device_opens() {
        let sounds = WorldSounds {
            explosion: Some(SoundBuffer::new("explosion.pcm", vec![0; 8])),
            impact: None,
        };
        let (explosion, impact) = output_players(&sounds);
        let audible = (explosion.is_audible(), impact.is_audible());
        drop((explosion, impact));

        let device = KiraAudio::new().is_ok();
        assert_eq!(audible, (device, device));
    }

    #[test]
    fn setup_closure_builds_repeatedly() {
        let root = temp_root("setup");
        let mut setup = loader(&root, SceneConfig::Random { count: 3 }, SoundConfig::default()).into_setup();

        assert_eq!(setup(Viewport::new(100, 100)).unwrap().box_count(), 3);
        assert_eq!(setup(Viewport::new(200, 100)).unwrap().viewport(), Viewport::new(200, 100));
        fs::remove_dir_all(root).ok();
    }
}
