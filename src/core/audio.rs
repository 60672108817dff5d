//=========================================================================
// Audio Collaborator
//=========================================================================
//
// Sound effects are byte buffers handed to an `AudioPlayer`. The world
// owns its players and destroys them when the scene is released.
//
//   MuteAudio   silent; counts plays (tests, headless runs, no device)
//   KiraAudio   default output device through kira (`audio` feature)
//
// Buffers are either a container kira can decode (WAV, Ogg, FLAC, MP3)
// or headerless 16-bit little-endian mono PCM at `RAW_PCM_SAMPLE_RATE`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use log::trace;

//=== Submodules ==========================================================

#[cfg(feature = "audio")]
mod speaker;

#[cfg(feature = "audio")]
pub use speaker::KiraAudio;

//=== Constants ===========================================================

/// Sample rate assumed for headerless PCM buffers.
pub const RAW_PCM_SAMPLE_RATE: u32 = 44_100;

//=== SoundBuffer =========================================================

/// Immutable PCM sample data, cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundBuffer {
    name: Arc<str>,
    samples: Arc<[u8]>,
}

impl SoundBuffer {
    pub fn new(name: &str, samples: Vec<u8>) -> Self {
        Self {
            name: Arc::from(name),
            samples: Arc::from(samples),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

//=== AudioPlayer =========================================================

/// Plays sound buffers. Lives on the render thread.
pub trait AudioPlayer {
    /// Starts playing `sound`. Ignored after `destroy`.
    fn play(&self, sound: &SoundBuffer);

    /// Releases the underlying audio resources.
    fn destroy(&mut self);

    fn is_destroyed(&self) -> bool;

    /// Whether `play` reaches a real output device.
    fn is_audible(&self) -> bool {
        false
    }
}

//=== AudioError ==========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The output device could not be opened.
    Device(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(e) => write!(f, "Audio output unavailable: {}", e),
        }
    }
}

impl std::error::Error for AudioError {}

//=== MuteAudio ===========================================================

/// Player that produces no sound, only trace logs and a play counter.
#[derive(Debug, Default)]
pub struct MuteAudio {
    plays: Cell<u64>,
    destroyed: bool,
}

impl MuteAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accepted `play` calls.
    pub fn plays(&self) -> u64 {
        self.plays.get()
    }
}

impl AudioPlayer for MuteAudio {
    fn play(&self, sound: &SoundBuffer) {
        if self.destroyed {
            return;
        }
        trace!(target: "audio", "play '{}' ({} bytes)", sound.name(), sound.samples().len());
        self.plays.set(self.plays.get() + 1);
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
