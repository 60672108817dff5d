//=========================================================================
// Kira Speaker
//=========================================================================
//
// `AudioPlayer` on the default output device.
//
// Clones share one `AudioManager`, so the explosion and impact players
// open a single output stream. Each buffer is decoded on its first play
// and cached by name; undecodable buffers are logged once and skipped.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;
use std::rc::Rc;
use std::sync::Arc;

use kira::sound::static_sound::StaticSoundData;
use kira::{AudioManager, AudioManagerSettings, DefaultBackend};
use log::{debug, trace, warn};

//=== Internal Dependencies ===============================================

use super::{AudioError, AudioPlayer, SoundBuffer, RAW_PCM_SAMPLE_RATE};

//=== Decoding ============================================================

/// Leading bytes of the containers kira decodes.
const CONTAINER_MAGIC: &[&[u8]] = &[b"RIFF", b"OggS", b"fLaC", b"ID3"];

fn is_container(bytes: &[u8]) -> bool {
    CONTAINER_MAGIC.iter().any(|magic| bytes.starts_with(magic))
}

/// Wraps headerless 16-bit mono PCM in a WAV header. A trailing odd
/// byte is dropped.
fn wav_from_pcm16(pcm: &[u8], sample_rate: u32) -> Vec<u8> {
    let data = &pcm[..pcm.len() & !1];
    let data_len = data.len() as u32;

    let mut wav = Vec::with_capacity(44 + data.len());
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVEfmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(data);
    wav
}

fn decode(sound: &SoundBuffer) -> Option<StaticSoundData> {
    let bytes = if is_container(sound.samples()) {
        sound.samples().to_vec()
    } else {
        wav_from_pcm16(sound.samples(), RAW_PCM_SAMPLE_RATE)
    };

    match StaticSoundData::from_cursor(Cursor::new(bytes)) {
        Ok(data) => Some(data),
        Err(e) => {
            warn!(target: "audio", "Cannot decode '{}': {}", sound.name(), e);
            None
        }
    }
}

//=== KiraAudio ===========================================================

struct Output {
    manager: Option<AudioManager<DefaultBackend>>,
    decoded: HashMap<Arc<str>, Option<StaticSoundData>>,
}

/// Plays sounds on the default output device.
///
/// Destroying any clone closes the shared device.
#[derive(Clone)]
pub struct KiraAudio {
    output: Rc<RefCell<Output>>,
    destroyed: bool,
}

impl KiraAudio {
    /// Opens the default output device.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Device`] when no device can be opened.
    pub fn new() -> Result<Self, AudioError> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| AudioError::Device(e.to_string()))?;
        debug!(target: "audio", "Audio output opened");

        Ok(Self {
            output: Rc::new(RefCell::new(Output {
                manager: Some(manager),
                decoded: HashMap::new(),
            })),
            destroyed: false,
        })
    }
}

impl AudioPlayer for KiraAudio {
    fn play(&self, sound: &SoundBuffer) {
        if self.destroyed {
            return;
        }

        let mut output = self.output.borrow_mut();
        let Output { manager, decoded } = &mut *output;
        let Some(manager) = manager.as_mut() else {
            return;
        };
        let Some(data) = decoded
            .entry(Arc::clone(&sound.name))
            .or_insert_with(|| decode(sound))
        else {
            return;
        };

        match manager.play(data.clone()) {
            Ok(_) => trace!(target: "audio", "play '{}'", sound.name()),
            Err(_) => debug!(target: "audio", "No voice left for '{}'", sound.name()),
        }
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        if self.output.borrow_mut().manager.take().is_some() {
            debug!(target: "audio", "Audio output closed");
        }
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn is_audible(&self) -> bool {
        !self.destroyed
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
