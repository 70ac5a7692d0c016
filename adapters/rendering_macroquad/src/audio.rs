use std::path::PathBuf;

use anyhow::Result;
use quince_core::SoundCue;
use tracing::{debug, warn};

use crate::manifest::SoundKey;

/// What the audio collaborator should do with a loaded sound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Playback {
    Once(SoundKey),
    Loop(SoundKey),
    Stop(SoundKey),
}

impl Playback {
    fn parts(self) -> (&'static str, SoundKey) {
        match self {
            Self::Once(key) => ("play", key),
            Self::Loop(key) => ("loop", key),
            Self::Stop(key) => ("stop", key),
        }
    }
}

fn cue_playback(cue: SoundCue) -> Playback {
    match cue {
        SoundCue::Play(effect) => Playback::Once(SoundKey::from(effect)),
        SoundCue::Stop(effect) => Playback::Stop(SoundKey::from(effect)),
    }
}

/// Plays sound cues and background music through macroquad.
///
/// Built without the `audio` feature every request is logged and dropped.
pub(crate) struct Audio {
    #[cfg(feature = "audio")]
    sounds: std::collections::HashMap<SoundKey, macroquad::audio::Sound>,
    music_playing: bool,
}

impl Audio {
    /// Decodes every listed sound.
    #[cfg(feature = "audio")]
    pub(crate) async fn load(entries: &[(SoundKey, PathBuf)]) -> Result<Self> {
        use anyhow::{anyhow, Context};

        let mut sounds = std::collections::HashMap::with_capacity(entries.len());
        for (key, path) in entries {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read sound asset at {}", path.display()))?;
            let sound = macroquad::audio::load_sound_from_bytes(&bytes)
                .await
                .map_err(|error| anyhow!("failed to decode sound {key:?}: {error:?}"))?;
            let _ = sounds.insert(*key, sound);
        }
        tracing::info!(sounds = sounds.len(), "audio initialised");
        Ok(Self {
            sounds,
            music_playing: false,
        })
    }

    /// Records that sound support was compiled out.
    #[cfg(not(feature = "audio"))]
    pub(crate) async fn load(entries: &[(SoundKey, PathBuf)]) -> Result<Self> {
        if !entries.is_empty() {
            warn!(
                sounds = entries.len(),
                "built without the `audio` feature; sound cues will be logged only"
            );
        }
        Ok(Self::silent())
    }

    /// Audio with no sounds loaded; every request is dropped.
    pub(crate) fn silent() -> Self {
        Self {
            #[cfg(feature = "audio")]
            sounds: std::collections::HashMap::new(),
            music_playing: false,
        }
    }

    /// Handles a cue drained from the scene.
    pub(crate) fn play_cue(&mut self, cue: SoundCue) {
        self.perform(cue_playback(cue));
    }

    /// Starts looping the background music, if any was loaded.
    pub(crate) fn start_music(&mut self) {
        if self.music_playing {
            return;
        }
        self.music_playing = true;
        self.perform(Playback::Loop(SoundKey::Music));
    }

    /// Stops the background music started by [`Audio::start_music`].
    pub(crate) fn stop_music(&mut self) {
        if !self.music_playing {
            return;
        }
        self.music_playing = false;
        self.perform(Playback::Stop(SoundKey::Music));
    }

    #[cfg(feature = "audio")]
    fn perform(&mut self, playback: Playback) {
        use macroquad::audio::{play_sound, stop_sound, PlaySoundParams};

        let (action, key) = playback.parts();
        let Some(sound) = self.sounds.get(&key).copied() else {
            warn!(?key, "sound missing from asset manifest");
            return;
        };
        debug!(action, ?key, "audio");
        match playback {
            Playback::Once(_) => play_sound(
                sound,
                PlaySoundParams {
                    looped: false,
                    volume: 1.0,
                },
            ),
            Playback::Loop(_) => play_sound(
                sound,
                PlaySoundParams {
                    looped: true,
                    volume: 1.0,
                },
            ),
            Playback::Stop(_) => stop_sound(sound),
        }
    }

    #[cfg(not(feature = "audio"))]
    fn perform(&mut self, playback: Playback) {
        let (action, key) = playback.parts();
        debug!(action, ?key, "audio disabled; dropping request");
    }
}
