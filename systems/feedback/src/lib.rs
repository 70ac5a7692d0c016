#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure feedback system that maps world events onto audio cues.

use quince_core::{Event, SoundCue, SoundEffect};

/// Listens for world events and queues sound cues for the audio collaborator.
#[derive(Debug, Default)]
pub struct Feedback;

impl Feedback {
    /// Consumes a batch of world events and appends the cues they trigger.
    ///
    /// Several bumps in one batch produce a single cue. Rebuilding the grid
    /// silences effects that belong to the discarded layout.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<SoundCue>) {
        let mut bumped = false;
        for event in events {
            match event {
                Event::TileGridConfigured { .. } => {
                    bumped = false;
                    out.push(SoundCue::Stop(SoundEffect::Bump));
                }
                Event::PlayerBumped { .. } => bumped = true,
                _ => {}
            }
        }

        if bumped {
            out.push(SoundCue::Play(SoundEffect::Bump));
        }
    }
}
