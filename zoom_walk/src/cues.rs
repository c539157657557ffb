//! Light-switch sound cues.
//!
//! The pipeline emits a [`Cue`] whenever the active picture's accent light
//! changes state.  Cues are sent to a background thread that plays a short
//! MIDI note per cue, so the render loop never waits on a note.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use gallery_core::navigation::Cue;

// ════════════════════════════════════════════════════════════════════════════
// CueCommand — sent to the cue thread
// ════════════════════════════════════════════════════════════════════════════

pub enum CueCommand {
    Play(Cue),
    /// Terminate the thread.
    Quit,
}

/// Note played for each cue: a rising click for "on", a lower one for "off".
pub fn cue_note(cue: Cue) -> u8 {
    match cue {
        Cue::LightOn => 76,  // E5
        Cue::LightOff => 64, // E4
    }
}

/// How long a cue note sounds.
pub const CUE_MS: u64 = 120;

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / null
// ════════════════════════════════════════════════════════════════════════════

trait MidiOut: Send {
    fn program_change(&mut self, channel: u8, program: u8);
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
}

// ── midir backend ─────────────────────────────────────────────────────────

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn program_change(&mut self, channel: u8, program: u8) {
        let _ = self.conn.send(&[0xC0 | (channel & 0x0F), program]);
    }
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let _ = self.conn.send(&[0x90 | (channel & 0x0F), note, velocity]);
    }
    fn note_off(&mut self, channel: u8, note: u8) {
        let _ = self.conn.send(&[0x80 | (channel & 0x0F), note, 0]);
    }
}

// ── null backend (muted, or no MIDI port available) ───────────────────────

struct NullOut;
impl MidiOut for NullOut {
    fn program_change(&mut self, _ch: u8, _p: u8)   {}
    fn note_on(&mut self, _ch: u8, _n: u8, _v: u8)  {}
    fn note_off(&mut self, _ch: u8, _n: u8)          {}
}

/// Open the first available MIDI output port, preferring a softsynth.
/// Falls back to `NullOut` if none is usable.
fn open_midi_output() -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("zoom_walk_cues") {
        Ok(m) => m,
        Err(e) => {
            warn!(error = %e, "MIDI init failed, cues muted");
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        warn!("no MIDI output ports found, cues muted");
        return Box::new(NullOut);
    }

    let port_idx = ports
        .iter()
        .position(|p| {
            midi_out.port_name(p).map_or(false, |n| {
                let n = n.to_lowercase();
                n.contains("fluid") || n.contains("timidity") || n.contains("microsoft") || n.contains("synth")
            })
        })
        .unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out.port_name(port).unwrap_or_else(|_| "Unknown".to_string());
    info!(port = %name, "opening MIDI port for cues");

    match midi_out.connect(port, "zoom-walk-cues") {
        Ok(conn) => Box::new(MidirOut { conn }),
        Err(e) => {
            warn!(error = %e, "MIDI connect failed, cues muted");
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CuePlayer — handle to the cue thread
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
pub struct CueSettings {
    pub muted:    bool,
    /// General MIDI program, 11 = vibraphone.
    pub program:  u8,
    pub velocity: u8,
    pub channel:  u8,
}

impl Default for CueSettings {
    fn default() -> Self {
        CueSettings { muted: false, program: 11, velocity: 90, channel: 0 }
    }
}

pub struct CuePlayer {
    cmd_tx: Sender<CueCommand>,
}

impl CuePlayer {
    /// Spawn the cue thread.  A muted player never touches MIDI.
    pub fn spawn(settings: CueSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<CueCommand>();
        thread::spawn(move || {
            let midi = if settings.muted { Box::new(NullOut) as Box<dyn MidiOut> } else { open_midi_output() };
            cue_thread(midi, settings, cmd_rx);
        });
        CuePlayer { cmd_tx }
    }

    pub fn play(&self, cue: Cue) {
        let _ = self.cmd_tx.send(CueCommand::Play(cue));
    }

    pub fn quit(&self) {
        let _ = self.cmd_tx.send(CueCommand::Quit);
    }
}

impl Drop for CuePlayer {
    fn drop(&mut self) {
        self.quit();
    }
}

fn cue_thread(mut midi: Box<dyn MidiOut>, settings: CueSettings, cmd_rx: Receiver<CueCommand>) {
    midi.program_change(settings.channel, settings.program);

    for cmd in cmd_rx {
        match cmd {
            CueCommand::Play(cue) => {
                let note = cue_note(cue);
                debug!(?cue, note, "cue");
                midi.note_on(settings.channel, note, settings.velocity);
                thread::sleep(Duration::from_millis(CUE_MS));
                midi.note_off(settings.channel, note);
            }
            CueCommand::Quit => return,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_cue_is_higher_than_off() {
        assert!(cue_note(Cue::LightOn) > cue_note(Cue::LightOff));
    }

    #[test]
    fn cue_notes_are_valid_midi() {
        for cue in [Cue::LightOn, Cue::LightOff] {
            assert!(cue_note(cue) <= 127);
        }
    }

    #[test]
    fn muted_player_accepts_cues_and_quits() {
        let player = CuePlayer::spawn(CueSettings { muted: true, ..CueSettings::default() });
        player.play(Cue::LightOn);
        player.play(Cue::LightOff);
        player.quit();
    }
}
