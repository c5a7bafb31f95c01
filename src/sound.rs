//! Sound cues: the engine queues them, a sink plays them (fire-and-forget).

use std::io::{Stdout, Write};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoundCue {
    /// Mole hit; pitch is a playback-rate factor around 1.0.
    Hit { pitch: f32 },
    /// Multiplier went up.
    Multiplier,
    Miss,
}

impl SoundCue {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hit { .. } => "hit",
            Self::Multiplier => "multiplier",
            Self::Miss => "miss",
        }
    }
}

/// Audio collaborator. Playback failures are swallowed; nothing reads back.
pub trait SoundSink {
    fn play(&mut self, cue: SoundCue);

    /// Short name for logs.
    fn label(&self) -> &'static str;
}

#[derive(Debug, Default)]
pub struct Silent;

impl SoundSink for Silent {
    fn play(&mut self, cue: SoundCue) {
        tracing::trace!(cue = cue.name(), "sound muted");
    }

    fn label(&self) -> &'static str {
        "silent"
    }
}

/// Rings the terminal bell for misses and multiplier increases. Plain hits stay
/// quiet so the bell does not fire on every click.
#[derive(Debug)]
pub struct TerminalBell<W: Write = Stdout> {
    out: W,
}

impl Default for TerminalBell {
    fn default() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> SoundSink for TerminalBell<W> {
    fn play(&mut self, cue: SoundCue) {
        match cue {
            SoundCue::Hit { pitch } => tracing::trace!(pitch, "hit cue"),
            SoundCue::Multiplier | SoundCue::Miss => {
                if let Err(err) = self.out.write_all(b"\x07").and_then(|()| self.out.flush()) {
                    tracing::debug!(%err, cue = cue.name(), "bell failed");
                }
            }
        }
    }

    fn label(&self) -> &'static str {
        "bell"
    }
}

/// Build the sink selected on the command line.
pub fn sink_for(enabled: bool) -> Box<dyn SoundSink> {
    if enabled {
        Box::new(TerminalBell::default())
    } else {
        Box::new(Silent)
    }
}
