use std::sync::Arc;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer};

use crate::synth::cache::CachedVoice;

/// Identifies one playback of a cached voice in the output service.
///
/// Allocated by the engine, never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceHandle(pub u64);

/// One-way commands to the audio output service.
///
/// The engine never waits on a reply: a `FadeOut` is issued and the voice's
/// bookkeeping is dropped in the same call.
#[derive(Debug, Clone)]
pub enum VoiceCommand {
    /// Start looping `voice` at `volume` under `handle`.
    Play {
        handle: VoiceHandle,
        voice: Arc<CachedVoice>,
        volume: f32,
    },
    /// Ramp `handle` to silence over `millis`, then drop it.
    FadeOut { handle: VoiceHandle, millis: u32 },
    /// Silence every handle immediately.
    StopAll,
}

/// Where the engine sends voice commands.
pub trait CommandSink {
    fn send(&mut self, command: VoiceCommand);
}

/// Where the output service reads voice commands from.
pub trait CommandReceiver {
    fn pop(&mut self) -> Option<VoiceCommand>;
}

impl CommandSink for Vec<VoiceCommand> {
    fn send(&mut self, command: VoiceCommand) {
        self.push(command);
    }
}

impl CommandReceiver for std::collections::VecDeque<VoiceCommand> {
    fn pop(&mut self) -> Option<VoiceCommand> {
        self.pop_front()
    }
}

#[cfg(feature = "rtrb")]
impl CommandSink for Producer<VoiceCommand> {
    fn send(&mut self, command: VoiceCommand) {
        if let Err(rtrb::PushError::Full(dropped)) = self.push(command) {
            log::warn!("voice command queue full, dropping {dropped:?}");
        }
    }
}

#[cfg(feature = "rtrb")]
impl CommandReceiver for Consumer<VoiceCommand> {
    fn pop(&mut self) -> Option<VoiceCommand> {
        Consumer::pop(self).ok()
    }
}
