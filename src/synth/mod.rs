// Purpose: live voices, their cached buffers and the output service they drive
// This layer sits above the dsp primitives and below the engine context

pub mod cache;
pub mod live;
pub mod message;
pub mod playback;
pub mod voice;

pub use cache::{CacheKey, CachedVoice, VoiceCache};
pub use live::LiveVoices;
pub use message::{CommandReceiver, CommandSink, VoiceCommand, VoiceHandle};
pub use playback::PlaybackMixer;
pub use voice::{ActiveVoice, VoiceInfo};
