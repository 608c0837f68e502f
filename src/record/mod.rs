// Purpose: capture a performance as note events and render it to a file
// Runs beside live play; nothing here touches the output service

pub mod event;
pub mod recorder;
pub mod render;

pub use event::{NoteEnd, NoteEvent};
pub use recorder::{Recorder, RecorderState, Take};
pub use render::{Mixdown, Renderer};
