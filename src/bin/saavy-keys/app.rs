//! KeysApp - audio output setup and terminal session lifecycle

use std::{io::stdout, path::PathBuf};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::supports_keyboard_enhancement,
};
use rtrb::RingBuffer;

use saavy_keys::{
    synth::{PlaybackMixer, VoiceCommand},
    Engine, EngineConfig, SystemClock,
};

use super::ui::{KeysUi, SCOPE_CAPACITY};

/// Voice commands in flight between the UI thread and the audio callback
const COMMAND_CAPACITY: usize = 1024;

pub struct KeysApp {
    config: EngineConfig,
}

impl KeysApp {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Open the output device, start the engine and run the UI until quit.
    ///
    /// Returns the file written by a take that was still recording on quit.
    pub fn run(mut self) -> EyreResult<Option<PathBuf>> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let stream_config = choose_stream_config(&device, &mut self.config)?;
        let channels = stream_config.channels as usize;

        let (command_tx, command_rx) = RingBuffer::<VoiceCommand>::new(COMMAND_CAPACITY);
        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_CAPACITY);
        let mut mixer = PlaybackMixer::new(command_rx, self.config.sample_rate);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _| {
                    mixer.render(data, channels);
                    for frame in data.chunks(channels) {
                        // scope is best-effort, drop samples when the UI lags
                        let _ = scope_tx.push(frame[0]);
                    }
                },
                |err| log::error!("audio stream error: {err}"),
                None,
            )
            .wrap_err("failed to build output stream")?;
        stream.play().wrap_err("failed to start output stream")?;

        let sample_rate = self.config.sample_rate;
        let engine = Engine::new(self.config, command_tx, SystemClock::new())
            .wrap_err("failed to start engine")?;

        let mut terminal = ratatui::init();
        let key_releases = supports_keyboard_enhancement().unwrap_or(false);
        if key_releases {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let result = KeysUi::new(engine, scope_rx, sample_rate, key_releases).run(&mut terminal);

        if key_releases {
            let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        }
        ratatui::restore();
        drop(stream);

        result
    }
}

/// Stream config at the engine's sample rate when the device supports it,
/// otherwise the device default (and the engine follows the device rate).
fn choose_stream_config(
    device: &cpal::Device,
    config: &mut EngineConfig,
) -> EyreResult<cpal::StreamConfig> {
    let default = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;
    let channels = default.channels();

    let wanted = cpal::SampleRate(config.sample_rate);
    let supported = device
        .supported_output_configs()
        .wrap_err("failed to query output configs")?
        .filter(|range| {
            range.channels() == channels && range.sample_format() == cpal::SampleFormat::F32
        })
        .find_map(|range| range.try_with_sample_rate(wanted));

    let chosen = match supported {
        Some(chosen) => chosen,
        None => {
            log::warn!(
                "device does not support {} Hz, using {} Hz",
                config.sample_rate,
                default.sample_rate().0
            );
            config.sample_rate = default.sample_rate().0;
            default
        }
    };

    let buffer_size = match chosen.buffer_size() {
        cpal::SupportedBufferSize::Range { min, max }
            if (*min..=*max).contains(&config.buffer_size) =>
        {
            cpal::BufferSize::Fixed(config.buffer_size)
        }
        _ => cpal::BufferSize::Default,
    };

    let mut stream_config: cpal::StreamConfig = chosen.into();
    stream_config.buffer_size = buffer_size;
    Ok(stream_config)
}
