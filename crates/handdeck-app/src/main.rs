//! HandDeck — gesture-controlled two-deck stem mixer.
//!
//! Entry point: starts the CPAL audio system, loads configuration, builds
//! the control-surface widget layout, and drives the Frame Loop
//! Orchestrator (§4.7) until the operator quits.
//!
//! Camera capture and the hand-landmark model are explicitly out of scope
//! (§1 Non-goals) — `handdeck-gesture` only defines the `CameraSource`,
//! `Display` and `LandmarkSource` traits it needs. This binary wires the
//! orchestrator to stand-in implementations of those traits; swap in a
//! real webcam/landmark backend here to go from engine to full app.

mod landmark_stub;
mod orchestrator;
mod widgets;

use std::sync::Arc;

use handdeck_core::audio::{start_audio_system, AudioConfig};
use handdeck_core::config::AppConfig;
use handdeck_gesture::camera::{FixedFrameCamera, NullDisplay};
use handdeck_gesture::landmark::Mailbox;

use landmark_stub::NoLandmarkModel;
use orchestrator::FrameLoop;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).format_timestamp_millis().init();

    log::info!("handdeck starting up");

    let config = AppConfig::load();
    if let Err(e) = config.save() {
        log::warn!("could not persist default config: {e}");
    }

    let audio = start_audio_system(&AudioConfig::default(), config.library_root.clone())?;
    log::info!("audio system started: {} Hz, {} frame buffer ({:.1} ms)", audio.sample_rate, audio.buffer_size, audio.latency_ms);

    let widgets = widgets::build_widgets(&config);
    log::info!("control surface: {} widgets loaded from config", widgets.len());

    let mailbox = Arc::new(Mailbox::new());
    let landmark_source = NoLandmarkModel;
    let camera = FixedFrameCamera::new(Vec::new());
    let display = NullDisplay::default();

    let mut frame_loop = FrameLoop::new(camera, display, landmark_source, mailbox, widgets, audio.command_sender, 640.0, 480.0);

    frame_loop.run();

    log::info!("shutting down");
    drop(audio.handle);
    frame_loop.shutdown();

    Ok(())
}
