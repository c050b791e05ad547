//! Frame Loop Orchestrator (§4.7): the video/control executor that ties
//! camera, landmark subsystem, gesture classifier, and control-surface
//! widgets together, and drives the audio command queue.
//!
//! Generic over the three external-collaborator traits
//! (`CameraSource`, `Display`, `LandmarkSource`) so the orchestrator
//! itself — the part this system actually specifies — is fully testable
//! without a real webcam or hand-landmark model.

use std::sync::Arc;

use handdeck_core::audio::CommandSender;
use handdeck_gesture::camera::{CameraSource, Display};
use handdeck_gesture::classifier::GestureClassifier;
use handdeck_gesture::landmark::{LandmarkSource, Mailbox};
use handdeck_gesture::types::LandmarkResult;
use handdeck_gesture::widget::{dispatch, NullOverlaySurface, Widget};

pub struct FrameLoop<C, D, L> {
    camera: C,
    display: D,
    landmark_source: L,
    mailbox: Arc<Mailbox<LandmarkResult>>,
    classifier: GestureClassifier,
    widgets: Vec<Box<dyn Widget>>,
    surface: NullOverlaySurface,
    command_sender: CommandSender,
    frame_width: f32,
    frame_height: f32,
    next_timestamp_ms: i64,
}

impl<C: CameraSource, D: Display, L: LandmarkSource> FrameLoop<C, D, L> {
    pub fn new(
        camera: C,
        display: D,
        landmark_source: L,
        mailbox: Arc<Mailbox<LandmarkResult>>,
        widgets: Vec<Box<dyn Widget>>,
        command_sender: CommandSender,
        frame_width: f32,
        frame_height: f32,
    ) -> Self {
        Self {
            camera,
            display,
            landmark_source,
            mailbox,
            classifier: GestureClassifier::new(),
            widgets,
            surface: NullOverlaySurface::default(),
            command_sender,
            frame_width,
            frame_height,
            next_timestamp_ms: 0,
        }
    }

    /// Run until the operator presses 'q'. On return, the camera and
    /// landmark subsystem are still live; call [`Self::shutdown`] next.
    pub fn run(&mut self) {
        while self.step() {}
    }

    /// One frame-loop iteration, per §4.7: acquire → submit (async) → read
    /// latest → classify → dispatch → render → present. Returns `false`
    /// when the operator asked to quit.
    pub fn step(&mut self) -> bool {
        let Some(frame) = self.camera.read_frame() else {
            // §7: an empty frame is skipped, not an error, and does not
            // abort the loop.
            return true;
        };

        self.next_timestamp_ms += 1;
        self.landmark_source.submit(frame.to_rgb(), self.next_timestamp_ms);

        let result = self.mailbox.take_latest().unwrap_or_default();
        let classified = self.classifier.classify(&result, self.frame_width, self.frame_height);

        for hand in &classified {
            let commands = dispatch(&mut self.widgets, hand.label, hand.gesture, hand.point);
            for cmd in commands {
                if let Err(dropped) = self.command_sender.send(cmd) {
                    log::warn!("command queue full, dropping control input: {dropped:?}");
                }
            }
        }

        for widget in &self.widgets {
            widget.draw(&mut self.surface);
        }

        self.display.show_frame(&frame.mirrored());

        !matches!(self.display.poll_key(), Some('q'))
    }

    /// Shutdown ordering per §5: the control loop has already exited
    /// (`run`/`step` returned); the caller stops the audio stream next,
    /// then calls this to close the landmark subsystem before releasing
    /// the camera.
    pub fn shutdown(self) {
        let FrameLoop { landmark_source, camera, .. } = self;
        drop(landmark_source);
        drop(camera);
    }
}
