use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::display::domain::frame_sink::FrameSink;
use crate::display::domain::overlay::OverlaySpec;
use crate::playback::playback_controller::Shared;
use crate::playback::run_state::RunState;
use crate::playback::speed::frame_interval;
use crate::shared::frame::Frame;
use crate::video::domain::video_source::{SourceError, VideoSource};

/// Frame-advance worker for one loaded video.
///
/// Owns the video source for its whole life and exits (closing the source)
/// as soon as the controller starts a new session.
pub(crate) struct PlaybackLoop {
    shared: Arc<Shared>,
    source: Box<dyn VideoSource>,
    sink: Arc<dyn FrameSink>,
    session: u64,
    fps: f64,
}

impl PlaybackLoop {
    pub(crate) fn spawn(
        shared: Arc<Shared>,
        source: Box<dyn VideoSource>,
        sink: Arc<dyn FrameSink>,
        session: u64,
        fps: f64,
    ) -> JoinHandle<()> {
        let worker = Self {
            shared,
            source,
            sink,
            session,
            fps,
        };
        std::thread::spawn(move || worker.run())
    }

    fn run(mut self) {
        log::debug!("Playback loop {} started", self.session);

        while let Some((index, speed)) = self.next_frame() {
            match self.source.read_frame(index) {
                Ok(frame) => {
                    self.present(&frame, speed);
                    if let Some(interval) = self.advance(index) {
                        self.sleep(interval);
                    }
                }
                Err(e) => self.fail(index, e),
            }
        }

        self.source.close();
        log::debug!("Playback loop {} exited", self.session);
    }

    /// Blocks while not playing. Returns the frame to show and the speed
    /// in effect, or `None` once this loop's session is over.
    fn next_frame(&self) -> Option<(usize, f64)> {
        let mut state = self.shared.lock();
        loop {
            if state.session != self.session {
                return None;
            }
            if state.run_state == RunState::Playing {
                if state.current_frame < state.total_frames {
                    return Some((state.current_frame, state.speed));
                }
                state.run_state = RunState::Stopped;
            }
            state = self.shared.wait(state);
        }
    }

    fn present(&self, frame: &Frame, speed: f64) {
        let overlay = OverlaySpec::for_frame(frame.index(), self.fps, speed);
        if let Err(e) = self.sink.render(frame, &overlay) {
            log::warn!("Failed to render frame {}: {e}", frame.index());
        }
    }

    /// Moves past `index` unless a command moved the position meanwhile.
    /// Returns the pause before the next frame, read at the current speed.
    fn advance(&self, index: usize) -> Option<Duration> {
        let mut state = self.shared.lock();
        if state.session != self.session
            || state.run_state != RunState::Playing
            || state.current_frame != index
        {
            return None;
        }

        state.current_frame += 1;
        if state.current_frame >= state.total_frames {
            state.run_state = RunState::Stopped;
            log::info!("Reached end of video at frame {}", state.current_frame);
            return None;
        }
        Some(frame_interval(self.fps, state.speed))
    }

    /// Sleeps for `interval`; cut short only when the session ends.
    fn sleep(&self, interval: Duration) {
        let state = self.shared.lock();
        let session = self.session;
        drop(self.shared.wait_while_for(state, interval, |s| s.session == session));
    }

    fn fail(&self, index: usize, err: SourceError) {
        let mut state = self.shared.lock();
        if state.session != self.session {
            return;
        }
        state.run_state = RunState::Stopped;

        if let SourceError::EndOfStream { .. } = err {
            // The container overstated its length; the real end is here.
            log::warn!(
                "Video ended at frame {index}, expected {} frames",
                state.total_frames
            );
            state.total_frames = index;
            state.current_frame = index;
        } else {
            log::error!("Playback stopped at frame {index}: {err}");
            state.last_error = Some(err.to_string());
        }
    }
}
