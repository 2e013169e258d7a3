use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::display::domain::frame_sink::FrameSink;
use crate::playback::playback_error::PlaybackError;
use crate::playback::playback_loop::PlaybackLoop;
use crate::playback::run_state::RunState;
use crate::playback::speed::validate_speed;
use crate::playback::status::PlaybackStatus;
use crate::shared::constants::DEFAULT_SPEED;
use crate::shared::timestamp::format_clock;
use crate::video::domain::video_source::SourceFactory;
use crate::video::infrastructure::ffmpeg_source::FfmpegSource;

/// Everything commands and the playback loop agree on, guarded by one lock.
#[derive(Debug)]
pub(crate) struct PlaybackState {
    pub loaded: bool,
    pub run_state: RunState,
    pub current_frame: usize,
    pub total_frames: usize,
    pub native_fps: f64,
    pub speed: f64,
    pub source_path: Option<PathBuf>,
    pub last_error: Option<String>,
    /// Bumped whenever the loaded video is released; a playback loop only
    /// acts while the session it was started for is current.
    pub session: u64,
    /// Set by `shutdown`; no video can be loaded afterwards.
    pub shut_down: bool,
}

pub(crate) struct Shared {
    state: Mutex<PlaybackState>,
    wake: Condvar,
}

impl Shared {
    pub(crate) fn lock(&self) -> MutexGuard<'_, PlaybackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn wait<'a>(
        &self,
        guard: MutexGuard<'a, PlaybackState>,
    ) -> MutexGuard<'a, PlaybackState> {
        self.wake.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits up to `timeout` while `condition` holds.
    pub(crate) fn wait_while_for<'a>(
        &self,
        guard: MutexGuard<'a, PlaybackState>,
        timeout: Duration,
        condition: impl FnMut(&mut PlaybackState) -> bool,
    ) -> MutexGuard<'a, PlaybackState> {
        match self.wake.wait_timeout_while(guard, timeout, condition) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }

    fn notify(&self) {
        self.wake.notify_all();
    }
}

/// Thread-safe command and query surface over one playback loop.
///
/// Commands hold the state lock only long enough to apply a transition;
/// decoding, rendering and pacing happen on the loop thread without it.
pub struct PlaybackController {
    shared: Arc<Shared>,
    source_factory: SourceFactory,
    sink: Arc<dyn FrameSink>,
    worker: Mutex<Option<JoinHandle<()>>>,
    loading: AtomicBool,
}

impl PlaybackController {
    pub fn new(source_factory: SourceFactory, sink: Arc<dyn FrameSink>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PlaybackState {
                    loaded: false,
                    run_state: RunState::Stopped,
                    current_frame: 0,
                    total_frames: 0,
                    native_fps: 0.0,
                    speed: DEFAULT_SPEED,
                    source_path: None,
                    last_error: None,
                    session: 0,
                    shut_down: false,
                }),
                wake: Condvar::new(),
            }),
            source_factory,
            sink,
            worker: Mutex::new(None),
            loading: AtomicBool::new(false),
        }
    }

    /// Controller decoding through ffmpeg.
    pub fn with_ffmpeg(sink: Arc<dyn FrameSink>) -> Self {
        Self::new(Box::new(|| Box::new(FfmpegSource::new())), sink)
    }

    /// Opens `path` and makes it the loaded video, stopped at frame 0.
    ///
    /// Any previously loaded video is released first: its loop is stopped
    /// and joined and its source closed. The speed setting carries over.
    pub fn load(&self, path: &Path) -> Result<(), PlaybackError> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(PlaybackError::AlreadyLoading);
        }
        let result = self.load_exclusive(path);
        self.loading.store(false, Ordering::Release);
        result
    }

    fn load_exclusive(&self, path: &Path) -> Result<(), PlaybackError> {
        if self.shared.lock().shut_down {
            return Err(PlaybackError::ShutDown);
        }
        if !path.is_file() {
            return Err(PlaybackError::InvalidPath(format!(
                "Video file not found: {}",
                path.display()
            )));
        }

        self.release();

        let mut source = (self.source_factory)();
        let metadata = source.open(path).map_err(|e| {
            log::warn!("Load failed: {e}");
            PlaybackError::from(e)
        })?;

        // Held until the handle is stored so a concurrent release joins
        // the new loop instead of missing it.
        let mut worker = self.lock_worker();
        let session = {
            let mut state = self.shared.lock();
            if state.shut_down {
                drop(state);
                source.close();
                log::warn!(
                    "Discarding {}, controller shut down during load",
                    path.display()
                );
                return Err(PlaybackError::ShutDown);
            }
            state.session += 1;
            state.loaded = true;
            state.run_state = RunState::Stopped;
            state.current_frame = 0;
            state.total_frames = metadata.total_frames;
            state.native_fps = metadata.fps;
            state.source_path = Some(path.to_path_buf());
            state.last_error = None;
            state.session
        };

        *worker = Some(PlaybackLoop::spawn(
            self.shared.clone(),
            source,
            self.sink.clone(),
            session,
            metadata.fps,
        ));
        drop(worker);
        log::info!("Loaded {}", path.display());
        Ok(())
    }

    /// Starts or resumes playback, optionally switching speed first.
    ///
    /// Playing from the end of the video starts over at frame 0.
    pub fn play(&self, speed: Option<f64>) -> Result<(), PlaybackError> {
        {
            let mut state = self.loaded_state()?;
            if let Some(speed) = speed {
                state.speed = validate_speed(speed)?;
            }
            match state.run_state {
                RunState::Playing => return Ok(()),
                RunState::Paused => {}
                RunState::Stopped => {
                    if state.current_frame >= state.total_frames {
                        state.current_frame = 0;
                    }
                }
            }
            state.run_state = RunState::Playing;
            state.last_error = None;
            log::info!(
                "Playing from frame {} at {}x",
                state.current_frame,
                state.speed
            );
        }
        self.shared.notify();
        Ok(())
    }

    /// Freezes the position. Does nothing unless playing.
    pub fn pause(&self) -> Result<(), PlaybackError> {
        let mut state = self.loaded_state()?;
        if state.run_state == RunState::Playing {
            state.run_state = RunState::Paused;
            log::info!("Paused at frame {}", state.current_frame);
        }
        Ok(())
    }

    /// Stops playback and rewinds to frame 0.
    pub fn stop(&self) -> Result<(), PlaybackError> {
        self.rewind("Stopped")
    }

    /// Rewinds to frame 0, leaving the video loaded. Same effect as
    /// [`stop`](Self::stop); kept as its own command for clients.
    pub fn reset(&self) -> Result<(), PlaybackError> {
        self.rewind("Reset")
    }

    fn rewind(&self, action: &str) -> Result<(), PlaybackError> {
        let mut state = self.loaded_state()?;
        state.run_state = RunState::Stopped;
        state.current_frame = 0;
        log::info!("{action}, position back to frame 0");
        Ok(())
    }

    /// Changes the speed multiplier. A running loop picks it up for the
    /// pause after the frame it is presenting. Allowed without a video.
    pub fn set_speed(&self, speed: f64) -> Result<(), PlaybackError> {
        let speed = validate_speed(speed)?;
        self.shared.lock().speed = speed;
        log::info!("Speed set to {speed}x");
        Ok(())
    }

    pub fn status(&self) -> PlaybackStatus {
        let mut status = {
            let state = self.shared.lock();
            PlaybackStatus {
                loaded: state.loaded,
                run_state: state.run_state,
                is_playing: state.run_state == RunState::Playing,
                is_paused: state.run_state == RunState::Paused,
                current_frame: state.current_frame,
                total_frames: state.total_frames,
                speed: state.speed,
                native_fps: state.native_fps,
                timestamp: String::new(),
                source_path: state.source_path.clone(),
                last_error: state.last_error.clone(),
            }
        };
        status.timestamp = format_clock(status.current_frame, status.native_fps);
        status
    }

    /// Releases the loaded video, returning to the empty state.
    pub fn unload(&self) -> Result<(), PlaybackError> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(PlaybackError::AlreadyLoading);
        }
        let was_loaded = self.shared.lock().loaded;
        self.release();
        self.loading.store(false, Ordering::Release);

        if was_loaded {
            Ok(())
        } else {
            Err(PlaybackError::NotLoaded)
        }
    }

    /// Stops the playback loop and closes the source. Also run on drop.
    ///
    /// Later loads fail, including one already opening its source.
    pub fn shutdown(&self) {
        self.shared.lock().shut_down = true;
        self.release();
        log::debug!("Playback controller shut down");
    }

    /// Ends the current session, then joins its loop, which closes the
    /// source on the way out.
    fn release(&self) {
        {
            let mut state = self.shared.lock();
            state.session += 1;
            state.loaded = false;
            state.run_state = RunState::Stopped;
            state.current_frame = 0;
            state.total_frames = 0;
            state.native_fps = 0.0;
            state.source_path = None;
        }
        self.shared.notify();

        if let Some(handle) = self.lock_worker().take() {
            if handle.join().is_err() {
                log::error!("Playback thread panicked");
            }
        }
    }

    fn loaded_state(&self) -> Result<MutexGuard<'_, PlaybackState>, PlaybackError> {
        let state = self.shared.lock();
        if state.loaded {
            Ok(state)
        } else {
            Err(PlaybackError::NotLoaded)
        }
    }

    fn lock_worker(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
