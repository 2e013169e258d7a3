use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Sender, TrySendError};

use crate::display::domain::frame_sink::FrameSink;
use crate::display::domain::overlay::OverlaySpec;
use crate::shared::constants::DISPLAY_QUEUE_CAPACITY;
use crate::shared::frame::Frame;

/// Counters shared between a [`SnapshotFrameSink`] and its display thread.
#[derive(Debug, Default)]
pub struct DisplayStats {
    written: AtomicUsize,
    dropped: AtomicUsize,
}

impl DisplayStats {
    pub fn written(&self) -> usize {
        self.written.load(Ordering::Relaxed)
    }

    /// Frames skipped because the display thread was still busy.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Display surface that keeps the most recent frame as an image file.
///
/// Frames are handed to a dedicated display thread over a bounded channel.
/// When the display thread falls behind, new frames are dropped instead of
/// stalling the playback loop.
pub struct SnapshotFrameSink {
    frame_tx: Option<Sender<(Frame, OverlaySpec)>>,
    handle: Option<JoinHandle<()>>,
    stats: Arc<DisplayStats>,
}

impl SnapshotFrameSink {
    /// Spawns the display thread writing to `path` (format from extension).
    pub fn spawn(path: PathBuf) -> Self {
        let (frame_tx, frame_rx) =
            crossbeam_channel::bounded::<(Frame, OverlaySpec)>(DISPLAY_QUEUE_CAPACITY);
        let stats = Arc::new(DisplayStats::default());
        let thread_stats = stats.clone();

        let handle = std::thread::spawn(move || {
            for (frame, overlay) in frame_rx {
                match write_image(&path, &frame) {
                    Ok(()) => {
                        thread_stats.written.fetch_add(1, Ordering::Relaxed);
                        log::debug!(
                            "Displayed frame {} [{} | {}]",
                            frame.index(),
                            overlay.timestamp_text,
                            overlay.speed_text
                        );
                    }
                    Err(e) => log::warn!("Failed to write {}: {e}", path.display()),
                }
            }
        });

        Self {
            frame_tx: Some(frame_tx),
            handle: Some(handle),
            stats,
        }
    }

    pub fn stats(&self) -> Arc<DisplayStats> {
        self.stats.clone()
    }
}

impl FrameSink for SnapshotFrameSink {
    fn render(
        &self,
        frame: &Frame,
        overlay: &OverlaySpec,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let Some(tx) = self.frame_tx.as_ref() else {
            return Err("display is closed".into());
        };
        match tx.try_send((frame.clone(), overlay.clone())) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err("display thread has exited".into()),
        }
    }
}

impl Drop for SnapshotFrameSink {
    fn drop(&mut self) {
        // Closing the channel lets the display thread finish its queue.
        self.frame_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Display thread panicked");
            }
        }
    }
}

fn write_image(path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or("frame data does not match its dimensions")?;
    img.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay() -> OverlaySpec {
        OverlaySpec::for_frame(0, 30.0, 1.0)
    }

    #[test]
    fn test_every_frame_is_written_or_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("display").join("frame.png");

        let sink = SnapshotFrameSink::spawn(path.clone());
        let stats = sink.stats();
        for i in 0..5 {
            sink.render(&Frame::filled(8, 6, 10 * i as u8, i), &overlay())
                .unwrap();
        }
        drop(sink);

        assert_eq!(stats.written() + stats.dropped(), 5);
        assert!(stats.written() >= 1);
        assert!(path.exists());
    }

    #[test]
    fn test_written_image_matches_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        let sink = SnapshotFrameSink::spawn(path.clone());
        sink.render(&Frame::filled(4, 2, 123, 0), &overlay()).unwrap();
        drop(sink);

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (4, 2));
        assert_eq!(img.get_pixel(3, 1).0, [123, 123, 123]);
    }

    #[test]
    fn test_unwritable_path_keeps_sink_usable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.unknown_ext");

        let sink = SnapshotFrameSink::spawn(path);
        let stats = sink.stats();
        assert!(sink.render(&Frame::filled(2, 2, 0, 0), &overlay()).is_ok());
        assert!(sink.render(&Frame::filled(2, 2, 0, 1), &overlay()).is_ok());
        drop(sink);

        assert_eq!(stats.written(), 0);
    }
}
