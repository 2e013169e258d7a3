use std::path::Path;

use ffmpeg_next::format::context::Input;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;

use crate::shared::constants::MAX_FORWARD_DECODE;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_source::{check_index, SourceError, VideoSource};

const MICROS_PER_SEC: f64 = 1_000_000.0;

/// Decodes frames on demand via ffmpeg-next (libavformat + libavcodec).
///
/// Sequential reads continue the running decoder. A read behind the decoder,
/// or far ahead of it, seeks to the preceding keyframe and decodes forward.
/// Every frame is converted to RGB24.
pub struct FfmpegSource {
    video: Option<OpenVideo>,
}

// Safety: FfmpegSource is owned by a single playback thread at a time.
// The raw pointers inside ffmpeg types are never shared across threads.
unsafe impl Send for FfmpegSource {}

struct OpenVideo {
    input: Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: scaling::Context,
    stream_index: usize,
    /// Seconds per stream timestamp tick.
    time_base: f64,
    start_pts: i64,
    metadata: VideoMetadata,
    /// Index the next decoded frame will carry; `None` right after a seek.
    next_index: Option<usize>,
    /// EOF has been sent to the decoder; only a seek can restart it.
    drained: bool,
}

impl FfmpegSource {
    pub fn new() -> Self {
        Self { video: None }
    }
}

impl Default for FfmpegSource {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoSource for FfmpegSource {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, SourceError> {
        self.close();
        ffmpeg_next::init().map_err(|e| SourceError::invalid_path(path, e))?;

        let video = OpenVideo::open(path)?;
        let metadata = video.metadata.clone();
        log::info!(
            "Opened {} ({} frames at {:.3} fps, {:.1}s, {}x{}, {})",
            path.display(),
            metadata.total_frames,
            metadata.fps,
            metadata.duration_secs(),
            metadata.width,
            metadata.height,
            metadata.codec
        );
        self.video = Some(video);
        Ok(metadata)
    }

    fn read_frame(&mut self, index: usize) -> Result<Frame, SourceError> {
        let video = self.video.as_mut().ok_or(SourceError::NotOpen)?;
        video.read_frame(index)
    }

    fn close(&mut self) {
        if let Some(video) = self.video.take() {
            log::debug!("Closed {}", video.metadata.source_path.display());
        }
    }
}

impl OpenVideo {
    fn open(path: &Path) -> Result<Self, SourceError> {
        let input =
            ffmpeg_next::format::input(path).map_err(|e| SourceError::invalid_path(path, e))?;
        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| SourceError::invalid_path(path, "no video stream found"))?;

        let stream_index = stream.index();
        let time_base = rational_to_f64(stream.time_base());
        let start_pts = stream.start_time().max(0);

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| SourceError::invalid_path(path, e))?;
        let decoder = codec_ctx
            .decoder()
            .video()
            .map_err(|e| SourceError::invalid_path(path, e))?;

        let fps = [stream.avg_frame_rate(), stream.rate()]
            .into_iter()
            .map(rational_to_f64)
            .find(|fps| fps.is_finite() && *fps > 0.0)
            .ok_or_else(|| SourceError::invalid_path(path, "video does not report a frame rate"))?;

        let total_frames = if stream.frames() > 0 {
            stream.frames() as usize
        } else if stream.duration() > 0 {
            (stream.duration() as f64 * time_base * fps).round() as usize
        } else {
            (input.duration().max(0) as f64 / MICROS_PER_SEC * fps).round() as usize
        };
        if total_frames == 0 {
            return Err(SourceError::invalid_path(path, "video does not report a frame count"));
        }

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            total_frames,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: path.to_path_buf(),
        };

        let scaler = scaling::Context::get(
            decoder.format(),
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            scaling::Flags::BILINEAR,
        )
        .map_err(|e| SourceError::invalid_path(path, e))?;

        Ok(Self {
            input,
            decoder,
            scaler,
            stream_index,
            time_base,
            start_pts,
            metadata,
            next_index: Some(0),
            drained: false,
        })
    }

    fn read_frame(&mut self, index: usize) -> Result<Frame, SourceError> {
        check_index(index, self.metadata.total_frames)?;

        let sequential = match self.next_index {
            Some(next) => !self.drained && index >= next && index - next <= MAX_FORWARD_DECODE,
            None => false,
        };
        if !sequential {
            self.seek_to(index)?;
        }

        loop {
            let Some(decoded) = self.decode_next(index)? else {
                self.next_index = None;
                return Err(SourceError::EndOfStream { index });
            };
            let at = self.index_of(&decoded);
            self.next_index = Some(at + 1);
            if at >= index {
                return self.convert(&decoded, index);
            }
        }
    }

    /// Seeks to the keyframe at or before `index` and resets the decoder.
    fn seek_to(&mut self, index: usize) -> Result<(), SourceError> {
        let start_us = self.start_pts as f64 * self.time_base * MICROS_PER_SEC;
        let target = (start_us + index as f64 / self.metadata.fps * MICROS_PER_SEC) as i64;
        self.input
            .seek(target, ..target)
            .map_err(|e| SourceError::decode(index, format!("seek failed: {e}")))?;
        self.decoder.flush();
        self.next_index = None;
        self.drained = false;
        log::debug!("Seeked to frame {index}");
        Ok(())
    }

    /// Returns the next decoded picture, or `None` once the stream is drained.
    fn decode_next(&mut self, index: usize) -> Result<Option<Video>, SourceError> {
        let mut decoded = Video::empty();
        loop {
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return Ok(Some(decoded));
            }
            if self.drained {
                return Ok(None);
            }

            match self.input.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() != self.stream_index {
                        continue;
                    }
                    self.decoder
                        .send_packet(&packet)
                        .map_err(|e| SourceError::decode(index, e))?;
                }
                None => {
                    self.decoder
                        .send_eof()
                        .map_err(|e| SourceError::decode(index, e))?;
                    self.drained = true;
                }
            }
        }
    }

    fn index_of(&self, decoded: &Video) -> usize {
        match decoded.timestamp().or_else(|| decoded.pts()) {
            Some(ts) => {
                let secs = (ts - self.start_pts) as f64 * self.time_base;
                (secs * self.metadata.fps).round().max(0.0) as usize
            }
            None => self.next_index.unwrap_or(0),
        }
    }

    fn convert(&mut self, decoded: &Video, index: usize) -> Result<Frame, SourceError> {
        let mut rgb_frame = Video::empty();
        self.scaler
            .run(decoded, &mut rgb_frame)
            .map_err(|e| SourceError::decode(index, e))?;
        let (width, height) = (self.metadata.width, self.metadata.height);
        let pixels = extract_rgb_pixels(&rgb_frame, width, height);
        Ok(Frame::new(pixels, width, height, index))
    }
}

fn rational_to_f64(rate: ffmpeg_next::Rational) -> f64 {
    if rate.denominator() == 0 {
        0.0
    } else {
        rate.numerator() as f64 / rate.denominator() as f64
    }
}

/// Copies an RGB24 picture into a tightly packed buffer, dropping the
/// per-row padding ffmpeg may add (stride > width * 3).
fn extract_rgb_pixels(rgb_frame: &Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let row_len = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + row_len]);
    }
    pixels
}
