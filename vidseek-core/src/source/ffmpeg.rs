use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use ffmpeg::util::error::{EAGAIN, EWOULDBLOCK};
use ffmpeg_next as ffmpeg;
use image::{DynamicImage, RgbImage};
use tracing::debug;

use super::FrameSource;
use crate::error::{Result, VidseekError};

/// Container decoding through libavformat/libavcodec, converted to RGB24.
pub struct FfmpegSource {
    location: PathBuf,
    input: ffmpeg::format::context::Input,
    decoder: ffmpeg::decoder::Video,
    scaler: ffmpeg::software::scaling::context::Context,
    stream_index: usize,
    frame_count: Option<u64>,
    pending: VecDeque<DynamicImage>,
    eof_sent: bool,
    finished: bool,
    position: u64,
}

impl FfmpegSource {
    pub fn open(location: &Path) -> Result<Self> {
        ffmpeg::init().map_err(|e| VidseekError::source_unavailable(location, e))?;

        let input =
            ffmpeg::format::input(&location).map_err(|e| VidseekError::source_unavailable(location, e))?;
        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| VidseekError::source_unavailable(location, "no video stream found"))?;
        let stream_index = stream.index();
        let frame_count = u64::try_from(stream.frames()).ok().filter(|n| *n > 0);

        let context = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| VidseekError::source_unavailable(location, e))?;
        let decoder = context
            .decoder()
            .video()
            .map_err(|e| VidseekError::source_unavailable(location, e))?;

        let scaler = ffmpeg::software::scaling::context::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg::format::pixel::Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ffmpeg::software::scaling::flag::Flags::BILINEAR,
        )
        .map_err(|e| VidseekError::source_unavailable(location, e))?;

        debug!(
            location = %location.display(),
            width = decoder.width(),
            height = decoder.height(),
            frames = ?frame_count,
            "Opened ffmpeg source"
        );

        Ok(Self {
            location: location.to_path_buf(),
            input,
            decoder,
            scaler,
            stream_index,
            frame_count,
            pending: VecDeque::new(),
            eof_sent: false,
            finished: false,
            position: 0,
        })
    }

    fn decode_error(&self, reason: impl ToString) -> VidseekError {
        VidseekError::FrameDecode {
            location: self.location.clone(),
            frame: self.position + self.pending.len() as u64,
            reason: reason.to_string(),
        }
    }

    /// Move every frame the decoder has ready into `pending`.
    fn drain_decoder(&mut self) -> Result<()> {
        let mut decoded = ffmpeg::util::frame::Video::empty();
        loop {
            match self.decoder.receive_frame(&mut decoded) {
                Ok(()) => {
                    let mut converted = ffmpeg::util::frame::Video::empty();
                    self.scaler
                        .run(&decoded, &mut converted)
                        .map_err(|e| self.decode_error(e))?;
                    let frame = rgb_image_from_frame(&converted)
                        .ok_or_else(|| self.decode_error("converted frame has an invalid layout"))?;
                    self.pending.push_back(DynamicImage::ImageRgb8(frame));
                }
                Err(err) if is_retryable_error(&err) || matches!(err, ffmpeg::Error::Eof) => {
                    return Ok(());
                }
                Err(err) => return Err(self.decode_error(err)),
            }
        }
    }

    fn feed_decoder(&mut self) -> Result<()> {
        let mut packet = ffmpeg::Packet::empty();
        match packet.read(&mut self.input) {
            Ok(()) => {
                if packet.stream() != self.stream_index {
                    return Ok(());
                }
                if let Err(err) = self.decoder.send_packet(&packet) {
                    if !is_retryable_error(&err) {
                        return Err(self.decode_error(err));
                    }
                }
                Ok(())
            }
            Err(ffmpeg::Error::Eof) => {
                self.decoder.send_eof().map_err(|e| self.decode_error(e))?;
                self.eof_sent = true;
                Ok(())
            }
            Err(err) => Err(self.decode_error(err)),
        }
    }
}

impl FrameSource for FfmpegSource {
    fn position(&self) -> u64 {
        self.position
    }

    fn next_frame(&mut self) -> Result<Option<DynamicImage>> {
        loop {
            if let Some(frame) = self.pending.pop_front() {
                self.position += 1;
                return Ok(Some(frame));
            }
            if self.finished {
                return Ok(None);
            }
            if self.eof_sent {
                self.drain_decoder()?;
                self.finished = true;
                continue;
            }
            self.feed_decoder()?;
            self.drain_decoder()?;
        }
    }

    fn frame_count_hint(&self) -> Option<u64> {
        self.frame_count
    }
}

fn rgb_image_from_frame(frame: &ffmpeg::util::frame::Video) -> Option<RgbImage> {
    let width = frame.width();
    let height = frame.height();
    let stride = frame.stride(0);
    let row_bytes = width as usize * 3;
    let plane = frame.data(0);

    let mut buffer = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let offset = row * stride;
        buffer.extend_from_slice(plane.get(offset..offset + row_bytes)?);
    }
    RgbImage::from_raw(width, height, buffer)
}

fn is_retryable_error(error: &ffmpeg::Error) -> bool {
    matches!(
        error,
        ffmpeg::Error::Other { errno }
            if *errno == EAGAIN || *errno == EWOULDBLOCK
    )
}
