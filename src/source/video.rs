//! Video decoding through FFmpeg.
//!
//! [`VideoFrames`] decodes the best video stream of a file lazily: each call to
//! [`next()`](Iterator::next) feeds packets to the decoder until one frame comes
//! out, converts it to GRAY8 at the native size, and hands back its samples.

use std::path::Path;

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{context::Input, Pixel},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    Error as FfmpegError, Packet,
};

use super::FrameSource;
use crate::analyzer::spectrum::LuminanceFrame;
use crate::error::{Result, VideoFftError};

pub struct VideoFrames {
    input: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    stream_index: usize,
    total: Option<usize>,
    decoded: VideoFrame,
    gray: VideoFrame,
    eof_sent: bool,
    done: bool,
}

impl VideoFrames {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Opening video file: {}", path.display());

        ffmpeg_next::init()?;
        let input = ffmpeg_next::format::input(&path)
            .map_err(|e| VideoFftError::source(format!("{}: {}", path.display(), e)))?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or_else(|| VideoFftError::source("no video stream found"))?;
        let stream_index = stream.index();
        // Containers without a frame count report 0
        let total = usize::try_from(stream.frames()).ok().filter(|&n| n > 0);

        let decoder = CodecContext::from_parameters(stream.parameters())?
            .decoder()
            .video()?;
        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::GRAY8,
            decoder.width(),
            decoder.height(),
            ScalingFlags::BILINEAR,
        )?;

        log::debug!(
            "Video stream {}: {}x{}, {:?} frames",
            stream_index,
            decoder.width(),
            decoder.height(),
            total
        );

        Ok(Self {
            input,
            decoder,
            scaler,
            stream_index,
            total,
            decoded: VideoFrame::empty(),
            gray: VideoFrame::empty(),
            eof_sent: false,
            done: false,
        })
    }

    /// Convert the current decoded frame to luma samples, honoring the
    /// plane stride.
    fn convert_current(&mut self) -> Result<LuminanceFrame> {
        self.scaler.run(&self.decoded, &mut self.gray)?;

        plane_to_frame(
            self.gray.data(0),
            self.gray.stride(0),
            self.gray.width() as usize,
            self.gray.height() as usize,
        )
    }
}

/// Copy an 8-bit plane whose rows are `stride` bytes apart, dropping the
/// padding at the end of each row.
pub(crate) fn plane_to_frame(data: &[u8], stride: usize, width: usize, height: usize) -> Result<LuminanceFrame> {
    if stride < width || (height > 0 && data.len() < (height - 1) * stride + width) {
        return Err(VideoFftError::source(format!(
            "GRAY8 plane of {} bytes is too small for {}x{} with stride {}",
            data.len(),
            width,
            height,
            stride
        )));
    }

    let mut samples = Vec::with_capacity(width * height);
    for row in 0..height {
        let start = row * stride;
        samples.extend(data[start..start + width].iter().map(|&v| v as f64));
    }
    LuminanceFrame::new(height, width, samples)
}

impl Iterator for VideoFrames {
    type Item = Result<LuminanceFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.decoder.receive_frame(&mut self.decoded).is_ok() {
                let frame = self.convert_current();
                if frame.is_err() {
                    self.done = true;
                }
                return Some(frame);
            }

            // Decoder is drained; feed it more packets
            if self.eof_sent {
                self.done = true;
                return None;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() == self.stream_index {
                        if let Err(e) = self.decoder.send_packet(&packet) {
                            self.done = true;
                            return Some(Err(VideoFftError::source(e.to_string())));
                        }
                    }
                }
                Err(FfmpegError::Eof) => {
                    if let Err(e) = self.decoder.send_eof() {
                        self.done = true;
                        return Some(Err(VideoFftError::source(e.to_string())));
                    }
                    self.eof_sent = true;
                }
                // Non-fatal read error, try the next packet
                Err(_) => {}
            }
        }
    }
}

impl FrameSource for VideoFrames {
    fn total_frames(&self) -> Option<usize> {
        self.total
    }
}
