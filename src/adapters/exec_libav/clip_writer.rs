//! Re-encode a decode window into an H.264/AAC style clip

use std::path::Path;
use std::time::Instant;

use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::codec::{self, threading};
use ffmpeg_next::format::context::{Input, Output};
use ffmpeg_next::format::{self, sample::Type as SampleType, Pixel, Sample};
use ffmpeg_next::frame::{Audio as AudioFrame, Video as VideoFrame};
use ffmpeg_next::software::resampling::Context as ResamplingContext;
use ffmpeg_next::software::scaling::Flags as ScalingFlags;
use ffmpeg_next::{decoder, encoder, ChannelLayout, Packet, Rational};
use tracing::{debug, info};

use super::scaler::FrameScaler;
use super::timing::{ts_to_seconds, DecodeWindow, FrameTicker, Position};
use crate::domain::errors::DomainError;
use crate::domain::model::{ClipEncoding, FrameSize, OutputReport};

const CLIP_SAMPLE_FORMAT: Sample = Sample::F32(SampleType::Planar);

/// Everything needed to export one clip
pub struct ClipJob<'a> {
    pub video_index: usize,
    pub audio_index: Option<usize>,
    pub size: FrameSize,
    pub frame_rate: Rational,
    pub window: DecodeWindow,
    pub encoding: &'a ClipEncoding,
}

fn av_error(action: &'static str) -> impl FnOnce(ffmpeg_next::Error) -> DomainError {
    move |e| DomainError::ProcessingError(format!("{}: {}", action, e))
}

fn find_encoder(name: &str) -> Result<codec::Codec, DomainError> {
    encoder::find_by_name(name)
        .ok_or_else(|| DomainError::BackendUnavailable(format!("encoder '{}' is not available", name)))
}

/// Decode `job.window` from `input` and write it to `output_path`
pub fn write_clip(
    input: &mut Input,
    output_path: &Path,
    job: &ClipJob<'_>,
) -> Result<OutputReport, DomainError> {
    let started = Instant::now();

    let mut octx = format::output(&output_path).map_err(|e| {
        DomainError::ProcessingError(format!(
            "Failed to create output {}: {}",
            output_path.display(),
            e
        ))
    })?;
    let global_header = octx.format().flags().contains(format::Flags::GLOBAL_HEADER);

    let mut video = VideoTranscoder::new(input, &mut octx, job, global_header)?;
    let mut audio = match job.audio_index {
        Some(index) => Some(AudioTranscoder::new(
            input,
            index,
            &mut octx,
            job,
            global_header,
        )?),
        None => None,
    };

    octx.write_header().map_err(av_error("Failed to write header"))?;
    video.bind_output(&octx)?;
    if let Some(audio) = audio.as_mut() {
        audio.bind_output(&octx)?;
    }

    info!(
        "Encoding {} at {} fps with {} ({} threads){}",
        job.size,
        f64::from(job.frame_rate),
        job.encoding.video_codec,
        job.encoding.threads,
        if audio.is_some() { ", audio enabled" } else { "" }
    );

    for (stream, packet) in input.packets() {
        let index = stream.index();
        if index == video.ist_index {
            if !video.done {
                video.send_packet(&packet, &mut octx)?;
            }
        } else if let Some(audio) = audio.as_mut().filter(|a| a.ist_index == index) {
            if !audio.done {
                audio.send_packet(&packet, &mut octx)?;
            }
        }

        if video.done && audio.as_ref().map_or(true, |a| a.done) {
            break;
        }
    }

    video.finish(&mut octx)?;
    if let Some(audio) = audio.as_mut() {
        audio.finish(&mut octx)?;
    }

    octx.write_trailer().map_err(av_error("Failed to write trailer"))?;

    if video.frames_written == 0 {
        drop(octx);
        return Err(super::discard_empty_output(output_path));
    }

    debug!(
        "Clip written: {} video frames, {} audio samples",
        video.frames_written,
        audio.as_ref().map_or(0, |a| a.samples_written)
    );

    Ok(OutputReport {
        frames_written: video.frames_written,
        file_size: super::output_file_size(output_path),
        processing_time: started.elapsed(),
    })
}

struct VideoTranscoder {
    ist_index: usize,
    ist_time_base: Rational,
    ost_index: usize,
    ost_time_base: Rational,
    enc_time_base: Rational,
    decoder: decoder::Video,
    encoder: encoder::Video,
    scaler: FrameScaler,
    window: DecodeWindow,
    ticker: FrameTicker,
    last_frame: Option<VideoFrame>,
    frames_written: u64,
    done: bool,
}

impl VideoTranscoder {
    fn new(
        input: &Input,
        octx: &mut Output,
        job: &ClipJob<'_>,
        global_header: bool,
    ) -> Result<Self, DomainError> {
        let stream = input
            .stream(job.video_index)
            .ok_or_else(|| DomainError::ProcessingError("Video stream not accessible".to_string()))?;
        let decoder = CodecContext::from_parameters(stream.parameters())
            .map_err(av_error("Failed to create decoder context"))?
            .decoder()
            .video()
            .map_err(av_error("Failed to create video decoder"))?;

        let codec = find_encoder(&job.encoding.video_codec)?;
        let mut ost = octx.add_stream(codec).map_err(av_error("Failed to add video stream"))?;
        let ost_index = ost.index();

        let mut context = CodecContext::from_parameters(ost.parameters())
            .map_err(av_error("Failed to create encoder context"))?
            .encoder()
            .video()
            .map_err(av_error("Failed to create video encoder"))?;

        let enc_time_base = job.frame_rate.invert();
        context.set_width(job.size.width);
        context.set_height(job.size.height);
        context.set_format(Pixel::YUV420P);
        context.set_time_base(enc_time_base);
        context.set_frame_rate(Some(job.frame_rate));
        context.set_threading(threading::Config {
            kind: threading::Type::Frame,
            count: job.encoding.threads,
            ..Default::default()
        });
        if global_header {
            context.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let encoder = context
            .open_as(codec)
            .map_err(av_error("Failed to open video encoder"))?;
        ost.set_parameters(&encoder);
        ost.set_time_base(enc_time_base);

        Ok(Self {
            ist_index: stream.index(),
            ist_time_base: stream.time_base(),
            ost_index,
            ost_time_base: enc_time_base,
            enc_time_base,
            decoder,
            encoder,
            scaler: FrameScaler::new(Pixel::YUV420P, job.size, ScalingFlags::BICUBIC),
            window: job.window,
            ticker: FrameTicker::new(f64::from(job.frame_rate), job.window.length()),
            last_frame: None,
            frames_written: 0,
            done: false,
        })
    }

    /// The muxer may change the stream time base while writing the header
    fn bind_output(&mut self, octx: &Output) -> Result<(), DomainError> {
        self.ost_time_base = octx
            .stream(self.ost_index)
            .ok_or_else(|| DomainError::ProcessingError("Output video stream missing".to_string()))?
            .time_base();
        Ok(())
    }

    fn send_packet(&mut self, packet: &Packet, octx: &mut Output) -> Result<(), DomainError> {
        self.decoder
            .send_packet(packet)
            .map_err(av_error("Failed to send packet to decoder"))?;
        self.receive_decoded(octx)
    }

    fn receive_decoded(&mut self, octx: &mut Output) -> Result<(), DomainError> {
        let mut decoded = VideoFrame::empty();
        while !self.done && self.decoder.receive_frame(&mut decoded).is_ok() {
            let Some(ts) = decoded.timestamp().or(decoded.pts()) else {
                continue;
            };
            let seconds = ts_to_seconds(ts, self.ist_time_base);
            match self.window.position(seconds) {
                Position::Before => continue,
                Position::After => self.done = true,
                Position::Inside => {
                    let mut scaled = self.scaler.scale(&decoded)?;
                    for slot in self.ticker.advance(seconds - self.window.start) {
                        self.encode(&mut scaled, slot, octx)?;
                    }
                    self.last_frame = Some(scaled);
                    if self.ticker.is_full() {
                        self.done = true;
                    }
                }
            }
        }
        Ok(())
    }

    fn encode(&mut self, frame: &mut VideoFrame, slot: u64, octx: &mut Output) -> Result<(), DomainError> {
        frame.set_pts(Some(slot as i64));
        self.encoder
            .send_frame(frame)
            .map_err(av_error("Failed to send frame to encoder"))?;
        self.frames_written += 1;
        self.write_packets(octx)
    }

    fn write_packets(&mut self, octx: &mut Output) -> Result<(), DomainError> {
        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.ost_index);
            packet.rescale_ts(self.enc_time_base, self.ost_time_base);
            packet
                .write_interleaved(octx)
                .map_err(av_error("Failed to write video packet"))?;
        }
        Ok(())
    }

    fn finish(&mut self, octx: &mut Output) -> Result<(), DomainError> {
        if !self.done {
            let _ = self.decoder.send_eof();
            self.receive_decoded(octx)?;
        }

        if let Some(mut last) = self.last_frame.take() {
            for slot in self.ticker.pad() {
                self.encode(&mut last, slot, octx)?;
            }
        }

        self.encoder
            .send_eof()
            .map_err(av_error("Failed to flush video encoder"))?;
        self.write_packets(octx)
    }
}

/// Per-channel sample queue that hands out encoder-sized chunks
#[derive(Debug, Default)]
struct SampleFifo {
    channels: Vec<Vec<f32>>,
}

impl SampleFifo {
    fn push(&mut self, frame: &AudioFrame) {
        let samples = frame.samples();
        let planes = frame.planes();
        if self.channels.len() < planes {
            self.channels.resize_with(planes, Vec::new);
        }
        for (channel, buffer) in self.channels.iter_mut().enumerate().take(planes) {
            buffer.extend_from_slice(&frame.plane::<f32>(channel)[..samples]);
        }
    }

    fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Take exactly `count` samples per channel, if that many are queued
    fn pop(&mut self, count: usize) -> Option<Vec<Vec<f32>>> {
        if count == 0 || self.len() < count {
            return None;
        }
        Some(
            self.channels
                .iter_mut()
                .map(|buffer| buffer.drain(..count).collect())
                .collect(),
        )
    }

    /// Take whatever is left
    fn drain(&mut self) -> Option<Vec<Vec<f32>>> {
        let remaining = self.len();
        self.pop(remaining)
    }
}

struct AudioTranscoder {
    ist_index: usize,
    ist_time_base: Rational,
    ost_index: usize,
    ost_time_base: Rational,
    enc_time_base: Rational,
    decoder: decoder::Audio,
    encoder: encoder::Audio,
    resampler: ResamplingContext,
    layout: ChannelLayout,
    rate: u32,
    fifo: SampleFifo,
    window: DecodeWindow,
    samples_written: i64,
    done: bool,
}

impl AudioTranscoder {
    fn new(
        input: &Input,
        index: usize,
        octx: &mut Output,
        job: &ClipJob<'_>,
        global_header: bool,
    ) -> Result<Self, DomainError> {
        let stream = input
            .stream(index)
            .ok_or_else(|| DomainError::ProcessingError("Audio stream not accessible".to_string()))?;
        let decoder = CodecContext::from_parameters(stream.parameters())
            .map_err(av_error("Failed to create decoder context"))?
            .decoder()
            .audio()
            .map_err(av_error("Failed to create audio decoder"))?;

        let codec = find_encoder(&job.encoding.audio_codec)?;
        let supports_planar_float = codec
            .audio()
            .ok()
            .and_then(|audio| audio.formats())
            .map_or(true, |mut formats| formats.any(|f| f == CLIP_SAMPLE_FORMAT));
        if !supports_planar_float {
            return Err(DomainError::BackendUnavailable(format!(
                "encoder '{}' does not accept planar float samples",
                job.encoding.audio_codec
            )));
        }

        let rate = decoder.rate();
        let layout = decoder.channel_layout();
        let enc_time_base = Rational::new(1, rate as i32);

        let mut ost = octx.add_stream(codec).map_err(av_error("Failed to add audio stream"))?;
        let ost_index = ost.index();

        let mut context = CodecContext::from_parameters(ost.parameters())
            .map_err(av_error("Failed to create encoder context"))?
            .encoder()
            .audio()
            .map_err(av_error("Failed to create audio encoder"))?;
        context.set_rate(rate as i32);
        context.set_channel_layout(layout);
        context.set_format(CLIP_SAMPLE_FORMAT);
        context.set_bit_rate(128_000);
        context.set_time_base(enc_time_base);
        if global_header {
            context.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let encoder = context
            .open_as(codec)
            .map_err(av_error("Failed to open audio encoder"))?;
        ost.set_parameters(&encoder);
        ost.set_time_base(enc_time_base);

        let resampler = ResamplingContext::get(
            decoder.format(),
            decoder.channel_layout(),
            decoder.rate(),
            CLIP_SAMPLE_FORMAT,
            layout,
            rate,
        )
        .map_err(av_error("Failed to create resampler"))?;

        Ok(Self {
            ist_index: stream.index(),
            ist_time_base: stream.time_base(),
            ost_index,
            ost_time_base: enc_time_base,
            enc_time_base,
            decoder,
            encoder,
            resampler,
            layout,
            rate,
            fifo: SampleFifo::default(),
            window: job.window,
            samples_written: 0,
            done: false,
        })
    }

    fn bind_output(&mut self, octx: &Output) -> Result<(), DomainError> {
        self.ost_time_base = octx
            .stream(self.ost_index)
            .ok_or_else(|| DomainError::ProcessingError("Output audio stream missing".to_string()))?
            .time_base();
        Ok(())
    }

    fn send_packet(&mut self, packet: &Packet, octx: &mut Output) -> Result<(), DomainError> {
        self.decoder
            .send_packet(packet)
            .map_err(av_error("Failed to send packet to decoder"))?;
        self.receive_decoded(octx)
    }

    fn receive_decoded(&mut self, octx: &mut Output) -> Result<(), DomainError> {
        let mut decoded = AudioFrame::empty();
        while !self.done && self.decoder.receive_frame(&mut decoded).is_ok() {
            let Some(ts) = decoded.timestamp().or(decoded.pts()) else {
                continue;
            };
            match self.window.position(ts_to_seconds(ts, self.ist_time_base)) {
                Position::Before => continue,
                Position::After => self.done = true,
                Position::Inside => {
                    let mut resampled = AudioFrame::empty();
                    self.resampler
                        .run(&decoded, &mut resampled)
                        .map_err(av_error("Failed to resample audio"))?;
                    self.fifo.push(&resampled);
                    self.encode_queued(octx, false)?;
                }
            }
        }
        Ok(())
    }

    /// Encode full frames from the queue; with `flush`, the remainder too
    fn encode_queued(&mut self, octx: &mut Output, flush: bool) -> Result<(), DomainError> {
        let frame_size = match self.encoder.frame_size() as usize {
            0 => self.fifo.len(),
            size => size,
        };
        while let Some(chunk) = self.fifo.pop(frame_size) {
            self.encode_chunk(&chunk, octx)?;
        }
        if flush {
            if let Some(chunk) = self.fifo.drain() {
                self.encode_chunk(&chunk, octx)?;
            }
        }
        Ok(())
    }

    fn encode_chunk(&mut self, chunk: &[Vec<f32>], octx: &mut Output) -> Result<(), DomainError> {
        let samples = chunk.first().map_or(0, Vec::len);
        let mut frame = AudioFrame::new(CLIP_SAMPLE_FORMAT, samples, self.layout);
        frame.set_rate(self.rate);
        for (channel, data) in chunk.iter().enumerate().take(frame.planes()) {
            frame.plane_mut::<f32>(channel)[..samples].copy_from_slice(data);
        }
        frame.set_pts(Some(self.samples_written));
        self.samples_written += samples as i64;

        self.encoder
            .send_frame(&frame)
            .map_err(av_error("Failed to send audio frame to encoder"))?;
        self.write_packets(octx)
    }

    fn write_packets(&mut self, octx: &mut Output) -> Result<(), DomainError> {
        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.ost_index);
            packet.rescale_ts(self.enc_time_base, self.ost_time_base);
            packet
                .write_interleaved(octx)
                .map_err(av_error("Failed to write audio packet"))?;
        }
        Ok(())
    }

    fn finish(&mut self, octx: &mut Output) -> Result<(), DomainError> {
        if !self.done {
            let _ = self.decoder.send_eof();
            self.receive_decoded(octx)?;
        }
        self.encode_queued(octx, true)?;
        self.encoder
            .send_eof()
            .map_err(av_error("Failed to flush audio encoder"))?;
        self.write_packets(octx)
    }
}
