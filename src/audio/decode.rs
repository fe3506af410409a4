use std::io::Cursor;

use symphonia::core::{
    audio::SampleBuffer,
    codecs::{CODEC_TYPE_NULL, DecoderOptions},
    errors::Error,
    formats::FormatOptions,
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};
use tracing::{debug, warn};

use super::{DecodedAudio, NormalizeError, RawAudioInput};

/// Turns submitted file bytes into per-channel samples at the native rate.
///
/// Implementations must not resample; the normalizer does that explicitly.
pub trait DecodingService {
    fn decode(&self, input: RawAudioInput) -> Result<DecodedAudio, NormalizeError>;
}

impl<T: DecodingService + ?Sized> DecodingService for Box<T> {
    fn decode(&self, input: RawAudioInput) -> Result<DecodedAudio, NormalizeError> {
        (**self).decode(input)
    }
}

/// In-memory decoder backed by symphonia (MP3, WAV, FLAC, AAC/M4A, OGG Vorbis, AIFF).
#[derive(Clone, Copy, Debug, Default)]
pub struct SymphoniaDecoder;

impl DecodingService for SymphoniaDecoder {
    fn decode(&self, input: RawAudioInput) -> Result<DecodedAudio, NormalizeError> {
        let hint = probe_hint(&input);
        let label = input
            .file_name()
            .unwrap_or_else(|| input.mime_type())
            .to_string();
        let mss = MediaSourceStream::new(Box::new(Cursor::new(input.into_bytes())), Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|err| map_probe_error(&label, err))?;
        let mut format = probed.format;
        let track = format
            .tracks()
            .iter()
            .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| NormalizeError::unsupported(format!("no decodable audio track in {label}")))?;
        let track_id = track.id;
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|err| map_codec_error(&label, err))?;

        let mut planar: Vec<Vec<f32>> = Vec::new();
        let mut layout: Option<(usize, u32)> = None;
        let mut skipped_packets = 0usize;
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(Error::IoError(_)) => break,
                Err(Error::ResetRequired) => {
                    return Err(NormalizeError::unsupported(format!(
                        "{label} changes track layout mid-stream"
                    )));
                }
                Err(err) => {
                    return Err(NormalizeError::decode(format!(
                        "packet read failed for {label}: {err}"
                    )));
                }
            };
            if packet.track_id() != track_id {
                continue;
            }
            let audio_buf = match decoder.decode(&packet) {
                Ok(audio_buf) => audio_buf,
                Err(Error::DecodeError(reason)) => {
                    skipped_packets += 1;
                    debug!("Skipping corrupt packet in {label}: {reason}");
                    continue;
                }
                Err(err) => return Err(map_codec_error(&label, err)),
            };
            let spec = *audio_buf.spec();
            let channels = spec.channels.count();
            match layout {
                None if channels == 0 => {
                    return Err(NormalizeError::unsupported(format!(
                        "{label} reports 0 audio channels"
                    )));
                }
                None => {
                    layout = Some((channels, spec.rate));
                    planar = vec![Vec::new(); channels];
                }
                Some(existing) if existing != (channels, spec.rate) => {
                    return Err(NormalizeError::unsupported(format!(
                        "{label} switches from {} ch @ {} Hz to {channels} ch @ {} Hz",
                        existing.0, existing.1, spec.rate
                    )));
                }
                Some(_) => {}
            }
            if audio_buf.frames() == 0 {
                continue;
            }
            let mut sample_buf = SampleBuffer::<f32>::new(audio_buf.capacity() as u64, spec);
            sample_buf.copy_interleaved_ref(audio_buf);
            append_interleaved(&mut planar, sample_buf.samples());
        }

        if skipped_packets > 0 {
            warn!("Skipped {skipped_packets} corrupt packet(s) while decoding {label}");
        }
        let Some((_, sample_rate)) = layout else {
            return Err(NormalizeError::decode(format!("{label} contains no audio packets")));
        };
        if planar.first().is_none_or(Vec::is_empty) {
            return Err(NormalizeError::decode(format!("decoded 0 samples from {label}")));
        }
        let decoded = DecodedAudio::new(planar, sample_rate)?;
        debug!(
            "Decoded {label}: {} ch, {} Hz, {:.2}s",
            decoded.channel_count(),
            decoded.sample_rate(),
            decoded.duration_seconds()
        );
        Ok(decoded)
    }
}

fn probe_hint(input: &RawAudioInput) -> Hint {
    let mut hint = Hint::new();
    if let Some(extension) = input.format_hint() {
        hint.with_extension(&extension);
    }
    if input.mime_type().starts_with("audio/") {
        hint.mime_type(input.mime_type());
    }
    hint
}

/// Spread one packet of interleaved samples across the per-channel buffers.
fn append_interleaved(planar: &mut [Vec<f32>], samples: &[f32]) {
    let channels = planar.len();
    if channels == 0 {
        return;
    }
    let frames = samples.len() / channels;
    for channel in planar.iter_mut() {
        channel.reserve(frames);
    }
    for frame in samples.chunks_exact(channels) {
        for (channel, &sample) in planar.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }
}

/// No reader claimed the bytes: not audio. A reader that recognised the
/// container but refused its contents: unsupported.
fn map_probe_error(label: &str, err: Error) -> NormalizeError {
    match err {
        Error::Unsupported(what) if what.contains("no suitable format reader") => {
            NormalizeError::decode(format!("{label} is not recognised as audio: {what}"))
        }
        Error::Unsupported(_) => map_codec_error(label, err),
        other => NormalizeError::decode(format!("{label} is not recognised as audio: {other}")),
    }
}

fn map_codec_error(label: &str, err: Error) -> NormalizeError {
    match err {
        Error::Unsupported(what) => {
            NormalizeError::unsupported(format!("{label} uses an unsupported codec: {what}"))
        }
        other => NormalizeError::decode(format!("decoder failed for {label}: {other}")),
    }
}
