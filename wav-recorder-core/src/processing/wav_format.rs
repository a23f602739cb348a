//! WAV container encoding and decoding.
//!
//! Produces canonical 44-byte RIFF headers followed by interleaved sample
//! data. All multi-byte header fields are little-endian.

use super::interleave::{common_frame_count, deinterleave};
use super::sample_codec::SampleCodec;
use crate::models::error::RecorderError;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

pub const WAVE_FORMAT_PCM: u16 = 0x0001;
pub const WAVE_FORMAT_IEEE_FLOAT: u16 = 0x0003;

/// Length of the `fmt ` sub-chunk body for PCM / float.
const FMT_CHUNK_DATA_SIZE: u32 = 16;

/// Largest `data` payload whose RIFF size still fits a `u32`.
const MAX_DATA_SIZE: u32 = u32::MAX - 36;

/// Encoding parameters for one WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavDescriptor {
    pub sample_rate: u32,
    pub channel_count: u16,
    pub is_float: bool,
    pub bits_per_sample: u16,
}

impl WavDescriptor {
    pub fn new(sample_rate: u32, channel_count: u16, is_float: bool, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channel_count,
            is_float,
            bits_per_sample,
        }
    }

    /// 16-bit integer PCM.
    pub fn pcm(sample_rate: u32, channel_count: u16) -> Self {
        Self::new(sample_rate, channel_count, false, 16)
    }

    /// 32-bit IEEE float.
    pub fn float(sample_rate: u32, channel_count: u16) -> Self {
        Self::new(sample_rate, channel_count, true, 32)
    }

    /// Sample codec for this format; fails on bit depths the codec cannot pack.
    pub fn codec(&self) -> Result<SampleCodec, RecorderError> {
        SampleCodec::for_format(self.is_float, self.bits_per_sample)
    }

    pub fn format_tag(&self) -> u16 {
        if self.is_float {
            WAVE_FORMAT_IEEE_FLOAT
        } else {
            WAVE_FORMAT_PCM
        }
    }

    /// `ceil(bits_per_sample / 8)`.
    pub fn bytes_per_sample(&self) -> usize {
        (self.bits_per_sample as usize).div_ceil(8)
    }

    /// Bytes per frame across all channels. Saturates at `u16::MAX`.
    pub fn block_align(&self) -> u16 {
        self.channel_count
            .saturating_mul(self.bytes_per_sample().min(u16::MAX as usize) as u16)
    }

    /// Saturates at `u32::MAX`.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate.saturating_mul(self.block_align() as u32)
    }

    fn check_header_fields(&self) -> Result<(), RecorderError> {
        let block_align = self.channel_count as u64 * self.bytes_per_sample() as u64;
        if block_align > u16::MAX as u64 {
            return Err(RecorderError::ConfigurationFailed(format!(
                "block align {} does not fit the fmt chunk",
                block_align
            )));
        }
        if self.sample_rate as u64 * block_align > u32::MAX as u64 {
            return Err(RecorderError::ConfigurationFailed(format!(
                "byte rate for {} Hz does not fit the fmt chunk",
                self.sample_rate
            )));
        }
        Ok(())
    }
}

/// Generate a 44-byte WAV RIFF header.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + data_size  (8 + fmt chunk (20) + data chunk (8 + data_size))
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16
/// [20-21]  format tag (1 = PCM, 3 = IEEE float)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * block_align
/// [32-33]  block_align = channels * bytes_per_sample
/// [34-35]  bits_per_sample
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
///
/// Fails with `ConfigurationFailed` when the block align or byte rate does
/// not fit its field, or `RecordingTooLarge` when the RIFF size would overflow.
pub fn generate_wav_header(
    descriptor: &WavDescriptor,
    data_size: u32,
) -> Result<[u8; WAV_HEADER_SIZE], RecorderError> {
    descriptor.check_header_fields()?;
    if data_size > MAX_DATA_SIZE {
        return Err(RecorderError::RecordingTooLarge {
            data_size: data_size as u64,
        });
    }

    let fmt_chunk_size = FMT_CHUNK_DATA_SIZE + 4;
    let data_chunk_size = data_size + 8;
    let riff_size = 8 + fmt_chunk_size + data_chunk_size;

    let mut header = [0u8; WAV_HEADER_SIZE];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&riff_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&FMT_CHUNK_DATA_SIZE.to_le_bytes());
    header[20..22].copy_from_slice(&descriptor.format_tag().to_le_bytes());
    header[22..24].copy_from_slice(&descriptor.channel_count.to_le_bytes());
    header[24..28].copy_from_slice(&descriptor.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&descriptor.byte_rate().to_le_bytes());
    header[32..34].copy_from_slice(&descriptor.block_align().to_le_bytes());
    header[34..36].copy_from_slice(&descriptor.bits_per_sample.to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    Ok(header)
}

/// Encode per-channel samples into a complete WAV file.
///
/// Validation happens before any byte is produced: an unsupported bit depth,
/// zero channels, a channel count differing from the descriptor, channels of
/// unequal length, zero frames, or a payload too large for RIFF all fail
/// without partial output. Samples are interleaved straight into the output.
pub fn encode_wav<S: AsRef<[f32]>>(
    recording: &[S],
    descriptor: &WavDescriptor,
) -> Result<Vec<u8>, RecorderError> {
    let codec = descriptor.codec()?;

    if recording.is_empty() {
        return Err(RecorderError::EmptyRecording);
    }
    if recording.len() != descriptor.channel_count as usize {
        return Err(RecorderError::ConfigurationFailed(format!(
            "descriptor declares {} channels, recording has {}",
            descriptor.channel_count,
            recording.len()
        )));
    }
    let frame_count = common_frame_count(recording)?;
    if frame_count == 0 {
        return Err(RecorderError::EmptyRecording);
    }

    let data_size = recording.len() as u64 * frame_count as u64 * codec.bytes_per_sample() as u64;
    if data_size > MAX_DATA_SIZE as u64 {
        return Err(RecorderError::RecordingTooLarge { data_size });
    }
    let header = generate_wav_header(descriptor, data_size as u32)?;

    let mut buffer = Vec::with_capacity(WAV_HEADER_SIZE + data_size as usize);
    buffer.extend_from_slice(&header);
    for frame in 0..frame_count {
        for channel in recording {
            codec.encode_into(channel.as_ref()[frame], &mut buffer);
        }
    }
    Ok(buffer)
}

/// A parsed WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedWav {
    pub descriptor: WavDescriptor,
    /// Samples per channel, normalized to `[-1.0, 1.0]`.
    pub channels: Vec<Vec<f32>>,
}

impl DecodedWav {
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }
}

/// Parse a PCM or IEEE-float WAV file into per-channel samples.
///
/// Unknown chunks between `fmt ` and `data` are skipped.
pub fn decode_wav(data: &[u8]) -> Result<DecodedWav, RecorderError> {
    if data.len() < 12 {
        return Err(RecorderError::InvalidWav("file too small".into()));
    }
    if &data[0..4] != b"RIFF" {
        return Err(RecorderError::InvalidWav("missing RIFF header".into()));
    }
    if &data[8..12] != b"WAVE" {
        return Err(RecorderError::InvalidWav("missing WAVE marker".into()));
    }

    let mut descriptor: Option<WavDescriptor> = None;
    let mut pos = 12;

    while pos + 8 <= data.len() {
        let chunk_id = &data[pos..pos + 4];
        let chunk_size = read_u32(data, pos + 4) as usize;
        let body = pos + 8;

        if chunk_id == b"fmt " {
            if chunk_size < FMT_CHUNK_DATA_SIZE as usize || body + chunk_size > data.len() {
                return Err(RecorderError::InvalidWav("fmt chunk truncated".into()));
            }
            let format_tag = read_u16(data, body);
            let is_float = match format_tag {
                WAVE_FORMAT_PCM => false,
                WAVE_FORMAT_IEEE_FLOAT => true,
                other => {
                    return Err(RecorderError::InvalidWav(format!(
                        "unsupported format tag {:#06x}",
                        other
                    )))
                }
            };
            descriptor = Some(WavDescriptor {
                sample_rate: read_u32(data, body + 4),
                channel_count: read_u16(data, body + 2),
                is_float,
                bits_per_sample: read_u16(data, body + 14),
            });
        } else if chunk_id == b"data" {
            let descriptor = descriptor
                .ok_or_else(|| RecorderError::InvalidWav("data chunk before fmt chunk".into()))?;
            if descriptor.channel_count == 0 || descriptor.sample_rate == 0 {
                return Err(RecorderError::InvalidWav("zero channels or sample rate".into()));
            }
            let codec = descriptor.codec()?;
            let end = (body + chunk_size).min(data.len());
            let samples = codec.decode_all(&data[body..end]);
            return Ok(DecodedWav {
                descriptor,
                channels: deinterleave(&samples, descriptor.channel_count as usize),
            });
        }

        // Chunks are word-aligned.
        pos = body + chunk_size + (chunk_size & 1);
    }

    Err(RecorderError::InvalidWav("no data chunk found".into()))
}

fn read_u16(data: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([data[pos], data[pos + 1]])
}

fn read_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}
