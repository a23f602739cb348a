use crate::models::error::RecorderError;

/// Widest integer sample the codec packs.
pub const MAX_BITS_PER_SAMPLE: u16 = 32;

/// Byte order of the packed integer bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

/// Converts float samples in `[-1.0, 1.0]` to raw sample bytes and back.
///
/// Out-of-range input is clamped, never rejected. Integer samples scale
/// negative values by `2^(bits-1)` and positive values by `2^(bits-1) - 1`,
/// truncating toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCodec {
    /// Signed integer PCM split into `bits_per_sample / bits_per_byte` bytes,
    /// each masked to `bits_per_byte` bits.
    Pcm {
        bits_per_sample: u16,
        bits_per_byte: u8,
        byte_order: ByteOrder,
    },
    /// 32-bit IEEE float, little-endian, written verbatim after clamping.
    Float32,
}

impl SampleCodec {
    /// Integer PCM with 8-bit bytes in little-endian order.
    pub fn pcm(bits_per_sample: u16) -> Result<Self, RecorderError> {
        Self::pcm_packed(bits_per_sample, 8, ByteOrder::LittleEndian)
    }

    /// Integer PCM with a caller-chosen byte width and order.
    pub fn pcm_packed(
        bits_per_sample: u16,
        bits_per_byte: u8,
        byte_order: ByteOrder,
    ) -> Result<Self, RecorderError> {
        let unsupported = RecorderError::UnsupportedBitDepth {
            bits_per_sample,
            bits_per_byte,
        };
        if bits_per_sample == 0 || bits_per_sample > MAX_BITS_PER_SAMPLE {
            return Err(unsupported);
        }
        if bits_per_byte == 0 || bits_per_byte > 8 {
            return Err(unsupported);
        }
        if bits_per_sample % bits_per_byte as u16 != 0 {
            return Err(unsupported);
        }
        Ok(Self::Pcm {
            bits_per_sample,
            bits_per_byte,
            byte_order,
        })
    }

    pub fn float32() -> Self {
        Self::Float32
    }

    /// Codec for a WAV sample format. Float data must be 32 bits wide.
    pub fn for_format(is_float: bool, bits_per_sample: u16) -> Result<Self, RecorderError> {
        if is_float {
            if bits_per_sample != 32 {
                return Err(RecorderError::UnsupportedBitDepth {
                    bits_per_sample,
                    bits_per_byte: 8,
                });
            }
            Ok(Self::Float32)
        } else {
            Self::pcm(bits_per_sample)
        }
    }

    /// Number of bytes one encoded sample occupies.
    pub fn bytes_per_sample(&self) -> usize {
        match *self {
            Self::Pcm {
                bits_per_sample,
                bits_per_byte,
                ..
            } => (bits_per_sample as usize).div_ceil(bits_per_byte as usize),
            Self::Float32 => 4,
        }
    }

    /// Append the encoded bytes of one sample to `out`.
    pub fn encode_into(&self, sample: f32, out: &mut Vec<u8>) {
        match *self {
            Self::Pcm {
                bits_per_sample,
                bits_per_byte,
                byte_order,
            } => {
                let value = scale_to_int(sample, bits_per_sample);
                let byte_count = self.bytes_per_sample();
                let mask = (1i64 << bits_per_byte) - 1;
                let start = out.len();
                for i in 0..byte_count {
                    out.push(((value >> (i * bits_per_byte as usize)) & mask) as u8);
                }
                if byte_order == ByteOrder::BigEndian {
                    out[start..].reverse();
                }
            }
            Self::Float32 => out.extend_from_slice(&encode_float32(sample)),
        }
    }

    /// Encode a run of samples.
    pub fn encode(&self, samples: &[f32]) -> Vec<u8> {
        let mut out = Vec::with_capacity(samples.len() * self.bytes_per_sample());
        for &sample in samples {
            self.encode_into(sample, &mut out);
        }
        out
    }

    /// Decode one sample from exactly `bytes_per_sample()` bytes.
    pub fn decode(&self, bytes: &[u8]) -> Result<f32, RecorderError> {
        let expected = self.bytes_per_sample();
        if bytes.len() != expected {
            return Err(RecorderError::InvalidWav(format!(
                "sample needs {} bytes, got {}",
                expected,
                bytes.len()
            )));
        }
        Ok(self.decode_sample(bytes))
    }

    /// Decode a run of samples. A trailing partial sample is ignored.
    pub fn decode_all(&self, bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(self.bytes_per_sample())
            .map(|chunk| self.decode_sample(chunk))
            .collect()
    }

    /// `bytes` must hold exactly `bytes_per_sample()` bytes.
    fn decode_sample(&self, bytes: &[u8]) -> f32 {
        match *self {
            Self::Pcm {
                bits_per_sample,
                bits_per_byte,
                byte_order,
            } => {
                let mask = (1i64 << bits_per_byte) - 1;
                let mut value = 0i64;
                let significance = |i: usize| match byte_order {
                    ByteOrder::LittleEndian => i,
                    ByteOrder::BigEndian => bytes.len() - 1 - i,
                };
                for (i, &byte) in bytes.iter().enumerate() {
                    value |= (byte as i64 & mask) << (significance(i) * bits_per_byte as usize);
                }
                // Sign-extend from the sample width.
                let shift = 64 - bits_per_sample as u32;
                let value = (value << shift) >> shift;

                let neg_range = (1i64 << (bits_per_sample - 1)) as f64;
                let pos_range = neg_range - 1.0;
                if value < 0 {
                    (value as f64 / neg_range) as f32
                } else if pos_range > 0.0 {
                    (value as f64 / pos_range) as f32
                } else {
                    0.0
                }
            }
            Self::Float32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        }
    }
}

/// Fixed 16-bit path: clamp, scale and store into an `i16`, little-endian.
pub fn encode_int16(sample: f32) -> [u8; 2] {
    let s = (sample as f64).clamp(-1.0, 1.0);
    let scaled = if s < 0.0 { s * 32768.0 } else { s * 32767.0 };
    (scaled as i16).to_le_bytes()
}

/// Float path: clamp and store the 32-bit float verbatim, little-endian.
pub fn encode_float32(sample: f32) -> [u8; 4] {
    sample.clamp(-1.0, 1.0).to_le_bytes()
}

fn scale_to_int(sample: f32, bits_per_sample: u16) -> i64 {
    let neg_range = (1i64 << (bits_per_sample - 1)) as f64;
    let pos_range = neg_range - 1.0;
    let s = (sample as f64).clamp(-1.0, 1.0);
    let scaled = if s < 0.0 { s * neg_range } else { s * pos_range };
    scaled.trunc() as i64
}
