pub mod chunked_buffer;
pub mod interleave;
pub mod sample_codec;
pub mod wav_format;
