use crate::models::error::RecorderError;

/// Interleave per-channel samples into frame-major order
/// `[c0f0, c1f0, ..., c0f1, c1f1, ...]`.
///
/// The output length is the sum of the input lengths. Every channel must hold
/// the same number of samples; otherwise the round-robin fill cannot reach that
/// length and the call fails with `ShapeMismatch` naming the first offending
/// channel.
pub fn interleave<S: AsRef<[f32]>>(channels: &[S]) -> Result<Vec<f32>, RecorderError> {
    let frame_count = common_frame_count(channels)?;

    let channel_count = channels.len();
    let mut result = vec![0.0f32; frame_count * channel_count];
    for (channel, samples) in channels.iter().enumerate() {
        for (frame, &sample) in samples.as_ref().iter().enumerate() {
            result[frame * channel_count + channel] = sample;
        }
    }
    Ok(result)
}

/// Frames per channel, failing with `ShapeMismatch` unless every channel
/// holds the same number of samples. No channels means zero frames.
pub fn common_frame_count<S: AsRef<[f32]>>(channels: &[S]) -> Result<usize, RecorderError> {
    let Some(first) = channels.first() else {
        return Ok(0);
    };
    let frame_count = first.as_ref().len();

    for (channel, samples) in channels.iter().enumerate().skip(1) {
        let actual = samples.as_ref().len();
        if actual != frame_count {
            return Err(RecorderError::ShapeMismatch {
                channel,
                expected: frame_count,
                actual,
            });
        }
    }
    Ok(frame_count)
}

/// Split an interleaved buffer back into `channel_count` channels.
///
/// Trailing samples that do not form a whole frame are dropped.
pub fn deinterleave(samples: &[f32], channel_count: usize) -> Vec<Vec<f32>> {
    if channel_count == 0 {
        return Vec::new();
    }
    let frame_count = samples.len() / channel_count;
    let mut channels: Vec<Vec<f32>> = (0..channel_count)
        .map(|_| Vec::with_capacity(frame_count))
        .collect();
    for frame in samples.chunks_exact(channel_count) {
        for (channel, &sample) in frame.iter().enumerate() {
            channels[channel].push(sample);
        }
    }
    channels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleave_stereo() {
        let left = [1.0f32, 2.0, 3.0];
        let right = [4.0f32, 5.0, 6.0];

        let result = interleave(&[left, right]).unwrap();

        assert_eq!(result, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn interleave_three_channels() {
        let channels: Vec<Vec<f32>> = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];

        let result = interleave(&channels).unwrap();

        assert_eq!(result, vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn interleave_mono_is_identity() {
        let result = interleave(&[vec![0.1f32, 0.2, 0.3]]).unwrap();
        assert_eq!(result, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn interleave_unequal_lengths_fails() {
        let channels: Vec<Vec<f32>> = vec![vec![1.0, 2.0], vec![4.0, 5.0, 6.0]];

        let err = interleave(&channels).unwrap_err();

        assert_eq!(
            err,
            RecorderError::ShapeMismatch {
                channel: 1,
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn interleave_empty_inputs() {
        let none: [Vec<f32>; 0] = [];
        assert!(interleave(&none).unwrap().is_empty());
        assert!(interleave(&[Vec::<f32>::new(), Vec::new()]).unwrap().is_empty());
    }

    #[test]
    fn common_frame_count_checks_every_channel() {
        let none: [Vec<f32>; 0] = [];
        assert_eq!(common_frame_count(&none), Ok(0));
        assert_eq!(common_frame_count(&[vec![0.0f32; 4], vec![1.0; 4]]), Ok(4));
        assert_eq!(
            common_frame_count(&[Vec::new(), vec![0.5f32, 0.5]]),
            Err(RecorderError::ShapeMismatch {
                channel: 1,
                expected: 0,
                actual: 2
            })
        );
    }

    #[test]
    fn deinterleave_reverses_interleave() {
        let channels: Vec<Vec<f32>> = vec![vec![1.0, 2.0, 3.0], vec![-1.0, -2.0, -3.0]];
        let flat = interleave(&channels).unwrap();
        assert_eq!(deinterleave(&flat, 2), channels);
    }
}
