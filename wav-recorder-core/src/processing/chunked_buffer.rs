/// One channel's fixed-capacity block of samples.
pub type Chunk = Box<[f32]>;

/// Result of one [`ChunkedSampleBuffer::append`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppendOutcome {
    /// Frames stored from the burst.
    pub frames_written: usize,
    /// New chunks allocated per channel while storing the burst.
    pub chunks_allocated: usize,
    /// The chunk ceiling is reached and the last chunk is full.
    pub full: bool,
}

/// Growable multi-channel sample store for live capture.
///
/// Each channel is a track of fixed-length chunks. Every chunk except the
/// current one is completely filled, and every track always holds
/// `current_chunk_index + 1` chunks, so
/// `total_frame_count == current_chunk_index * chunk_capacity + current_chunk_offset`.
///
/// A new zero-filled chunk is allocated for every channel as soon as the
/// current one fills. With a chunk ceiling the last permitted chunk is left
/// full (`current_chunk_offset == chunk_capacity`) and further frames are
/// dropped until [`reset`](Self::reset).
///
/// Not synchronized: the capture context owns it exclusively.
#[derive(Debug)]
pub struct ChunkedSampleBuffer {
    tracks: Vec<Vec<Chunk>>,
    chunk_capacity: usize,
    max_chunks: Option<usize>,
    current_chunk_index: usize,
    current_chunk_offset: usize,
    total_frame_count: usize,
}

impl ChunkedSampleBuffer {
    /// `chunk_capacity` is clamped to at least one sample and `max_chunks`
    /// to at least one chunk.
    pub fn new(channel_count: usize, chunk_capacity: usize, max_chunks: Option<usize>) -> Self {
        let chunk_capacity = chunk_capacity.max(1);
        Self {
            tracks: fresh_tracks(channel_count, chunk_capacity),
            chunk_capacity,
            max_chunks: max_chunks.map(|max| max.max(1)),
            current_chunk_index: 0,
            current_chunk_offset: 0,
            total_frame_count: 0,
        }
    }

    /// Store one burst of frames, given as one sample slice per channel.
    ///
    /// The burst length is the longest slice. Missing channels and short
    /// slices are stored as silence; slices beyond the channel count are
    /// ignored. Bursts may span any number of chunk boundaries.
    pub fn append<S: AsRef<[f32]>>(&mut self, burst: &[S]) -> AppendOutcome {
        let mut outcome = AppendOutcome::default();
        if self.is_released() {
            return outcome;
        }

        let frame_count = burst.iter().map(|c| c.as_ref().len()).max().unwrap_or(0);
        let mut written = 0;

        while written < frame_count && !self.is_full() {
            let index = self.current_chunk_index;
            let start = self.current_chunk_offset;
            let n = (self.chunk_capacity - start).min(frame_count - written);

            for (track, input) in self.tracks.iter_mut().zip(burst) {
                let input = input.as_ref();
                let available = input.len().saturating_sub(written).min(n);
                if available > 0 {
                    // Chunks are zero-filled; the silent tail needs no write.
                    track[index][start..start + available]
                        .copy_from_slice(&input[written..written + available]);
                }
            }

            self.current_chunk_offset += n;
            self.total_frame_count += n;
            written += n;

            if self.current_chunk_offset == self.chunk_capacity && self.grow() {
                outcome.chunks_allocated += 1;
            }
        }

        outcome.frames_written = written;
        outcome.full = self.is_full();
        outcome
    }

    /// Everything captured so far, one exact-length `Vec` per channel.
    pub fn trimmed_view(&self) -> Vec<Vec<f32>> {
        self.tracks
            .iter()
            .map(|track| {
                let mut merged = Vec::with_capacity(self.total_frame_count);
                for chunk in &track[..self.current_chunk_index] {
                    merged.extend_from_slice(chunk);
                }
                if let Some(current) = track.get(self.current_chunk_index) {
                    merged.extend_from_slice(&current[..self.current_chunk_offset]);
                }
                merged
            })
            .collect()
    }

    /// Discard all chunks and start over with one empty chunk per channel.
    pub fn reset(&mut self) {
        self.tracks = fresh_tracks(self.tracks.len(), self.chunk_capacity);
        self.current_chunk_index = 0;
        self.current_chunk_offset = 0;
        self.total_frame_count = 0;
    }

    /// Drop every chunk. A released buffer ignores appends until `reset`.
    pub fn release(&mut self) {
        for track in &mut self.tracks {
            *track = Vec::new();
        }
        self.current_chunk_index = 0;
        self.current_chunk_offset = 0;
        self.total_frame_count = 0;
    }

    pub fn is_released(&self) -> bool {
        self.tracks.first().map_or(true, Vec::is_empty)
    }

    /// Whether the chunk ceiling is reached and the last chunk is full.
    pub fn is_full(&self) -> bool {
        self.current_chunk_offset == self.chunk_capacity
    }

    pub fn channel_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn chunk_capacity(&self) -> usize {
        self.chunk_capacity
    }

    pub fn max_chunks(&self) -> Option<usize> {
        self.max_chunks
    }

    pub fn total_frame_count(&self) -> usize {
        self.total_frame_count
    }

    pub fn current_chunk_index(&self) -> usize {
        self.current_chunk_index
    }

    pub fn current_chunk_offset(&self) -> usize {
        self.current_chunk_offset
    }

    /// Chunks per channel.
    pub fn chunk_count(&self) -> usize {
        self.tracks.first().map_or(0, Vec::len)
    }

    pub fn chunk(&self, channel: usize, index: usize) -> Option<&[f32]> {
        self.tracks.get(channel)?.get(index).map(|chunk| &chunk[..])
    }

    /// Append a fresh chunk to every track. Returns false at the ceiling.
    fn grow(&mut self) -> bool {
        if let Some(max) = self.max_chunks {
            if self.current_chunk_index + 1 >= max {
                return false;
            }
        }
        for track in &mut self.tracks {
            track.push(new_chunk(self.chunk_capacity));
        }
        self.current_chunk_index += 1;
        self.current_chunk_offset = 0;
        log::debug!(
            "allocated chunk {} ({} frames captured)",
            self.current_chunk_index,
            self.total_frame_count
        );
        true
    }
}

fn new_chunk(capacity: usize) -> Chunk {
    vec![0.0f32; capacity].into_boxed_slice()
}

fn fresh_tracks(channel_count: usize, chunk_capacity: usize) -> Vec<Vec<Chunk>> {
    (0..channel_count)
        .map(|_| vec![new_chunk(chunk_capacity)])
        .collect()
}
