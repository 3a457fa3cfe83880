// Fixed-size audio framing
//
// Converted samples are accumulated until a full frame is available, then
// emitted as the atomic unit of outbound transmission. A partial remainder
// stays buffered across pushes and is never emitted short.

/// A fixed-length block of mono f32 samples at the target sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    /// Audio samples; length always equals the aggregator's frame size
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioFrame {
    /// Raw wire payload: little-endian IEEE-754 f32, no header.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

/// Accumulates samples into fixed-size frames.
///
/// Deterministic over chunking: any way of splitting the same sample
/// stream across `push` calls produces the same sequence of frames.
pub struct FrameAggregator {
    frame_size: usize,
    sample_rate: u32,
    buffer: Vec<f32>,
}

impl FrameAggregator {
    pub fn new(frame_size: usize, sample_rate: u32) -> Self {
        Self {
            frame_size,
            sample_rate,
            buffer: Vec::with_capacity(frame_size),
        }
    }

    /// Append samples and return every complete frame they produce.
    ///
    /// The buffered remainder is always shorter than one frame.
    pub fn push(&mut self, samples: &[f32]) -> Vec<AudioFrame> {
        let mut frames = Vec::new();

        for &sample in samples {
            self.buffer.push(sample);

            if self.buffer.len() >= self.frame_size {
                let full = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.frame_size));
                frames.push(AudioFrame {
                    samples: full,
                    sample_rate: self.sample_rate,
                });
            }
        }

        frames
    }

    /// Number of samples currently buffered (always `< frame_size`).
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Discard the buffered remainder. Used on recording stop; a partial
    /// frame is never sent.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}
