use crate::errors::{ModelError, Result};

///
/// One row of a pileup image: a single read (or the synthetic reference row)
/// rendered as `num_channels` channels of `width` pixels each.
///
/// Pixels are stored channel after channel, so [`ImageRow::channel`] is a
/// contiguous slice.
///
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ImageRow {
    width: usize,
    num_channels: usize,
    data: Vec<u8>,
}

impl ImageRow {
    ///
    /// Zero-filled row.
    ///
    pub fn new(width: usize, num_channels: usize) -> Self {
        ImageRow {
            width,
            num_channels,
            data: vec![0; width * num_channels],
        }
    }

    ///
    /// Build a row from one pixel vector per channel. Every channel must have
    /// the same, non-zero width.
    ///
    pub fn from_channels(channels: Vec<Vec<u8>>) -> Result<Self> {
        let width = channels.first().map(|c| c.len()).unwrap_or(0);
        if width == 0 {
            return Err(ModelError::EmptyImageRow);
        }

        let num_channels = channels.len();
        let mut data = Vec::with_capacity(width * num_channels);
        for (channel, pixels) in channels.into_iter().enumerate() {
            if pixels.len() != width {
                return Err(ModelError::RaggedChannel {
                    channel,
                    expected: width,
                    found: pixels.len(),
                });
            }
            data.extend_from_slice(&pixels);
        }

        Ok(ImageRow {
            width,
            num_channels,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Pixels of one channel. Panics if `channel >= num_channels`.
    pub fn channel(&self, channel: usize) -> &[u8] {
        let start = channel * self.width;
        &self.data[start..start + self.width]
    }

    pub fn channel_mut(&mut self, channel: usize) -> &mut [u8] {
        let start = channel * self.width;
        &mut self.data[start..start + self.width]
    }

    pub fn channels(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.data.chunks_exact(self.width.max(1))
    }

    pub fn pixel(&self, channel: usize, position: usize) -> u8 {
        self.data[channel * self.width + position]
    }
}
