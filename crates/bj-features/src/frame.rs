//! Multi-channel sample blocks
//!
//! A frame is an n × C block stored interleaved (row-major), as produced by
//! the acquisition side. Shape is validated once, on construction.

use bj_core::{BjError, BjResult};

/// Interleaved block of `rows × channels` samples
#[derive(Debug, Clone, PartialEq)]
pub struct SignalFrame {
    /// Row-major sample data
    data: Vec<f32>,
    /// Number of channels per row
    channels: usize,
}

impl SignalFrame {
    /// Wrap interleaved data. `data.len()` must be a multiple of `channels`.
    pub fn new(data: Vec<f32>, channels: usize) -> BjResult<Self> {
        if channels == 0 {
            return Err(BjError::ShapeMismatch {
                expected: "at least one channel".into(),
                got: "0 channels".into(),
            });
        }
        if data.len() % channels != 0 {
            return Err(BjError::ShapeMismatch {
                expected: format!("multiple of {channels} samples"),
                got: format!("{} samples", data.len()),
            });
        }
        Ok(Self { data, channels })
    }

    /// Build from rows; every row must have the same length
    pub fn from_rows(rows: &[Vec<f32>]) -> BjResult<Self> {
        let channels = rows.first().map(|r| r.len()).unwrap_or(0);
        Self::from_rows_with_channels(rows, channels)
    }

    /// Build from rows with an explicit channel count (allows zero rows)
    pub fn from_rows_with_channels(rows: &[Vec<f32>], channels: usize) -> BjResult<Self> {
        let mut data = Vec::with_capacity(rows.len() * channels);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != channels {
                return Err(BjError::ShapeMismatch {
                    expected: format!("{channels} values per row"),
                    got: format!("{} values in row {i}", row.len()),
                });
            }
            data.extend_from_slice(row);
        }
        Self::new(data, channels)
    }

    /// Single-channel frame
    pub fn mono(data: Vec<f32>) -> Self {
        Self { data, channels: 1 }
    }

    /// Frame with no rows
    pub fn empty(channels: usize) -> Self {
        Self {
            data: Vec::new(),
            channels: channels.max(1),
        }
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of rows (samples per channel)
    #[inline]
    pub fn rows(&self) -> usize {
        self.data.len() / self.channels
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Interleaved data
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Iterate rows
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.channels)
    }

    /// One channel's samples
    pub fn channel(&self, ch: usize) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().skip(ch).step_by(self.channels).copied()
    }
}
