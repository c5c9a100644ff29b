//! In-memory point matrix and its binary file format.
//!
//! # File format
//!
//! ```text
//! +---------+---------+------------------------------+
//! | n: u32  | d: u32  | n * d values: f32, row-major |
//! +---------+---------+------------------------------+
//! ```
//!
//! All fields are little-endian. The matrix is read once into an owned
//! buffer and never mutated afterwards.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{JoinError, JoinResult};

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 8;

/// Most values reserved up front; larger bodies grow as they are read.
const MAX_PREALLOC: usize = 1 << 20;

/// An immutable `n x d` matrix of `f32` points, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    data: Vec<f32>,
    len: usize,
    dimension: usize,
}

impl Dataset {
    /// Wrap a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if `dimension` is zero, if the buffer length is not a
    /// multiple of `dimension`, or if any value is NaN or infinite.
    pub fn from_flat(dimension: usize, data: Vec<f32>) -> JoinResult<Self> {
        if dimension == 0 {
            return Err(JoinError::InvalidDimension { expected: 1, actual: 0 });
        }
        if data.len() % dimension != 0 {
            return Err(JoinError::DimensionMismatch {
                expected: dimension,
                actual: data.len() % dimension,
            });
        }
        if let Some(i) = data.iter().position(|v| !v.is_finite()) {
            return Err(JoinError::InvalidValue {
                row: i / dimension,
                column: i % dimension,
                value: data[i],
            });
        }
        let len = data.len() / dimension;
        Ok(Self { data, len, dimension })
    }

    /// Build a dataset from individual rows of equal length.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows are empty vectors or differ in length.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> JoinResult<Self> {
        let dimension = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * dimension);
        for row in rows {
            let row = row.as_ref();
            if row.len() != dimension {
                return Err(JoinError::DimensionMismatch { expected: dimension, actual: row.len() });
            }
            data.extend_from_slice(row);
        }
        Self::from_flat(dimension, data)
    }

    /// Read a dataset file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is malformed.
    pub fn open(path: impl AsRef<Path>) -> JoinResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let dataset = Self::read_from(BufReader::new(file))?;
        info!(
            path = %path.display(),
            points = dataset.len(),
            dimension = dataset.dimension(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Read a dataset from any reader.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError::InvalidHeader`] for a short or zero-dimension
    /// header and [`JoinError::Truncated`] when the body is shorter than the
    /// header promises.
    pub fn read_from<R: Read>(mut reader: R) -> JoinResult<Self> {
        let mut header = [0u8; HEADER_SIZE];
        match reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(JoinError::InvalidHeader("file too small for header".into()));
            }
            Err(e) => return Err(e.into()),
        }

        let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let dimension = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
        if dimension == 0 {
            return Err(JoinError::InvalidHeader(format!("dimension is zero ({len} points)")));
        }
        debug!(points = len, dimension, "read dataset header");

        let expected = len as u64 * dimension as u64;
        let total = usize::try_from(expected).map_err(|_| {
            JoinError::InvalidHeader(format!("{len} x {dimension} does not fit in memory"))
        })?;

        // The header is untrusted until the body has actually been read.
        let mut data = Vec::with_capacity(total.min(MAX_PREALLOC));
        let mut buf = [0u8; 4];
        for read in 0..expected {
            match reader.read_exact(&mut buf) {
                Ok(()) => data.push(f32::from_le_bytes(buf)),
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Err(JoinError::Truncated { expected, read });
                }
                Err(e) => return Err(e.into()),
            }
        }

        Self::from_flat(dimension, data)
    }

    /// Write the dataset to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> JoinResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the dataset to any writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the size does not fit the `u32` header fields or if
    /// writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> JoinResult<()> {
        let len = u32::try_from(self.len)
            .map_err(|_| JoinError::InvalidConfig(format!("{} points exceed u32", self.len)))?;
        let dimension = u32::try_from(self.dimension).map_err(|_| {
            JoinError::InvalidConfig(format!("dimension {} exceeds u32", self.dimension))
        })?;

        writer.write_all(&len.to_le_bytes())?;
        writer.write_all(&dimension.to_le_bytes())?;
        for value in &self.data {
            writer.write_all(&value.to_le_bytes())?;
        }
        Ok(())
    }

    /// Number of points.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if the dataset has no points.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Dimension of every point.
    #[inline]
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// The coordinates of point `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    #[inline]
    #[must_use]
    pub fn row(&self, i: usize) -> &[f32] {
        let start = i * self.dimension;
        &self.data[start..start + self.dimension]
    }

    /// Iterate over all rows in id order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.dimension)
    }

    /// The flat row-major buffer.
    #[inline]
    #[must_use]
    pub fn as_flat(&self) -> &[f32] {
        &self.data
    }
}
