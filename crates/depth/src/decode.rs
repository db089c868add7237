use thiserror::Error;

use crate::resolution::{infer_resolution, Resolution};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("depth blob has odd length {len}, expected 16-bit samples")]
    OddLength { len: usize },

    #[error("cannot determine depth resolution for {num_pixels} pixels")]
    UnknownResolution { num_pixels: usize },
}

/// Row-major grid of 16-bit depth samples in millimetres; 0 marks no return.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthGrid {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u16>,
}

impl DepthGrid {
    pub fn new(width: usize, height: usize, data: Vec<u16>) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "depth data must have width * height samples"
        );
        Self {
            width,
            height,
            data,
        }
    }

    /// Sample at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> u16 {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.data[y * self.width + x]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of non-zero samples.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|&&d| d != 0).count()
    }
}

/// Decode a headerless little-endian u16 blob, inferring its shape from the
/// sample count.
pub fn decode_depth(bytes: &[u8]) -> Result<(DepthGrid, Resolution), DecodeError> {
    if bytes.len() % 2 != 0 {
        return Err(DecodeError::OddLength { len: bytes.len() });
    }

    let num_pixels = bytes.len() / 2;
    let res = infer_resolution(num_pixels)?;

    let data: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();

    Ok((DepthGrid::new(res.width, res.height, data), res))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::ResolutionSource;

    fn blob(samples: &[u16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn decodes_known_resolution_row_major() {
        let mut samples = vec![0u16; 160 * 120];
        samples[0] = 7;
        samples[159] = 8;
        samples[160] = 9;
        let (grid, res) = decode_depth(&blob(&samples)).unwrap();
        assert_eq!((grid.width, grid.height), (160, 120));
        assert_eq!(res.source, ResolutionSource::Table { ambiguous: false });
        assert_eq!(grid.get(0, 0), 7);
        assert_eq!(grid.get(159, 0), 8);
        assert_eq!(grid.get(0, 1), 9);
    }

    #[test]
    fn samples_are_little_endian() {
        let bytes = blob(&[0x1234; 12]);
        assert_eq!(bytes[0], 0x34);
        let (grid, _) = decode_depth(&bytes).unwrap();
        assert_eq!((grid.width, grid.height), (4, 3));
        assert!(grid.data.iter().all(|&d| d == 0x1234));
    }

    #[test]
    fn odd_length_is_rejected() {
        assert_eq!(
            decode_depth(&[0u8; 3]),
            Err(DecodeError::OddLength { len: 3 })
        );
    }

    #[test]
    fn empty_blob_is_unresolved() {
        assert_eq!(
            decode_depth(&[]),
            Err(DecodeError::UnknownResolution { num_pixels: 0 })
        );
    }

    #[test]
    fn unresolvable_blob_is_rejected() {
        let bytes = vec![0u8; 7919 * 2];
        assert!(matches!(
            decode_depth(&bytes),
            Err(DecodeError::UnknownResolution { num_pixels: 7919 })
        ));
    }

    #[test]
    fn valid_count_skips_zero_samples() {
        let grid = DepthGrid::new(2, 2, vec![0, 1, 0, 5000]);
        assert_eq!(grid.valid_count(), 2);
    }
}
