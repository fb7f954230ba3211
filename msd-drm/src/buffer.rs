use crate::{DrmError, Result, simd};

/// Growable byte storage for one media file, padded so that windows rounded up
/// to a vector lane multiple always stay inside allocated, zero filled memory.
///
/// The buffer tracks a logical `origin`: everything before it is consumed
/// header, everything from it up to the logical length is payload. All offsets
/// taken by the methods below are relative to the origin. The origin only
/// advances and never exceeds the logical length.
///
/// Not internally synchronized. A buffer is owned by exactly one session.
#[derive(Debug)]
pub struct MediaBuffer {
    data: Vec<u8>,
    len: usize,
    origin: usize,
}

const SCRATCH_RESERVE: usize = 0x1000; // 4 KiB reserved

impl MediaBuffer {
    /// Takes ownership of raw file bytes, reserving scratch space for tag
    /// rewrites growing the file.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let len = data.len();
        let mut buffer = Self {
            data,
            len: 0,
            origin: 0,
        };
        buffer.set_len_reserving(len);
        buffer
    }

    /// Logical payload length, from the origin to the end.
    pub fn len(&self) -> usize {
        self.len - self.origin
    }

    pub fn is_empty(&self) -> bool {
        self.len == self.origin
    }

    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Moves the origin to `origin` bytes from the start of the raw file. The
    /// origin is monotonic and bounded by the logical length.
    pub fn set_origin(&mut self, origin: usize) -> Result<()> {
        if origin < self.origin || origin > self.len {
            return Err(DrmError::OutOfBounds {
                offset: origin as u64,
                len: self.len,
            });
        }
        self.origin = origin;
        Ok(())
    }

    /// Advances the origin past `count` payload bytes.
    pub fn advance_origin(&mut self, count: usize) -> Result<()> {
        self.set_origin(self.origin + count)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.origin..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data[self.origin..self.len]
    }

    /// Bounds checked view of `length` payload bytes starting at `start`.
    pub fn span(&self, start: usize, length: usize) -> Result<&[u8]> {
        let from = self.origin + start;
        if start > self.len() || length > self.len - from {
            return Err(DrmError::OutOfBounds {
                offset: start as u64,
                len: self.len(),
            });
        }
        Ok(&self.data[from..from + length])
    }

    /// Mutable window from `start` to the end of the payload, with its length
    /// rounded up to the next lane multiple. The padding bytes past the logical
    /// length are zero and are never part of the payload.
    pub fn padded_span(&mut self, start: usize) -> Result<&mut [u8]> {
        if start > self.len() {
            return Err(DrmError::OutOfBounds {
                offset: start as u64,
                len: self.len(),
            });
        }
        let from = self.origin + start;
        let padded = simd::padded_len(self.len - from);
        Ok(&mut self.data[from..from + padded])
    }

    /// Sets the logical payload length. Shrinking re-zeroes the abandoned
    /// region so padding reads stay deterministic.
    pub fn set_len(&mut self, length: usize) {
        self.resize_absolute(self.origin + length, 0);
    }

    /// Like [`MediaBuffer::set_len`] but reserving extra scratch capacity for
    /// expected growth.
    pub fn set_len_reserving(&mut self, length: usize) {
        self.resize_absolute(self.origin + length, SCRATCH_RESERVE);
    }

    /// Appends bytes at the end of the payload.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        let end = self.len;
        self.resize_absolute(end + bytes.len(), 0);
        self.data[end..end + bytes.len()].copy_from_slice(bytes);
    }

    /// Replaces the whole payload, keeping the origin.
    pub fn replace_payload(&mut self, bytes: &[u8]) {
        self.set_len_reserving(bytes.len());
        self.as_mut_slice().copy_from_slice(bytes);
    }

    /// Consumes the buffer and returns the payload alone.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.data.truncate(self.len);
        if self.origin > 0 {
            self.data.drain(..self.origin);
        }
        self.data
    }

    fn resize_absolute(&mut self, len: usize, reserve: usize) {
        if len < self.len {
            self.data[len..self.len].fill(0);
        }
        let physical = len + simd::LANES - 1 + reserve;
        if physical > self.data.len() {
            self.data.resize(physical, 0);
        }
        self.len = len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::LANES;

    #[test]
    fn from_vec_keeps_payload() {
        let buffer = MediaBuffer::from_vec(vec![1, 2, 3, 4]);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn origin_is_monotonic() {
        let mut buffer = MediaBuffer::from_vec(vec![0; 16]);
        buffer.set_origin(8).unwrap();
        assert_eq!(buffer.len(), 8);
        assert!(buffer.set_origin(4).is_err());
        assert!(buffer.set_origin(17).is_err());
        buffer.advance_origin(8).unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn padded_span_is_lane_aligned_and_zero_padded() {
        let mut buffer = MediaBuffer::from_vec(vec![0xff; LANES + 3]);
        buffer.set_origin(1).unwrap();

        let span = buffer.padded_span(0).unwrap();
        assert_eq!(span.len(), 2 * LANES);
        assert!(span[LANES + 2..].iter().all(|b| *b == 0));
    }

    #[test]
    fn append_grows_the_payload() {
        let mut buffer = MediaBuffer::from_vec(vec![1, 2]);
        buffer.extend_from_slice(&[3, 4, 5]);
        assert_eq!(buffer.as_slice(), &[1, 2, 3, 4, 5]);

        let span = buffer.padded_span(0).unwrap();
        assert!(span[5..].iter().all(|b| *b == 0));
    }

    #[test]
    fn span_rejects_out_of_bounds() {
        let buffer = MediaBuffer::from_vec(vec![0; 8]);
        assert!(buffer.span(0, 8).is_ok());
        assert!(matches!(
            buffer.span(4, 5),
            Err(DrmError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn shrinking_re_zeroes_padding() {
        let mut buffer = MediaBuffer::from_vec(vec![0xaa; 64]);
        buffer.set_len(16);
        let span = buffer.padded_span(0).unwrap();
        assert!(span[16..].iter().all(|b| *b == 0));
    }

    #[test]
    fn into_vec_drops_consumed_header() {
        let mut buffer = MediaBuffer::from_vec(vec![9, 9, 1, 2, 3]);
        buffer.set_origin(2).unwrap();
        assert_eq!(buffer.into_vec(), vec![1, 2, 3]);
    }
}
