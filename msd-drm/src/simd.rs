//! Lane width and padding helpers shared by the buffer and the mask ciphers.

/// Bytes covered by one vector lane on the target. Buffers reserve `LANES - 1`
/// bytes past their logical length so a read rounded up to a lane multiple
/// never leaves allocated memory.
#[cfg(target_feature = "avx2")]
pub(crate) const LANES: usize = 32;
#[cfg(not(target_feature = "avx2"))]
pub(crate) const LANES: usize = 16;

/// Rounds `len` up to the next multiple of [`LANES`].
pub(crate) fn padded_len(len: usize) -> usize {
    len.div_ceil(LANES) * LANES
}

/// Copies `src` to the start of `dst`, then tiles `src` from its first byte
/// until `dst` is full. The result indexes identically to `src[i % src.len()]`
/// for every `i` in `dst`.
pub(crate) fn pad_circularly(src: &[u8], dst: &mut [u8]) {
    assert!(!src.is_empty() && dst.len() >= src.len());

    dst[..src.len()].copy_from_slice(src);
    let mut copied = src.len();
    while copied < dst.len() {
        let n = src.len().min(dst.len() - copied);
        dst.copy_within(..n, copied);
        copied += n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_len_rounds_up() {
        assert_eq!(padded_len(0), 0);
        assert_eq!(padded_len(1), LANES);
        assert_eq!(padded_len(LANES), LANES);
        assert_eq!(padded_len(LANES + 1), 2 * LANES);
    }

    #[test]
    fn circular_padding_matches_modular_indexing() {
        let key = [0x11, 0x22, 0x33];
        let mut dst = [0u8; 2 * LANES];
        pad_circularly(&key, &mut dst);

        for (i, byte) in dst.iter().enumerate() {
            assert_eq!(*byte, key[i % key.len()]);
        }
    }

}
