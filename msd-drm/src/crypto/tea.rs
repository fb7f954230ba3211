const DELTA: u32 = 0x9e3779b9;

/// Tiny Encryption Algorithm with a configurable even round count, as used by
/// the Tencent key wrapping scheme. Block values are read big endian.
pub(crate) struct Tea {
    key: [u32; 4],
    rounds: u32,
}

impl Tea {
    pub(crate) fn new(key: &[u8; 16], rounds: u32) -> Self {
        debug_assert!(rounds % 2 == 0);

        Self {
            key: [
                u32::from_be_bytes([key[0], key[1], key[2], key[3]]),
                u32::from_be_bytes([key[4], key[5], key[6], key[7]]),
                u32::from_be_bytes([key[8], key[9], key[10], key[11]]),
                u32::from_be_bytes([key[12], key[13], key[14], key[15]]),
            ],
            rounds,
        }
    }

    pub(crate) fn decrypt_block(&self, block: &mut [u8]) {
        debug_assert!(block.len() >= 8);

        let mut vl = u32::from_be_bytes([block[0], block[1], block[2], block[3]]);
        let mut vh = u32::from_be_bytes([block[4], block[5], block[6], block[7]]);

        let mut sum = DELTA.wrapping_mul(self.rounds / 2);

        for _ in 0..self.rounds / 2 {
            vh = vh.wrapping_sub(
                ((vl << 4).wrapping_add(self.key[2]))
                    ^ vl.wrapping_add(sum)
                    ^ ((vl >> 5).wrapping_add(self.key[3])),
            );
            vl = vl.wrapping_sub(
                ((vh << 4).wrapping_add(self.key[0]))
                    ^ vh.wrapping_add(sum)
                    ^ ((vh >> 5).wrapping_add(self.key[1])),
            );
            sum = sum.wrapping_sub(DELTA);
        }

        block[..4].copy_from_slice(&vl.to_be_bytes());
        block[4..8].copy_from_slice(&vh.to_be_bytes());
    }

    /// Forward direction, used to wrap keys when building test files.
    #[cfg(test)]
    pub(crate) fn encrypt_block(&self, block: &mut [u8]) {
        debug_assert!(block.len() >= 8);

        let mut vl = u32::from_be_bytes([block[0], block[1], block[2], block[3]]);
        let mut vh = u32::from_be_bytes([block[4], block[5], block[6], block[7]]);

        let mut sum = 0u32;

        for _ in 0..self.rounds / 2 {
            sum = sum.wrapping_add(DELTA);
            vl = vl.wrapping_add(
                ((vh << 4).wrapping_add(self.key[0]))
                    ^ vh.wrapping_add(sum)
                    ^ ((vh >> 5).wrapping_add(self.key[1])),
            );
            vh = vh.wrapping_add(
                ((vl << 4).wrapping_add(self.key[2]))
                    ^ vl.wrapping_add(sum)
                    ^ ((vl >> 5).wrapping_add(self.key[3])),
            );
        }

        block[..4].copy_from_slice(&vl.to_be_bytes());
        block[4..8].copy_from_slice(&vh.to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrypts_reference_vector() {
        // Published TEA vector: all zero key and plaintext, 32 cycles.
        let tea = Tea::new(&[0; 16], 64);
        let mut block = [0x41, 0xea, 0x3a, 0x0a, 0x94, 0xba, 0xa9, 0x40];
        tea.decrypt_block(&mut block);
        assert_eq!(block, [0; 8]);
    }

    #[test]
    fn round_trips_with_reduced_rounds() {
        let tea = Tea::new(b"0123456789abcdef", 32);
        let mut block = *b"\x01\x23\x45\x67\x89\xab\xcd\xef";
        tea.encrypt_block(&mut block);
        assert_ne!(block, *b"\x01\x23\x45\x67\x89\xab\xcd\xef");
        tea.decrypt_block(&mut block);
        assert_eq!(block, *b"\x01\x23\x45\x67\x89\xab\xcd\xef");
    }
}
