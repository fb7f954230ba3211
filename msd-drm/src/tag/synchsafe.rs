/// Decodes a synch-safe integer: 28 usable bits spread over 4 bytes with the
/// top bit of each byte cleared.
pub fn decode(raw: [u8; 4]) -> u32 {
    (u32::from(raw[0] & 0x7f) << 21)
        | (u32::from(raw[1] & 0x7f) << 14)
        | (u32::from(raw[2] & 0x7f) << 7)
        | u32::from(raw[3] & 0x7f)
}

#[cfg(test)]
mod tests {
    use super::decode;

    #[test]
    fn decodes_seven_bit_groups() {
        assert_eq!(decode([0, 0, 0, 0]), 0);
        assert_eq!(decode([0, 0, 0x02, 0x01]), 0x101);
        assert_eq!(decode([0x7f, 0x7f, 0x7f, 0x7f]), 0x0fff_ffff);
    }

    #[test]
    fn ignores_the_reserved_top_bits() {
        assert_eq!(decode([0x80, 0x80, 0x82, 0x81]), 0x101);
    }
}
