//! Word-level arithmetic mirrored by the animations: the scenes narrate the
//! x86 instructions of a Mastermind solver, and the on-screen values are
//! computed with these helpers rather than hard-coded.

/// `rorb %cl, %bl`: rotates only the low byte of `value` right by `count`
/// bits, leaving the upper three bytes untouched.
pub fn rorb(value: u32, count: u32) -> u32 {
    let count = count % 8;
    let byte = value & 0xFF;
    let rotated = ((byte >> count) | (byte << (8 - count))) & 0xFF;
    (value & !0xFF) | rotated
}

/// `rorl $count, %reg`: 32-bit rotate right.
pub fn rorl(value: u32, count: u32) -> u32 {
    value.rotate_right(count)
}

/// Number of exact position matches between two packed combinations: the
/// popcount of their bitwise AND, one set bit per matching symbol slot.
pub fn exact_matches(guess: u32, secret: u32) -> u32 {
    (guess & secret).count_ones()
}

/// Shannon entropy of a uniform distribution over `n` outcomes, in bits.
pub fn entropy_bits(n: u64) -> f64 {
    if n <= 1 { 0.0 } else { (n as f64).log2() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rorb_rotates_only_low_byte() {
        // 0b10000000 ror 3 = 0b00010000
        assert_eq!(rorb(0xAABB_CC80, 3), 0xAABB_CC10);
        assert_eq!(rorb(0x0000_0001, 1), 0x0000_0080);
        assert_eq!(rorb(0x1234_5600, 5), 0x1234_5600);
    }

    #[test]
    fn rorb_count_wraps_mod_8() {
        assert_eq!(rorb(0x42, 8), 0x42);
        assert_eq!(rorb(0x42, 11), rorb(0x42, 3));
    }

    #[test]
    fn rorl_is_full_register_rotate() {
        assert_eq!(rorl(0x8010_2040, 8), 0x4080_1020);
        assert_eq!(rorl(0x0000_0001, 1), 0x8000_0000);
    }

    #[test]
    fn exact_matches_counts_and_popcount() {
        // Three aligned symbol bits out of four.
        assert_eq!(exact_matches(0x80A0_2040, 0x8010_2040), 3);
        assert_eq!(exact_matches(0xFFFF_FFFF, 0x0000_0000), 0);
    }

    #[test]
    fn entropy_of_full_candidate_set() {
        assert!((entropy_bits(1296) - 10.34).abs() < 0.01);
        assert_eq!(entropy_bits(1), 0.0);
    }
}
