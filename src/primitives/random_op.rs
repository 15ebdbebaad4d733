/// Evaluates the random-math table entry selected by `op mod 11`.
///
/// All arithmetic is wrapping 32-bit unsigned. Op 10's expression is
/// evaluated exactly as specified: when `b & 15 == 0` the right operand of
/// the `|` reduces to `b << 16`.
pub fn random_op(a: u32, b: u32, op: u32) -> u32 {
    match op % 11 {
        0 => a.wrapping_add(b),
        1 => a.wrapping_mul(b),
        2 => a.wrapping_sub(b),
        3 => a ^ b,
        4 => a.rotate_left(b & 31),
        5 => a.rotate_right(b & 31),
        6 => a & b,
        7 => a | b,
        8 => a.leading_zeros().wrapping_add(b.leading_zeros()),
        9 => a.count_ones().wrapping_add(b.count_ones()),
        10 => (a >> (b & 15)) | (b << (16 - (b & 15))),
        _ => unreachable!("op mod 11 is always in 0..11"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_op10_zero_shift() {
        // b == 0 drives (b & 15) == 0, so the right operand becomes b << 16.
        assert_eq!(random_op(0, 0, 10), 0);
        assert_eq!(random_op(7, 0, 10), 7);
    }

    #[test]
    fn op10_nonzero_shift_matches_formula() {
        let a = 0xABCDu32;
        let b = 6u32;
        let expected = (a >> (b & 15)) | (b << (16 - (b & 15)));
        assert_eq!(random_op(a, b, 10), expected);
    }

    #[test]
    fn add_and_mul_wrap() {
        assert_eq!(random_op(u32::MAX, 1, 0), 0);
        assert_eq!(random_op(u32::MAX, 2, 1), u32::MAX.wrapping_mul(2));
    }

    #[test]
    fn rotations_match_index() {
        assert_eq!(random_op(1, 4, 4), 1u32.rotate_left(4));
        assert_eq!(random_op(1, 4, 5), 1u32.rotate_right(4));
    }

    #[test]
    fn index_wraps_modulo_11() {
        assert_eq!(random_op(3, 2, 0), random_op(3, 2, 11));
    }
}
