/// Driver checksum computation
///
/// The boot firmware validates a driver partition by folding every byte
/// of the driver binary into a 16-bit rotating checksum. The algorithm
/// must match the legacy one exactly or real machines and emulators will
/// refuse to load the driver.

use crate::error::Result;
use crate::io::reader::read_vec_at;
use std::io::{Read, Seek};

/// Compute the 16-bit rotating checksum over `bytes`.
///
/// A final value of zero is replaced by 0xFFFF, so the result is never
/// zero for any input.
pub fn checksum16(bytes: &[u8]) -> u16 {
    let mut cksum: u16 = 0;
    for &b in bytes {
        cksum = cksum.wrapping_add(u16::from(b)).rotate_left(1);
    }
    if cksum == 0 {
        0xFFFF
    } else {
        cksum
    }
}

/// Compute the driver checksum over `length` bytes at `offset`
pub fn file_checksum16<R: Read + Seek>(r: &mut R, offset: u64, length: usize) -> Result<u16> {
    let bytes = read_vec_at(r, offset, length)?;
    Ok(checksum16(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    #[test]
    fn test_empty_input() {
        assert_eq!(checksum16(&[]), 0xFFFF);
    }

    #[test]
    fn test_all_zero_input_is_never_zero() {
        for len in [1, 2, 16, 512, 9728] {
            assert_eq!(checksum16(&vec![0u8; len]), 0xFFFF);
        }
    }

    #[test]
    fn test_known_values() {
        // single byte: (0 + b) rotated left once
        assert_eq!(checksum16(&[0x01]), 0x0002);
        assert_eq!(checksum16(&[0x80]), 0x0100);
        // rotation carries the high bit around
        assert_eq!(checksum16(&[0xFF; 2]), 0x05FA);
    }

    #[test]
    fn test_file_checksum_matches_slice() {
        let data: Vec<u8> = (0..=255).cycle().take(2048).map(|b: u16| b as u8).collect();
        let mut cur = Cursor::new(data.clone());
        assert_eq!(
            file_checksum16(&mut cur, 512, 1024).unwrap(),
            checksum16(&data[512..1536])
        );
    }

    #[test]
    fn test_file_checksum_short_range_fails() {
        let mut cur = Cursor::new(vec![0u8; 100]);
        assert!(file_checksum16(&mut cur, 50, 100).is_err());
    }

    proptest! {
        #[test]
        fn prop_deterministic(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
            prop_assert_eq!(checksum16(&data), checksum16(&data));
        }

        #[test]
        fn prop_never_zero(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
            prop_assert_ne!(checksum16(&data), 0);
        }

        #[test]
        fn prop_byte_flip_changes_result(
            data in proptest::collection::vec(any::<u8>(), 1..512),
            index in any::<prop::sample::Index>(),
            flip in 1u8..=255,
        ) {
            let mut flipped = data.clone();
            let i = index.index(flipped.len());
            flipped[i] ^= flip;
            prop_assert_ne!(checksum16(&data), checksum16(&flipped));
        }
    }
}
