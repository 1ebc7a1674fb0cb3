/// Embedded driver binary for synthesized device images

/// Driver binary written into the Apple_Driver43 partition of a
/// synthesized device image. 19 blocks, matching the size declared by
/// the driver descriptor record.
pub static APPLE_DRIVER43: &[u8] = include_bytes!("apple_driver43.bin");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::checksum16;
    use crate::format::constants::{BLOCK_SIZE, DRIVER_BOOT_CHECKSUM, DRIVER_DESCRIPTOR_BLOCKS};

    #[test]
    fn test_driver_length_matches_descriptor() {
        assert_eq!(
            APPLE_DRIVER43.len() as u64,
            u64::from(DRIVER_DESCRIPTOR_BLOCKS) * BLOCK_SIZE
        );
    }

    #[test]
    fn test_driver_checksum_matches_stored_value() {
        assert_eq!(u32::from(checksum16(APPLE_DRIVER43)), DRIVER_BOOT_CHECKSUM);
    }
}
