/// Image classification and format constants

/// Format constants
pub mod constants;

pub use constants::*;

/// Classification of a disk image file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Apple Partition Map device image
    PartitionedDevice,
    /// Bare HFS/HFS+ volume with boot code
    BootableVolume,
    /// Bare HFS/HFS+ volume without boot code
    PlainVolume,
}

impl ImageKind {
    /// Get a human-readable name for this image kind
    pub fn name(&self) -> &'static str {
        match self {
            ImageKind::PartitionedDevice => "Apple Partition Map disk image",
            ImageKind::BootableVolume => "Apple HFS volume image (bootable)",
            ImageKind::PlainVolume => "Apple HFS volume image (not bootable)",
        }
    }

    /// Does the image carry a partition map?
    pub fn is_partitioned(&self) -> bool {
        matches!(self, ImageKind::PartitionedDevice)
    }
}

/// Classify an image from its device signature at offset 0 and the
/// volume signature found at offset 0x400 (0 when absent).
///
/// A bare volume is recognized either by boot code ('LK') or by a zero
/// device signature combined with a valid HFS/HFS+ volume signature.
pub fn classify(device_signature: u16, volume_signature: u16) -> Option<ImageKind> {
    if device_signature == DEVICE_SIGNATURE {
        Some(ImageKind::PartitionedDevice)
    } else if device_signature == BOOT_SIGNATURE {
        Some(ImageKind::BootableVolume)
    } else if device_signature == 0
        && (volume_signature == HFS_SIGNATURE || volume_signature == HFSPLUS_SIGNATURE)
    {
        Some(ImageKind::PlainVolume)
    } else {
        None
    }
}
