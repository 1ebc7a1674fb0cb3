/*!
# macimage

A Rust library for inspecting and converting classic Macintosh disk images.

## Features

- Decode the Apple Partition Map and HFS/HFS+ volume records at their
  exact on-disk byte layout
- Locate the HFS volume inside a device image or bare volume file
- Extract a volume to a raw image, or wrap it into a synthesized APM
  device image with a bootable driver partition, for use in emulators
- Verify driver partitions with the legacy 16-bit rotating checksum
- Human-readable image reports with verbose detail

## Quick Start

```rust,no_run
use std::fs::File;
use macimage::{convert, describe_file, locate_volume};

// Print a report about an image file
describe_file("System 7.5.3.dmg", false)?;

// Find the HFS volume inside an image
let mut file = File::open("System 7.5.3.dmg")?;
let (kind, extent) = locate_volume(&mut file)?;
println!("{} at offset {}, {} bytes", kind.name(), extent.offset, extent.length);

// Convert to a writable device image for Basilisk/SheepShaver/QEMU
convert(true, "System 7.5.3.dmg", "System753.iso", true, |_progress| {})?;
# Ok::<(), macimage::ImageError>(())
```

## Image formats

A file is recognized as one of:

- An Apple Partition Map device image (signature 'ER' at offset 0)
- A bootable bare HFS volume (boot block signature 'LK')
- A non-bootable bare HFS/HFS+ volume (zero signature at offset 0 with
  a valid volume signature at offset 0x400)

## Modules

- `format`: image classification, signatures and layout constants
- `record`: the fixed-layout on-disk records
- `probe`: partition map walking and volume location
- `convert`: extraction and device image synthesis
- `checksum`: driver checksum computation
- `describe`: human-readable reports
- `map`: partition layout visualization
- `io`: positioned read/write primitives
- `error`: error types and Result alias
*/

#![warn(missing_docs)]

/// Driver checksum computation
pub mod checksum;
/// Conversion engine
pub mod convert;
/// Human-readable reports
pub mod describe;
/// Embedded driver binary
pub mod driver;
/// Error types and Result alias
pub mod error;
/// Image classification and format constants
pub mod format;
/// Positioned I/O primitives
pub mod io;
/// Partition layout visualization
pub mod map;
/// Volume location
pub mod probe;
/// On-disk record definitions
pub mod record;

// Re-export common types
pub use checksum::{checksum16, file_checksum16};
pub use convert::{convert, copy_volume_data, patch_volume_lock, write_device_image, ConversionReport};
pub use describe::{describe_file, describe_image, DateFormatter, UtcDateFormatter};
pub use driver::APPLE_DRIVER43;
pub use error::{ImageError, Result};
pub use format::{classify, ImageKind};
pub use map::draw_partition_map;
pub use probe::{
    classify_image, locate_partition, locate_volume, walk_partitions, PartitionExtent,
};
pub use record::{
    BootBlockHeader, DriverDescriptorRecord, MasterDirectoryBlock, PartitionMapEntry, VolumeHeader,
};
