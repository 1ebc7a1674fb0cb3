/// Conversion engine
///
/// Extracts the HFS volume found in a source image to a raw volume
/// image, or wraps it into a freshly synthesized Apple Partition Map
/// device image with an embedded driver partition. Either way the
/// volume bytes are streamed in fixed-size chunks and the lock bits of
/// the destination volume are patched in place afterwards.
///
/// A failed conversion leaves the partially written destination file
/// behind; callers are expected to treat the output as unusable.

use crate::driver::APPLE_DRIVER43;
use crate::error::Result;
use crate::format::constants::*;
use crate::format::ImageKind;
use crate::io::reader::{read_u16_at, stream_len};
use crate::io::writer::{write_bytes_at, write_u16_at};
use crate::probe::{locate_volume, PartitionExtent};
use crate::record::{DriverDescriptorRecord, PartitionMapEntry};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Outcome of a successful conversion
#[derive(Debug, Clone)]
pub struct ConversionReport {
    /// Classification of the source image
    pub kind: ImageKind,
    /// Size of the source file in bytes
    pub input_size: u64,
    /// Extent of the HFS volume found in the source
    pub volume: PartitionExtent,
    /// Size of the destination file in bytes
    pub bytes_written: u64,
}

/// Set or clear the hardware- and software-lock bits of the volume
/// starting at `volume_offset` in `file`
pub fn patch_volume_lock<F>(file: &mut F, volume_offset: u64, writable: bool) -> Result<()>
where
    F: Read + Write + Seek,
{
    let attr_offset = volume_offset + MDB_ATTRIBUTE_OFFSET;
    let mut attrs = read_u16_at(file, attr_offset)?;
    if writable {
        attrs &= !(1 << HARDWARE_LOCK_BIT);
        attrs &= !(1 << SOFTWARE_LOCK_BIT);
    } else {
        attrs |= 1 << HARDWARE_LOCK_BIT;
        attrs |= 1 << SOFTWARE_LOCK_BIT;
    }
    write_u16_at(file, attr_offset, attrs)
}

/// Stream `length` bytes of volume data from `src` to `dst` and patch
/// the destination volume's lock bits.
///
/// Data moves in 256 KiB chunks; `progress` receives the completed
/// fraction in [0, 1] after each chunk. Any short read or write aborts
/// the copy.
pub fn copy_volume_data<W, R, F>(
    dst: &mut W,
    src: &mut R,
    read_start: u64,
    write_start: u64,
    length: u64,
    writable: bool,
    mut progress: F,
) -> Result<()>
where
    W: Read + Write + Seek,
    R: Read + Seek,
    F: FnMut(f64),
{
    let mut buf = vec![0u8; COPY_CHUNK_SIZE];
    src.seek(SeekFrom::Start(read_start))?;
    dst.seek(SeekFrom::Start(write_start))?;
    let mut remaining = length;
    while remaining > 0 {
        let chunk = remaining.min(COPY_CHUNK_SIZE as u64) as usize;
        src.read_exact(&mut buf[..chunk])?;
        dst.write_all(&buf[..chunk])?;
        remaining -= chunk as u64;
        progress((length - remaining) as f64 / length as f64);
    }
    patch_volume_lock(dst, write_start, writable)
}

fn device_descriptor(volume_length: u64) -> DriverDescriptorRecord {
    let total_bytes = EMBEDDED_VOLUME_OFFSET + volume_length;
    DriverDescriptorRecord {
        signature: DEVICE_SIGNATURE,
        block_size: BLOCK_SIZE as u16,
        block_count: (total_bytes / BLOCK_SIZE) as u32,
        device_type: 1,
        device_id: 1,
        data: 0,
        driver_count: 1,
        driver_block: DRIVER_START_BLOCK,
        driver_size: DRIVER_DESCRIPTOR_BLOCKS,
        driver_os_type: MACOS_DRIVER_TYPE,
    }
}

fn map_entry() -> PartitionMapEntry {
    let mut pme = PartitionMapEntry {
        signature: PARTITION_SIGNATURE,
        map_block_count: MAP_BLOCK_COUNT,
        start_block: 1,
        block_count: MAP_PARTITION_BLOCKS,
        data_count: MAP_PARTITION_BLOCKS,
        status: MAP_PARTITION_STATUS,
        ..Default::default()
    };
    pme.set_name("Apple");
    pme.set_partition_type(PARTITION_TYPE_MAP);
    pme
}

fn driver_entry() -> PartitionMapEntry {
    let mut pme = PartitionMapEntry {
        signature: PARTITION_SIGNATURE,
        map_block_count: MAP_BLOCK_COUNT,
        start_block: DRIVER_START_BLOCK,
        block_count: DRIVER_PARTITION_BLOCKS,
        data_count: DRIVER_PARTITION_BLOCKS,
        status: DRIVER_PARTITION_STATUS,
        boot_size: APPLE_DRIVER43.len() as u32,
        boot_checksum: DRIVER_BOOT_CHECKSUM,
        ..Default::default()
    };
    pme.set_name("Macintosh");
    pme.set_partition_type(PARTITION_TYPE_DRIVER43);
    pme.set_processor(DRIVER_PROCESSOR);
    // firmware rejects the image without these reserved-area bytes
    for (index, value) in DRIVER_ENTRY_PAD {
        pme.pad[index] = value;
    }
    pme
}

fn hfs_entry(volume_length: u64, writable: bool) -> PartitionMapEntry {
    let blocks = (volume_length / BLOCK_SIZE) as u32;
    let mut pme = PartitionMapEntry {
        signature: PARTITION_SIGNATURE,
        map_block_count: MAP_BLOCK_COUNT,
        start_block: HFS_START_BLOCK,
        block_count: blocks,
        data_count: blocks,
        status: if writable {
            HFS_STATUS_WRITABLE
        } else {
            HFS_STATUS_READ_ONLY
        },
        ..Default::default()
    };
    pme.set_name("MacOS");
    pme.set_partition_type(PARTITION_TYPE_HFS);
    pme
}

/// Synthesize a complete device image around the volume at
/// `volume.offset` in `src`.
///
/// Writes the driver descriptor record, a three-entry partition map,
/// the embedded driver binary at its fixed offset, and finally the
/// volume data at 0xC000 followed by the lock-bit patch.
pub fn write_device_image<W, R, F>(
    dst: &mut W,
    src: &mut R,
    volume: &PartitionExtent,
    writable: bool,
    progress: F,
) -> Result<()>
where
    W: Read + Write + Seek,
    R: Read + Seek,
    F: FnMut(f64),
{
    write_bytes_at(dst, 0, &device_descriptor(volume.length).encode())?;
    write_bytes_at(dst, PARTITION_MAP_OFFSET, &map_entry().encode())?;
    write_bytes_at(dst, DRIVER_ENTRY_OFFSET, &driver_entry().encode())?;
    write_bytes_at(dst, HFS_ENTRY_OFFSET, &hfs_entry(volume.length, writable).encode())?;
    write_bytes_at(dst, DRIVER_DATA_OFFSET, APPLE_DRIVER43)?;
    copy_volume_data(
        dst,
        src,
        volume.offset,
        EMBEDDED_VOLUME_OFFSET,
        volume.length,
        writable,
        progress,
    )
}

/// Convert a disk image file.
///
/// Locates the HFS volume in `src_path` and writes it to `dst_path`,
/// either wrapped in a synthesized device image (`to_device_image`) or
/// as a bare volume. `writable` selects the state of the destination's
/// lock bits. The destination is created or truncated; on failure any
/// partial output is left in place.
pub fn convert<P, Q, F>(
    to_device_image: bool,
    src_path: P,
    dst_path: Q,
    writable: bool,
    progress: F,
) -> Result<ConversionReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    F: FnMut(f64),
{
    let mut src = File::open(src_path)?;
    let (kind, volume) = locate_volume(&mut src)?;
    let input_size = stream_len(&mut src)?;
    let mut dst = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(dst_path)?;
    if to_device_image {
        write_device_image(&mut dst, &mut src, &volume, writable, progress)?;
    } else {
        copy_volume_data(&mut dst, &mut src, volume.offset, 0, volume.length, writable, progress)?;
    }
    let bytes_written = stream_len(&mut dst)?;
    Ok(ConversionReport {
        kind,
        input_size,
        volume,
        bytes_written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::constants::HFS_SIGNATURE;
    use std::io::Cursor;

    /// A minimal bare HFS volume: MDB signature at 0x400, attributes
    /// initially zero
    fn bare_volume(blocks: u64) -> Vec<u8> {
        let mut image = vec![0u8; (blocks * BLOCK_SIZE) as usize];
        image[0x400..0x402].copy_from_slice(&HFS_SIGNATURE.to_be_bytes());
        image
    }

    #[test]
    fn test_patch_volume_lock_sets_and_clears() {
        let mut cur = Cursor::new(bare_volume(8));
        patch_volume_lock(&mut cur, 0, false).unwrap();
        let attrs = read_u16_at(&mut cur, MDB_ATTRIBUTE_OFFSET).unwrap();
        assert_eq!(attrs, (1 << HARDWARE_LOCK_BIT) | (1 << SOFTWARE_LOCK_BIT));
        patch_volume_lock(&mut cur, 0, true).unwrap();
        assert_eq!(read_u16_at(&mut cur, MDB_ATTRIBUTE_OFFSET).unwrap(), 0);
    }

    #[test]
    fn test_patch_preserves_other_attribute_bits() {
        let mut image = bare_volume(8);
        image[0x40A..0x40C].copy_from_slice(&0x0100u16.to_be_bytes());
        let mut cur = Cursor::new(image);
        patch_volume_lock(&mut cur, 0, false).unwrap();
        let attrs = read_u16_at(&mut cur, MDB_ATTRIBUTE_OFFSET).unwrap();
        assert_eq!(attrs, 0x0100 | (1 << HARDWARE_LOCK_BIT) | (1 << SOFTWARE_LOCK_BIT));
    }

    #[test]
    fn test_copy_reports_progress() {
        let src_data = bare_volume(2048); // 1 MiB, four chunks
        let mut src = Cursor::new(src_data);
        let mut dst = Cursor::new(Vec::new());
        let mut reports = Vec::new();
        copy_volume_data(&mut dst, &mut src, 0, 0, 2048 * BLOCK_SIZE, true, |p| {
            reports.push(p)
        })
        .unwrap();
        assert_eq!(reports.len(), 4);
        assert_eq!(reports[0], 0.25);
        assert_eq!(*reports.last().unwrap(), 1.0);
    }

    #[test]
    fn test_copy_short_source_fails() {
        let mut src = Cursor::new(vec![0u8; 1024]);
        let mut dst = Cursor::new(Vec::new());
        let result = copy_volume_data(&mut dst, &mut src, 0, 0, 4096, true, |_| {});
        assert!(result.is_err());
    }

    #[test]
    fn test_device_descriptor_geometry() {
        let ddr = device_descriptor(32768);
        assert_eq!(ddr.signature, DEVICE_SIGNATURE);
        assert_eq!(ddr.block_size, 512);
        assert_eq!(u64::from(ddr.block_count) * BLOCK_SIZE, 0xC000 + 32768);
        assert_eq!(ddr.driver_block, 64);
        assert_eq!(ddr.driver_size, 19);
    }

    #[test]
    fn test_driver_entry_fixed_fields() {
        let pme = driver_entry();
        assert_eq!(pme.name(), "Macintosh");
        assert_eq!(pme.partition_type(), "Apple_Driver43");
        assert_eq!(pme.processor(), "68000");
        assert_eq!(pme.boot_checksum, DRIVER_BOOT_CHECKSUM);
        assert_eq!(pme.boot_size as usize, APPLE_DRIVER43.len());
        assert_eq!(pme.pad[1], 0x01);
        assert_eq!(pme.pad[2], 0x06);
        assert_eq!(pme.pad[11], 0x01);
        assert_eq!(pme.pad[13], 0x07);
    }

    #[test]
    fn test_hfs_entry_status_flags() {
        assert_eq!(hfs_entry(32768, true).status, 0xB7);
        assert_eq!(hfs_entry(32768, false).status, 0x97);
        assert_eq!(hfs_entry(32768, true).block_count, 64);
    }

    #[test]
    fn test_write_device_image_layout() {
        let volume = bare_volume(64);
        let mut src = Cursor::new(volume.clone());
        let mut dst = Cursor::new(Vec::new());
        let extent = PartitionExtent {
            offset: 0,
            length: 64 * BLOCK_SIZE,
            truncated: false,
        };
        write_device_image(&mut dst, &mut src, &extent, true, |_| {}).unwrap();
        let out = dst.into_inner();
        assert_eq!(out.len(), 0xC000 + 64 * 512);
        assert_eq!(&out[0..2], &[0x45, 0x52]);
        assert_eq!(&out[0x200..0x202], &[0x50, 0x4D]);
        assert_eq!(&out[0x400..0x402], &[0x50, 0x4D]);
        assert_eq!(&out[0x600..0x602], &[0x50, 0x4D]);
        assert_eq!(&out[0x8000..0x8000 + APPLE_DRIVER43.len()], APPLE_DRIVER43);
        // volume data lands at 0xC000 with its signature intact
        assert_eq!(&out[0xC400..0xC402], &HFS_SIGNATURE.to_be_bytes());
    }
}
