/// Locating HFS volumes inside image files

use crate::error::{ImageError, Result};
use crate::format::constants::*;
use crate::format::{classify, ImageKind};
use crate::io::reader::{read_u16_at, stream_len};
use crate::record::{DriverDescriptorRecord, PartitionMapEntry};
use std::io::{Read, Seek};

/// Byte extent of a located partition or volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionExtent {
    /// Byte offset of the first block
    pub offset: u64,
    /// Length in bytes
    pub length: u64,
    /// Was the declared length reduced to fit inside the file?
    pub truncated: bool,
}

impl PartitionExtent {
    /// Byte offset just past the extent
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Walk the partition map and return every entry with its byte offset.
///
/// The map starts at block 1 and ends at the first block that fails to
/// read or whose signature is not 'PM'. The scan advances one 512-byte
/// block per entry regardless of the map's declared block count.
pub fn walk_partitions<R: Read + Seek>(r: &mut R) -> Vec<(u64, PartitionMapEntry)> {
    let mut entries = Vec::new();
    let mut entry_offset = BLOCK_SIZE;
    loop {
        let pme = match PartitionMapEntry::read_at(r, entry_offset) {
            Ok(pme) if pme.is_valid() => pme,
            _ => break,
        };
        entries.push((entry_offset, pme));
        entry_offset += BLOCK_SIZE;
    }
    entries
}

/// Find the first partition of type `wanted_type` and return its byte
/// extent.
///
/// A partition whose start lies beyond the end of the file is a corrupt
/// image. A partition that merely extends past the end of the file has
/// its length truncated downward in whole 512-byte blocks until it
/// fits; the returned extent is flagged accordingly.
pub fn locate_partition<R: Read + Seek>(
    r: &mut R,
    file_size: u64,
    wanted_type: &str,
) -> Result<PartitionExtent> {
    let mut entry_offset = BLOCK_SIZE;
    loop {
        let pme = match PartitionMapEntry::read_at(r, entry_offset) {
            Ok(pme) if pme.is_valid() => pme,
            _ => break,
        };
        if pme.partition_type() == wanted_type {
            let offset = u64::from(pme.start_block) * BLOCK_SIZE;
            let mut length = u64::from(pme.block_count) * BLOCK_SIZE;
            if offset > file_size {
                return Err(ImageError::corrupt(
                    entry_offset,
                    format!(
                        "partition starts at {} but the file is only {} bytes",
                        offset, file_size
                    ),
                ));
            }
            let mut truncated = false;
            while length >= BLOCK_SIZE && offset + length > file_size {
                length -= BLOCK_SIZE;
                truncated = true;
            }
            return Ok(PartitionExtent {
                offset,
                length,
                truncated,
            });
        }
        entry_offset += BLOCK_SIZE;
    }
    Err(ImageError::PartitionNotFound(wanted_type.to_string()))
}

/// Read the volume signature word at offset 0x400, collapsing read
/// failures and non-HFS values to zero
pub fn secondary_volume_signature<R: Read + Seek>(r: &mut R) -> u16 {
    match read_u16_at(r, MDB_OFFSET) {
        Ok(sig) if sig == HFS_SIGNATURE || sig == HFSPLUS_SIGNATURE => sig,
        _ => 0,
    }
}

/// Classify an image file from its device descriptor and secondary
/// volume signature
pub fn classify_image<R: Read + Seek>(r: &mut R) -> Result<ImageKind> {
    let ddr = DriverDescriptorRecord::read_at(r, 0)?;
    let volume_sig = secondary_volume_signature(r);
    classify(ddr.signature, volume_sig).ok_or(ImageError::UnrecognizedFormat {
        signature: ddr.signature,
    })
}

/// Find the HFS volume in an image file.
///
/// A partitioned device delegates to the partition map prober; a bare
/// volume spans the whole file.
pub fn locate_volume<R: Read + Seek>(r: &mut R) -> Result<(ImageKind, PartitionExtent)> {
    let file_size = stream_len(r)?;
    let kind = classify_image(r)?;
    let extent = if kind.is_partitioned() {
        locate_partition(r, file_size, PARTITION_TYPE_HFS)?
    } else {
        PartitionExtent {
            offset: 0,
            length: file_size,
            truncated: false,
        }
    };
    Ok((kind, extent))
}
