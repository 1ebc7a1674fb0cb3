/// Partition map entry

use crate::error::Result;
use crate::format::constants::PARTITION_SIGNATURE;
use crate::io::reader::read_bytes_at;
use crate::record::{be_u16, be_u32, field, put_str, put_u16, put_u32, trimmed};
use std::io::{Read, Seek};

/// One 512-byte entry of an Apple Partition Map.
///
/// The map is a contiguous run of entries starting at block 1; it ends
/// at the first block whose signature is not 'PM'. Entries describing
/// driver partitions additionally carry the boot code location, load
/// and entry addresses, and a stored checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionMapEntry {
    /// Partition signature (0x504D 'PM')
    pub signature: u16,
    /// Reserved
    pub signature_pad: u16,
    /// Number of blocks in the partition map
    pub map_block_count: u32,
    /// First physical block of the partition
    pub start_block: u32,
    /// Number of blocks in the partition
    pub block_count: u32,
    /// Partition name, null-padded
    pub name: [u8; 32],
    /// Partition type string, null-padded ("Apple_" names are reserved)
    pub partition_type: [u8; 32],
    /// First logical block of the data area
    pub data_start: u32,
    /// Number of blocks in the data area
    pub data_count: u32,
    /// Partition status flags
    pub status: u32,
    /// First logical block of boot code
    pub boot_start: u32,
    /// Size of boot code in bytes
    pub boot_size: u32,
    /// Boot code load address
    pub boot_load_addr: u32,
    /// Reserved
    pub boot_load_addr2: u32,
    /// Boot code entry point
    pub boot_entry: u32,
    /// Reserved
    pub boot_entry2: u32,
    /// Boot code checksum (16-bit value stored in 32 bits)
    pub boot_checksum: u32,
    /// Processor type string, null-padded
    pub processor: [u8; 16],
    /// Reserved tail
    pub pad: [u8; 376],
}

impl Default for PartitionMapEntry {
    fn default() -> Self {
        Self {
            signature: 0,
            signature_pad: 0,
            map_block_count: 0,
            start_block: 0,
            block_count: 0,
            name: [0; 32],
            partition_type: [0; 32],
            data_start: 0,
            data_count: 0,
            status: 0,
            boot_start: 0,
            boot_size: 0,
            boot_load_addr: 0,
            boot_load_addr2: 0,
            boot_entry: 0,
            boot_entry2: 0,
            boot_checksum: 0,
            processor: [0; 16],
            pad: [0; 376],
        }
    }
}

impl PartitionMapEntry {
    /// Size of the record on disk
    pub const SIZE: usize = 512;

    /// Decode an entry from its on-disk bytes
    pub fn parse(buf: &[u8; Self::SIZE]) -> Self {
        Self {
            signature: be_u16(buf, 0),
            signature_pad: be_u16(buf, 2),
            map_block_count: be_u32(buf, 4),
            start_block: be_u32(buf, 8),
            block_count: be_u32(buf, 12),
            name: field(buf, 16),
            partition_type: field(buf, 48),
            data_start: be_u32(buf, 80),
            data_count: be_u32(buf, 84),
            status: be_u32(buf, 88),
            boot_start: be_u32(buf, 92),
            boot_size: be_u32(buf, 96),
            boot_load_addr: be_u32(buf, 100),
            boot_load_addr2: be_u32(buf, 104),
            boot_entry: be_u32(buf, 108),
            boot_entry2: be_u32(buf, 112),
            boot_checksum: be_u32(buf, 116),
            processor: field(buf, 120),
            pad: field(buf, 136),
        }
    }

    /// Read and decode an entry at `offset`, without validating the
    /// signature
    pub fn read_at<R: Read + Seek>(r: &mut R, offset: u64) -> Result<Self> {
        let buf: [u8; Self::SIZE] = read_bytes_at(r, offset)?;
        Ok(Self::parse(&buf))
    }

    /// Encode the entry into its on-disk bytes
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        put_u16(&mut buf, 0, self.signature);
        put_u16(&mut buf, 2, self.signature_pad);
        put_u32(&mut buf, 4, self.map_block_count);
        put_u32(&mut buf, 8, self.start_block);
        put_u32(&mut buf, 12, self.block_count);
        buf[16..48].copy_from_slice(&self.name);
        buf[48..80].copy_from_slice(&self.partition_type);
        put_u32(&mut buf, 80, self.data_start);
        put_u32(&mut buf, 84, self.data_count);
        put_u32(&mut buf, 88, self.status);
        put_u32(&mut buf, 92, self.boot_start);
        put_u32(&mut buf, 96, self.boot_size);
        put_u32(&mut buf, 100, self.boot_load_addr);
        put_u32(&mut buf, 104, self.boot_load_addr2);
        put_u32(&mut buf, 108, self.boot_entry);
        put_u32(&mut buf, 112, self.boot_entry2);
        put_u32(&mut buf, 116, self.boot_checksum);
        buf[120..136].copy_from_slice(&self.processor);
        buf[136..512].copy_from_slice(&self.pad);
        buf
    }

    /// Is the signature the expected 'PM'?
    pub fn is_valid(&self) -> bool {
        self.signature == PARTITION_SIGNATURE
    }

    /// Partition name as a string
    pub fn name(&self) -> String {
        trimmed(&self.name)
    }

    /// Partition type as a string
    pub fn partition_type(&self) -> String {
        trimmed(&self.partition_type)
    }

    /// Processor type as a string
    pub fn processor(&self) -> String {
        trimmed(&self.processor)
    }

    /// Set the partition name
    pub fn set_name(&mut self, name: &str) {
        put_str(&mut self.name, name);
    }

    /// Set the partition type
    pub fn set_partition_type(&mut self, partition_type: &str) {
        put_str(&mut self.partition_type, partition_type);
    }

    /// Set the processor type
    pub fn set_processor(&mut self, processor: &str) {
        put_str(&mut self.processor, processor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> PartitionMapEntry {
        let mut pme = PartitionMapEntry {
            signature: PARTITION_SIGNATURE,
            map_block_count: 3,
            start_block: 96,
            block_count: 64,
            data_count: 64,
            status: 0xB7,
            ..Default::default()
        };
        pme.set_name("MacOS");
        pme.set_partition_type("Apple_HFS");
        pme
    }

    #[test]
    fn test_encode_layout() {
        let buf = sample_entry().encode();
        assert_eq!(&buf[0..2], &[0x50, 0x4D]);
        assert_eq!(&buf[4..8], &[0x00, 0x00, 0x00, 0x03]);
        assert_eq!(&buf[8..12], &[0x00, 0x00, 0x00, 0x60]);
        assert_eq!(&buf[12..16], &[0x00, 0x00, 0x00, 0x40]);
        assert_eq!(&buf[16..21], b"MacOS");
        assert_eq!(buf[21], 0);
        assert_eq!(&buf[48..57], b"Apple_HFS");
        assert_eq!(&buf[88..92], &[0x00, 0x00, 0x00, 0xB7]);
    }

    #[test]
    fn test_parse_round_trip() {
        let pme = sample_entry();
        assert_eq!(PartitionMapEntry::parse(&pme.encode()), pme);
    }

    #[test]
    fn test_string_accessors() {
        let pme = sample_entry();
        assert_eq!(pme.name(), "MacOS");
        assert_eq!(pme.partition_type(), "Apple_HFS");
        assert_eq!(pme.processor(), "");
        assert!(pme.is_valid());
    }

    #[test]
    fn test_invalid_signature() {
        let pme = PartitionMapEntry::default();
        assert!(!pme.is_valid());
    }
}
