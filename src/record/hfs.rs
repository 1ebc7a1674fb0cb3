/// HFS boot block, master directory block and HFS+ volume header

use crate::error::Result;
use crate::format::constants::{BOOT_SIGNATURE, VOLUME_NAME_MAX};
use crate::io::reader::read_bytes_at;
use crate::record::{be_u16, be_u32, be_u64, field};
use std::io::{Read, Seek};

/// Classic boot block header at the start of an HFS volume.
///
/// The signature is 0x4C4B 'LK' on a bootable volume and zero
/// otherwise. The seven file name fields are Pascal strings inside
/// 16-byte slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootBlockHeader {
    /// Signature bytes
    pub signature: u16,
    /// Entry point to boot code (a 68K BRA.S instruction)
    pub entry: u32,
    /// Flag byte and boot block version number
    pub version: u16,
    /// Used internally
    pub page_flags: u16,
    /// System filename, usually "System"
    pub system_name: [u8; 16],
    /// Finder filename, usually "Finder"
    pub shell_name: [u8; 16],
    /// First debugger filename
    pub debugger1_name: [u8; 16],
    /// Second debugger filename
    pub debugger2_name: [u8; 16],
    /// Startup screen filename
    pub screen_name: [u8; 16],
    /// Startup program filename
    pub hello_name: [u8; 16],
    /// System scrap filename
    pub scrap_name: [u8; 16],
    /// Number of FCBs to allocate
    pub fcb_count: u16,
    /// Number of event queue elements
    pub event_queue_size: u16,
    /// System heap size on a 128K machine
    pub heap_128k: u32,
    /// Used internally
    pub heap_256k: u32,
    /// System heap size on machines with 512K or more
    pub system_heap_size: u32,
    /// Reserved
    pub filler: u16,
    /// Minimum additional system heap space
    pub system_heap_extra: u32,
    /// Fraction of RAM available for the system heap
    pub system_heap_fraction: u32,
}

impl BootBlockHeader {
    /// Size of the header on disk
    pub const SIZE: usize = 148;

    /// Decode a header from its on-disk bytes
    pub fn parse(buf: &[u8; Self::SIZE]) -> Self {
        Self {
            signature: be_u16(buf, 0),
            entry: be_u32(buf, 2),
            version: be_u16(buf, 6),
            page_flags: be_u16(buf, 8),
            system_name: field(buf, 10),
            shell_name: field(buf, 26),
            debugger1_name: field(buf, 42),
            debugger2_name: field(buf, 58),
            screen_name: field(buf, 74),
            hello_name: field(buf, 90),
            scrap_name: field(buf, 106),
            fcb_count: be_u16(buf, 122),
            event_queue_size: be_u16(buf, 124),
            heap_128k: be_u32(buf, 126),
            heap_256k: be_u32(buf, 130),
            system_heap_size: be_u32(buf, 134),
            filler: be_u16(buf, 138),
            system_heap_extra: be_u32(buf, 140),
            system_heap_fraction: be_u32(buf, 144),
        }
    }

    /// Read and decode a header at `offset`
    pub fn read_at<R: Read + Seek>(r: &mut R, offset: u64) -> Result<Self> {
        let buf: [u8; Self::SIZE] = read_bytes_at(r, offset)?;
        Ok(Self::parse(&buf))
    }

    /// Does the volume carry boot code?
    pub fn is_bootable(&self) -> bool {
        self.signature == BOOT_SIGNATURE
    }
}

/// HFS master directory block at volume offset 0x400.
///
/// Also called the volume information block. The signature is 0x4244
/// 'BD'; dates count seconds since 1904-01-01 UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterDirectoryBlock {
    /// Volume signature
    pub signature: u16,
    /// Date and time of volume creation
    pub create_date: u32,
    /// Date and time of last modification
    pub modify_date: u32,
    /// Volume attributes (bit 7 hardware lock, bit 15 software lock)
    pub attributes: u16,
    /// Number of files in the root directory
    pub root_file_count: u16,
    /// First block of the volume bitmap
    pub bitmap_start: u16,
    /// Start of the next allocation search
    pub alloc_search_start: u16,
    /// Number of allocation blocks in the volume
    pub alloc_block_count: u16,
    /// Allocation block size in bytes
    pub alloc_block_size: u32,
    /// Default clump size
    pub clump_size: u32,
    /// First allocation block in the volume
    pub first_alloc_block: u16,
    /// Next unused catalog node ID
    pub next_cnid: u32,
    /// Number of unused allocation blocks
    pub free_blocks: u16,
    /// Volume name as a Pascal string, zero-padded
    pub volume_name: [u8; 28],
    /// Date and time of last backup
    pub backup_date: u32,
    /// Volume backup sequence number
    pub backup_seq: u16,
    /// Volume write count
    pub write_count: u32,
    /// Clump size for the extents overflow file
    pub extents_clump_size: u32,
    /// Clump size for the catalog file
    pub catalog_clump_size: u32,
    /// Number of directories in the root directory
    pub root_dir_count: u16,
    /// Number of files in the volume
    pub file_count: u32,
    /// Number of directories in the volume
    pub dir_count: u32,
    /// Information used by the Finder
    pub finder_info: [u32; 8],
    /// Size in blocks of the volume cache
    pub cache_size: u16,
    /// Size in blocks of the volume bitmap cache
    pub bitmap_cache_size: u16,
    /// Size in blocks of the common volume cache
    pub common_cache_size: u16,
    /// Size of the extents overflow file
    pub extents_overflow_size: u32,
    /// First extent record of the extents overflow file
    pub extents_overflow_rec: [u8; 12],
    /// Size of the catalog file
    pub catalog_size: u32,
    /// First extent record of the catalog file
    pub catalog_rec: [u8; 12],
}

impl MasterDirectoryBlock {
    /// Size of the record on disk
    pub const SIZE: usize = 162;

    /// Decode a record from its on-disk bytes
    pub fn parse(buf: &[u8; Self::SIZE]) -> Self {
        let mut finder_info = [0u32; 8];
        for (i, slot) in finder_info.iter_mut().enumerate() {
            *slot = be_u32(buf, 92 + i * 4);
        }
        Self {
            signature: be_u16(buf, 0),
            create_date: be_u32(buf, 2),
            modify_date: be_u32(buf, 6),
            attributes: be_u16(buf, 10),
            root_file_count: be_u16(buf, 12),
            bitmap_start: be_u16(buf, 14),
            alloc_search_start: be_u16(buf, 16),
            alloc_block_count: be_u16(buf, 18),
            alloc_block_size: be_u32(buf, 20),
            clump_size: be_u32(buf, 24),
            first_alloc_block: be_u16(buf, 28),
            next_cnid: be_u32(buf, 30),
            free_blocks: be_u16(buf, 34),
            volume_name: field(buf, 36),
            backup_date: be_u32(buf, 64),
            backup_seq: be_u16(buf, 68),
            write_count: be_u32(buf, 70),
            extents_clump_size: be_u32(buf, 74),
            catalog_clump_size: be_u32(buf, 78),
            root_dir_count: be_u16(buf, 82),
            file_count: be_u32(buf, 84),
            dir_count: be_u32(buf, 88),
            finder_info,
            cache_size: be_u16(buf, 124),
            bitmap_cache_size: be_u16(buf, 126),
            common_cache_size: be_u16(buf, 128),
            extents_overflow_size: be_u32(buf, 130),
            extents_overflow_rec: field(buf, 134),
            catalog_size: be_u32(buf, 146),
            catalog_rec: field(buf, 150),
        }
    }

    /// Read and decode a record at `offset`
    pub fn read_at<R: Read + Seek>(r: &mut R, offset: u64) -> Result<Self> {
        let buf: [u8; Self::SIZE] = read_bytes_at(r, offset)?;
        Ok(Self::parse(&buf))
    }

    /// Volume name decoded from its Pascal string
    pub fn volume_name(&self) -> String {
        let len = (self.volume_name[0] as usize).min(VOLUME_NAME_MAX);
        String::from_utf8_lossy(&self.volume_name[1..=len]).into_owned()
    }

    /// Volume capacity in bytes
    pub fn capacity(&self) -> u64 {
        u64::from(self.alloc_block_size) * u64::from(self.alloc_block_count)
    }

    /// Free space in bytes
    pub fn free(&self) -> u64 {
        u64::from(self.alloc_block_size) * u64::from(self.free_blocks)
    }

    /// Used space in bytes
    pub fn used(&self) -> u64 {
        self.capacity() - self.free()
    }
}

/// HFS+ volume header at volume offset 0x400.
///
/// The signature is 0x482B 'H+'. The five fork-data records that
/// follow the fields below are read as part of the record but not
/// interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeHeader {
    /// Volume signature
    pub signature: u16,
    /// Volume format version
    pub version: u16,
    /// Volume attributes
    pub attributes: u32,
    /// Implementation that last mounted the volume
    pub last_mounted_version: u32,
    /// Allocation block of the journal info block
    pub journal_info_block: u32,
    /// Date and time of volume creation
    pub create_date: u32,
    /// Date and time of last modification
    pub modify_date: u32,
    /// Date and time of last backup
    pub backup_date: u32,
    /// Date and time of last consistency check
    pub checked_date: u32,
    /// Number of files on the volume
    pub file_count: u32,
    /// Number of folders on the volume
    pub folder_count: u32,
    /// Allocation block size in bytes
    pub block_size: u32,
    /// Total number of allocation blocks
    pub total_blocks: u32,
    /// Number of unused allocation blocks
    pub free_blocks: u32,
    /// Start of the next allocation search
    pub next_allocation: u32,
    /// Default resource fork clump size
    pub resource_clump_size: u32,
    /// Default data fork clump size
    pub data_clump_size: u32,
    /// Next unused catalog node ID
    pub next_catalog_id: u32,
    /// Volume write count
    pub write_count: u32,
    /// Text encodings used on the volume
    pub encodings_bitmap: u64,
    /// Information used by the Finder
    pub finder_info: [u32; 8],
}

impl VolumeHeader {
    /// Size of the record on disk, including the fork-data records
    pub const SIZE: usize = 512;

    /// Decode a header from its on-disk bytes
    pub fn parse(buf: &[u8; Self::SIZE]) -> Self {
        let mut finder_info = [0u32; 8];
        for (i, slot) in finder_info.iter_mut().enumerate() {
            *slot = be_u32(buf, 80 + i * 4);
        }
        Self {
            signature: be_u16(buf, 0),
            version: be_u16(buf, 2),
            attributes: be_u32(buf, 4),
            last_mounted_version: be_u32(buf, 8),
            journal_info_block: be_u32(buf, 12),
            create_date: be_u32(buf, 16),
            modify_date: be_u32(buf, 20),
            backup_date: be_u32(buf, 24),
            checked_date: be_u32(buf, 28),
            file_count: be_u32(buf, 32),
            folder_count: be_u32(buf, 36),
            block_size: be_u32(buf, 40),
            total_blocks: be_u32(buf, 44),
            free_blocks: be_u32(buf, 48),
            next_allocation: be_u32(buf, 52),
            resource_clump_size: be_u32(buf, 56),
            data_clump_size: be_u32(buf, 60),
            next_catalog_id: be_u32(buf, 64),
            write_count: be_u32(buf, 68),
            encodings_bitmap: be_u64(buf, 72),
            finder_info,
        }
    }

    /// Read and decode a header at `offset`
    pub fn read_at<R: Read + Seek>(r: &mut R, offset: u64) -> Result<Self> {
        let buf: [u8; Self::SIZE] = read_bytes_at(r, offset)?;
        Ok(Self::parse(&buf))
    }

    /// Volume capacity in bytes
    pub fn capacity(&self) -> u64 {
        u64::from(self.block_size) * u64::from(self.total_blocks)
    }

    /// Free space in bytes
    pub fn free(&self) -> u64 {
        u64::from(self.block_size) * u64::from(self.free_blocks)
    }

    /// Used space in bytes
    pub fn used(&self) -> u64 {
        self.capacity() - self.free()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_block_parse() {
        let mut buf = [0u8; BootBlockHeader::SIZE];
        buf[0] = 0x4C;
        buf[1] = 0x4B;
        buf[10] = 6;
        buf[11..17].copy_from_slice(b"System");
        buf[122] = 0;
        buf[123] = 10;
        let bb = BootBlockHeader::parse(&buf);
        assert!(bb.is_bootable());
        assert_eq!(bb.fcb_count, 10);
        assert_eq!(&bb.system_name[1..7], b"System");
    }

    #[test]
    fn test_boot_block_not_bootable() {
        let bb = BootBlockHeader::parse(&[0u8; BootBlockHeader::SIZE]);
        assert!(!bb.is_bootable());
    }

    fn sample_mdb_buf() -> [u8; MasterDirectoryBlock::SIZE] {
        let mut buf = [0u8; MasterDirectoryBlock::SIZE];
        buf[0] = 0x42;
        buf[1] = 0x44;
        // 1600 allocation blocks of 1024 bytes, 600 free
        buf[18..20].copy_from_slice(&1600u16.to_be_bytes());
        buf[20..24].copy_from_slice(&1024u32.to_be_bytes());
        buf[34..36].copy_from_slice(&600u16.to_be_bytes());
        buf[36] = 8;
        buf[37..45].copy_from_slice(b"Untitled");
        buf
    }

    #[test]
    fn test_mdb_parse() {
        let mdb = MasterDirectoryBlock::parse(&sample_mdb_buf());
        assert_eq!(mdb.signature, 0x4244);
        assert_eq!(mdb.volume_name(), "Untitled");
        assert_eq!(mdb.capacity(), 1600 * 1024);
        assert_eq!(mdb.free(), 600 * 1024);
        assert_eq!(mdb.used(), 1000 * 1024);
    }

    #[test]
    fn test_mdb_name_length_clamped() {
        let mut buf = sample_mdb_buf();
        buf[36] = 40; // longer than the field allows
        let mdb = MasterDirectoryBlock::parse(&buf);
        assert_eq!(mdb.volume_name().len(), 27);
    }

    #[test]
    fn test_volume_header_parse() {
        let mut buf = [0u8; VolumeHeader::SIZE];
        buf[0] = 0x48;
        buf[1] = 0x2B;
        buf[2..4].copy_from_slice(&4u16.to_be_bytes());
        buf[40..44].copy_from_slice(&4096u32.to_be_bytes());
        buf[44..48].copy_from_slice(&0x0010_0000u32.to_be_bytes());
        buf[48..52].copy_from_slice(&0x0008_0000u32.to_be_bytes());
        let vh = VolumeHeader::parse(&buf);
        assert_eq!(vh.signature, 0x482B);
        assert_eq!(vh.version, 4);
        assert_eq!(vh.capacity(), 4096 * 0x0010_0000);
        assert_eq!(vh.used(), vh.capacity() - vh.free());
    }
}
