/// Disk image signatures, record offsets and device geometry

/// Size of a device block in bytes
pub const BLOCK_SIZE: u64 = 512;

/// Driver descriptor record signature, 'ER'
pub const DEVICE_SIGNATURE: u16 = 0x4552;

/// Partition map entry signature, 'PM'
pub const PARTITION_SIGNATURE: u16 = 0x504D;

/// HFS boot block signature, 'LK' (bootable volume)
pub const BOOT_SIGNATURE: u16 = 0x4C4B;

/// HFS master directory block signature, 'BD'
pub const HFS_SIGNATURE: u16 = 0x4244;

/// HFS+ volume header signature, 'H+'
pub const HFSPLUS_SIGNATURE: u16 = 0x482B;

/// Offset of the master directory block / volume header within a volume
/// (logical block 2)
pub const MDB_OFFSET: u64 = 0x400;

/// Offset of the volume-attributes word within the master directory block
pub const MDB_ATTRIBUTE_OFFSET: u64 = MDB_OFFSET + 10;

/// Hardware-lock bit in the HFS volume attributes word
pub const HARDWARE_LOCK_BIT: u16 = 7;

/// Software-lock bit in the HFS volume attributes word
pub const SOFTWARE_LOCK_BIT: u16 = 15;

/// Maximum length of an HFS volume name (Pascal string)
pub const VOLUME_NAME_MAX: usize = 27;

/// Partition type string of an HFS volume partition
pub const PARTITION_TYPE_HFS: &str = "Apple_HFS";

/// Partition type string of the partition map's own entry
pub const PARTITION_TYPE_MAP: &str = "Apple_partition_map";

/// Partition type string of the SCSI driver partition
pub const PARTITION_TYPE_DRIVER43: &str = "Apple_Driver43";

// Geometry of a synthesized device image. The descriptor, partition map and
// driver occupy the first 0xC000 bytes, followed by the HFS volume data.
// Emulator firmware expects these values exactly.

/// Offset of the first partition map entry
pub const PARTITION_MAP_OFFSET: u64 = 0x200;

/// Offset of the driver partition map entry
pub const DRIVER_ENTRY_OFFSET: u64 = 0x400;

/// Offset of the HFS partition map entry
pub const HFS_ENTRY_OFFSET: u64 = 0x600;

/// Offset of the driver binary
pub const DRIVER_DATA_OFFSET: u64 = 0x8000;

/// Offset of the embedded HFS volume data
pub const EMBEDDED_VOLUME_OFFSET: u64 = 0xC000;

/// First block of the driver partition
pub const DRIVER_START_BLOCK: u32 = 64;

/// Driver size in blocks as declared by the driver descriptor record
pub const DRIVER_DESCRIPTOR_BLOCKS: u16 = 19;

/// Size of the driver partition in blocks
pub const DRIVER_PARTITION_BLOCKS: u32 = 32;

/// Number of blocks in the synthesized partition map
pub const MAP_BLOCK_COUNT: u32 = 3;

/// Size of the partition map's own partition in blocks
pub const MAP_PARTITION_BLOCKS: u32 = 63;

/// First block of the HFS partition
pub const HFS_START_BLOCK: u32 = 96;

/// Status flags of the partition map's own entry
pub const MAP_PARTITION_STATUS: u32 = 0x37;

/// Status flags of the driver partition entry
pub const DRIVER_PARTITION_STATUS: u32 = 0x7F;

/// Status flags of a writable HFS partition entry
pub const HFS_STATUS_WRITABLE: u32 = 0xB7;

/// Status flags of a read-only HFS partition entry
pub const HFS_STATUS_READ_ONLY: u32 = 0x97;

/// Operating system type of a MacOS driver
pub const MACOS_DRIVER_TYPE: u16 = 1;

/// Processor type string of the driver partition entry
pub const DRIVER_PROCESSOR: &str = "68000";

/// Stored checksum of the embedded driver binary (16-bit value in a
/// 32-bit field)
pub const DRIVER_BOOT_CHECKSUM: u32 = 0x0000_F624;

/// Fixed bytes written into the reserved tail of the driver partition
/// entry, as (index, value) pairs into the reserved area. Boot firmware
/// rejects the image without them; their meaning is undocumented.
pub const DRIVER_ENTRY_PAD: [(usize, u8); 4] = [(1, 0x01), (2, 0x06), (11, 0x01), (13, 0x07)];

/// Chunk size for streaming volume data
pub const COPY_CHUNK_SIZE: usize = 256 * 1024;
