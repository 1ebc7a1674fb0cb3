/// Driver descriptor record (device block 0)

use crate::error::Result;
use crate::io::reader::read_bytes_at;
use crate::record::{be_u16, be_u32, put_u16, put_u32};
use std::io::{Read, Seek};

/// First 512 bytes of a partitioned device.
///
/// Carries the device signature ('ER'), the device geometry, and the
/// location of the boot driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverDescriptorRecord {
    /// Device signature (0x4552 'ER' for a partitioned device)
    pub signature: u16,
    /// Block size of the device, usually 512
    pub block_size: u16,
    /// Number of blocks on the device
    pub block_count: u32,
    /// Device type (reserved)
    pub device_type: u16,
    /// Device id (reserved)
    pub device_id: u16,
    /// Reserved
    pub data: u32,
    /// Number of driver descriptor entries
    pub driver_count: u16,
    /// First driver's starting block
    pub driver_block: u32,
    /// Size of the driver in 512-byte blocks
    pub driver_size: u16,
    /// Operating system type of the driver (MacOS = 1)
    pub driver_os_type: u16,
}

impl DriverDescriptorRecord {
    /// Size of the record on disk
    pub const SIZE: usize = 512;

    /// Decode a record from its on-disk bytes
    pub fn parse(buf: &[u8; Self::SIZE]) -> Self {
        Self {
            signature: be_u16(buf, 0),
            block_size: be_u16(buf, 2),
            block_count: be_u32(buf, 4),
            device_type: be_u16(buf, 8),
            device_id: be_u16(buf, 10),
            data: be_u32(buf, 12),
            driver_count: be_u16(buf, 16),
            driver_block: be_u32(buf, 18),
            driver_size: be_u16(buf, 22),
            driver_os_type: be_u16(buf, 24),
        }
    }

    /// Read and decode a record at `offset`.
    ///
    /// Performs no signature validation; that is the caller's
    /// responsibility.
    pub fn read_at<R: Read + Seek>(r: &mut R, offset: u64) -> Result<Self> {
        let buf: [u8; Self::SIZE] = read_bytes_at(r, offset)?;
        Ok(Self::parse(&buf))
    }

    /// Encode the record into its on-disk bytes
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        put_u16(&mut buf, 0, self.signature);
        put_u16(&mut buf, 2, self.block_size);
        put_u32(&mut buf, 4, self.block_count);
        put_u16(&mut buf, 8, self.device_type);
        put_u16(&mut buf, 10, self.device_id);
        put_u32(&mut buf, 12, self.data);
        put_u16(&mut buf, 16, self.driver_count);
        put_u32(&mut buf, 18, self.driver_block);
        put_u16(&mut buf, 22, self.driver_size);
        put_u16(&mut buf, 24, self.driver_os_type);
        buf
    }

    /// Declared device size in bytes, or 0 when unspecified
    pub fn device_size(&self) -> u64 {
        u64::from(self.block_size) * u64::from(self.block_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_encode_layout() {
        let ddr = DriverDescriptorRecord {
            signature: 0x4552,
            block_size: 512,
            block_count: 160,
            device_type: 1,
            device_id: 1,
            data: 0,
            driver_count: 1,
            driver_block: 64,
            driver_size: 19,
            driver_os_type: 1,
        };
        let buf = ddr.encode();
        assert_eq!(&buf[0..2], &[0x45, 0x52]);
        assert_eq!(&buf[2..4], &[0x02, 0x00]);
        assert_eq!(&buf[4..8], &[0x00, 0x00, 0x00, 0xA0]);
        assert_eq!(&buf[18..22], &[0x00, 0x00, 0x00, 0x40]);
        assert_eq!(&buf[22..24], &[0x00, 0x13]);
        // reserved tail stays zero
        assert!(buf[26..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_parse_round_trip() {
        let ddr = DriverDescriptorRecord {
            signature: 0x4552,
            block_size: 512,
            block_count: 0x0001_0000,
            driver_count: 1,
            driver_block: 64,
            driver_size: 19,
            driver_os_type: 1,
            ..Default::default()
        };
        assert_eq!(DriverDescriptorRecord::parse(&ddr.encode()), ddr);
    }

    #[test]
    fn test_read_at() {
        let mut image = vec![0u8; 1024];
        image[512..514].copy_from_slice(&[0x45, 0x52]);
        image[514..516].copy_from_slice(&[0x02, 0x00]);
        let mut cur = Cursor::new(image);
        let ddr = DriverDescriptorRecord::read_at(&mut cur, 512).unwrap();
        assert_eq!(ddr.signature, 0x4552);
        assert_eq!(ddr.block_size, 512);
        assert_eq!(ddr.device_size(), 0);
    }

    #[test]
    fn test_read_truncated_fails() {
        let mut cur = Cursor::new(vec![0u8; 100]);
        assert!(DriverDescriptorRecord::read_at(&mut cur, 0).is_err());
    }
}
