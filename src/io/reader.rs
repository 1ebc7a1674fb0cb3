/// Positioned big-endian reads

use crate::error::Result;
use std::io::{Read, Seek, SeekFrom};

/// Read exactly `N` bytes at `offset`.
///
/// A seek failure or short read fails the whole operation; partial
/// records never succeed.
pub fn read_bytes_at<const N: usize, R: Read + Seek>(r: &mut R, offset: u64) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    r.seek(SeekFrom::Start(offset))?;
    r.read_exact(&mut buf)?;
    Ok(buf)
}

/// Read exactly `length` bytes at `offset` into a vector
pub fn read_vec_at<R: Read + Seek>(r: &mut R, offset: u64, length: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; length];
    r.seek(SeekFrom::Start(offset))?;
    r.read_exact(&mut buf)?;
    Ok(buf)
}

/// Read a big-endian u16 at `offset`
pub fn read_u16_at<R: Read + Seek>(r: &mut R, offset: u64) -> Result<u16> {
    let buf: [u8; 2] = read_bytes_at(r, offset)?;
    Ok(u16::from_be_bytes(buf))
}

/// Read a big-endian u32 at `offset`
pub fn read_u32_at<R: Read + Seek>(r: &mut R, offset: u64) -> Result<u32> {
    let buf: [u8; 4] = read_bytes_at(r, offset)?;
    Ok(u32::from_be_bytes(buf))
}

/// Total length of a seekable stream in bytes
pub fn stream_len<R: Seek>(r: &mut R) -> Result<u64> {
    Ok(r.seek(SeekFrom::End(0))?)
}
