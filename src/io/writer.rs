/// Positioned writes

use crate::error::Result;
use std::io::{Seek, SeekFrom, Write};

/// Write `bytes` at `offset`
pub fn write_bytes_at<W: Write + Seek>(w: &mut W, offset: u64, bytes: &[u8]) -> Result<()> {
    w.seek(SeekFrom::Start(offset))?;
    w.write_all(bytes)?;
    Ok(())
}

/// Write a big-endian u16 at `offset`
pub fn write_u16_at<W: Write + Seek>(w: &mut W, offset: u64, value: u16) -> Result<()> {
    write_bytes_at(w, offset, &value.to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::reader::read_u16_at;
    use std::io::Cursor;

    #[test]
    fn test_write_u16_at() {
        let mut cur = Cursor::new(vec![0u8; 8]);
        write_u16_at(&mut cur, 4, 0x504D).unwrap();
        assert_eq!(read_u16_at(&mut cur, 4).unwrap(), 0x504D);
        assert_eq!(read_u16_at(&mut cur, 0).unwrap(), 0);
    }

    #[test]
    fn test_write_extends_stream() {
        let mut cur = Cursor::new(Vec::new());
        write_bytes_at(&mut cur, 512, &[0xAB; 4]).unwrap();
        let data = cur.into_inner();
        assert_eq!(data.len(), 516);
        assert_eq!(&data[512..], &[0xAB; 4]);
        // the gap is zero-filled
        assert!(data[..512].iter().all(|&b| b == 0));
    }
}
