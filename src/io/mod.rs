/// Positioned I/O primitives for image files

/// Positioned big-endian reads
pub mod reader;
/// Positioned writes
pub mod writer;

pub use reader::{read_bytes_at, read_u16_at, read_u32_at, read_vec_at, stream_len};
pub use writer::{write_bytes_at, write_u16_at};
