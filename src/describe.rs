/// Human-readable reports for disk image files
///
/// Everything here is a thin presentation layer over the probing and
/// record-reading operations; nothing is cached and nothing is written.

use crate::checksum::file_checksum16;
use crate::error::Result;
use crate::format::constants::*;
use crate::format::classify;
use crate::io::reader::stream_len;
use crate::probe::{secondary_volume_signature, walk_partitions};
use crate::record::{
    BootBlockHeader, DriverDescriptorRecord, MasterDirectoryBlock, PartitionMapEntry, VolumeHeader,
};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// ANSI color codes for status markers
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
}

const VERIFIED: &str = "\u{2714} VERIFIED";
const FAILED: &str = "\u{2716} VERIFY FAILED";
const TRUNCATED: &str = "\u{2716} TRUNCATED";

/// Renders an HFS date (seconds since 1904-01-01 UTC) as text.
///
/// Keeps the reporting layer independent of any particular date
/// library; callers can substitute their own formatting.
pub trait DateFormatter {
    /// Format a timestamp for display
    fn format_date(&self, seconds_since_1904: u32) -> String;
}

/// Default formatter producing `YYYY-MM-DD HH:MM:SS UTC`
pub struct UtcDateFormatter;

/// Seconds between 1904-01-01 and 1970-01-01
const HFS_EPOCH_TO_UNIX: i64 = 2_082_844_800;

impl DateFormatter for UtcDateFormatter {
    fn format_date(&self, seconds_since_1904: u32) -> String {
        let unix = i64::from(seconds_since_1904) - HFS_EPOCH_TO_UNIX;
        let days = unix.div_euclid(86_400);
        let secs = unix.rem_euclid(86_400);
        let (year, month, day) = civil_from_days(days);
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
            year,
            month,
            day,
            secs / 3600,
            (secs / 60) % 60,
            secs % 60
        )
    }
}

/// Convert days since 1970-01-01 to a (year, month, day) civil date
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

fn tabprint(tab: usize, line: &str) {
    println!("{}{}", "    ".repeat(tab), line);
}

/// Render a signature word as its two ASCII characters
fn signature_chars(signature: u16) -> String {
    signature
        .to_be_bytes()
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() {
                b as char
            } else {
                '.'
            }
        })
        .collect()
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Describe the disk image file at `path` on standard output
pub fn describe_file<P: AsRef<Path>>(path: P, verbose: bool) -> Result<()> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mut file = File::open(path)?;
    let file_size = stream_len(&mut file)?;
    describe_image(&mut file, file_size, &name, verbose, &UtcDateFormatter)
}

/// Describe an open disk image on standard output
pub fn describe_image<R: Read + Seek>(
    r: &mut R,
    file_size: u64,
    name: &str,
    verbose: bool,
    dates: &dyn DateFormatter,
) -> Result<()> {
    tabprint(0, &format!("Checking file \"{}\"", name));
    tabprint(0, &format!("File size: {} bytes", file_size));

    let ddr = DriverDescriptorRecord::read_at(r, 0)?;
    let volume_sig = secondary_volume_signature(r);

    if ddr.signature == DEVICE_SIGNATURE && verbose {
        let device_size = ddr.device_size();
        if device_size > 0 {
            let marker = if device_size > file_size {
                format!(" {}{}{}", colors::RED, TRUNCATED, colors::RESET)
            } else {
                String::new()
            };
            tabprint(0, &format!("Device size: {} bytes{}", device_size, marker));
        } else {
            tabprint(0, "Device size: (not specified)");
        }
        tabprint(
            0,
            &format!(
                "Device signature: {:#06x} '{}'",
                ddr.signature,
                signature_chars(ddr.signature)
            ),
        );
    }

    match classify(ddr.signature, volume_sig) {
        Some(kind) => {
            tabprint(0, &format!("File format: {}", kind.name()));
            if kind.is_partitioned() {
                describe_partition_map(r, file_size, 1, verbose, dates);
            } else {
                describe_volume(r, 0, 1, verbose, dates);
            }
        }
        None => {
            tabprint(0, "File is not a recognized disk image format.");
            tabprint(
                0,
                "Currently this utility only recognizes raw HFS or Apple Partition Map format.",
            );
        }
    }
    Ok(())
}

fn describe_partition_map<R: Read + Seek>(
    r: &mut R,
    file_size: u64,
    tab: usize,
    verbose: bool,
    dates: &dyn DateFormatter,
) {
    for (index, (_, pme)) in walk_partitions(r).into_iter().enumerate() {
        let offset = u64::from(pme.start_block) * BLOCK_SIZE;
        let length = u64::from(pme.block_count) * BLOCK_SIZE;
        let partition_type = pme.partition_type();

        println!();
        tabprint(
            tab,
            &format!("Partition {}: {} ({})", index, pme.name(), partition_type),
        );
        let marker = if offset + length > file_size {
            format!(" {}{}{}", colors::RED, TRUNCATED, colors::RESET)
        } else {
            String::new()
        };
        tabprint(
            tab + 1,
            &format!(
                "Size: {} bytes (offset {} to {}){}",
                length,
                offset,
                offset + length,
                marker
            ),
        );

        if partition_type.starts_with("Apple_Driver") {
            describe_driver(r, &pme, offset, tab + 1);
        }
        if partition_type == PARTITION_TYPE_HFS {
            describe_volume(r, offset, tab + 1, verbose, dates);
        }
    }
}

fn describe_driver<R: Read + Seek>(r: &mut R, pme: &PartitionMapEntry, offset: u64, tab: usize) {
    tabprint(
        tab,
        &format!(
            "Code: {} bytes (offset {} in file)",
            pme.boot_size, offset
        ),
    );
    if pme.boot_checksum == 0 {
        // boot firmware only enforces the check when the partition name
        // starts with 'Maci'
        let note = if pme.name().starts_with("Maci") {
            " (driver will not load)"
        } else {
            ""
        };
        tabprint(tab, &format!("Checksum: {:#010x}{}", pme.boot_checksum, note));
        return;
    }
    match file_checksum16(r, offset, pme.boot_size as usize) {
        Ok(computed) => {
            let status = if u32::from(computed) == pme.boot_checksum {
                format!("{}{}{}", colors::GREEN, VERIFIED, colors::RESET)
            } else {
                format!("{}{}{}", colors::RED, FAILED, colors::RESET)
            };
            tabprint(
                tab,
                &format!(
                    "Checksum: {:#010x} (computed {:#010x}) {}",
                    pme.boot_checksum, computed, status
                ),
            );
        }
        Err(_) => {
            tabprint(
                tab,
                &format!(
                    "Checksum: {:#010x} (driver code unreadable) {}{}{}",
                    pme.boot_checksum,
                    colors::RED,
                    FAILED,
                    colors::RESET
                ),
            );
        }
    }
}

fn describe_volume<R: Read + Seek>(
    r: &mut R,
    offset: u64,
    tab: usize,
    verbose: bool,
    dates: &dyn DateFormatter,
) {
    let boot = match BootBlockHeader::read_at(r, offset) {
        Ok(boot) => boot,
        Err(_) => {
            tabprint(tab, "Error reading HFS boot blocks");
            return;
        }
    };
    if verbose {
        let detail = if boot.signature == 0 {
            " (non-bootable volume)".to_string()
        } else if boot.is_bootable() {
            format!(" '{}' (bootable volume)", signature_chars(boot.signature))
        } else {
            format!(" '{}' (expected 0x4c4b)", signature_chars(boot.signature))
        };
        tabprint(
            tab,
            &format!("Boot block signature: {:#06x}{}", boot.signature, detail),
        );
        tabprint(tab, &format!("Boot block version: {:#06x}", boot.version));
    }

    let mdb = match MasterDirectoryBlock::read_at(r, offset + MDB_OFFSET) {
        Ok(mdb) => mdb,
        Err(_) => {
            tabprint(tab, "Error reading volume information block");
            return;
        }
    };
    if verbose {
        let note = match mdb.signature {
            HFS_SIGNATURE => "(HFS volume)",
            HFSPLUS_SIGNATURE => "(HFS+ volume)",
            _ => "(unrecognized format)",
        };
        tabprint(
            tab,
            &format!(
                "Volume signature: {:#06x} '{}' {}",
                mdb.signature,
                signature_chars(mdb.signature),
                note
            ),
        );
    }

    if mdb.signature == HFS_SIGNATURE {
        tabprint(tab, &format!("Volume: {}", mdb.volume_name()));
        tabprint(tab, &format!("Created: {}", dates.format_date(mdb.create_date)));
        tabprint(
            tab,
            &format!("Last modified: {}", dates.format_date(mdb.modify_date)),
        );
        tabprint(
            tab,
            &format!(
                "Capacity: {:.1} MB ({} bytes)",
                megabytes(mdb.capacity()),
                mdb.capacity()
            ),
        );
        tabprint(
            tab,
            &format!("Used: {:.1} MB ({} bytes)", megabytes(mdb.used()), mdb.used()),
        );
        tabprint(
            tab,
            &format!("Free: {:.1} MB ({} bytes)", megabytes(mdb.free()), mdb.free()),
        );
    } else if mdb.signature == HFSPLUS_SIGNATURE {
        describe_plus_volume(r, offset + MDB_OFFSET, tab, dates);
    }
}

fn describe_plus_volume<R: Read + Seek>(
    r: &mut R,
    offset: u64,
    tab: usize,
    dates: &dyn DateFormatter,
) {
    let vh = match VolumeHeader::read_at(r, offset) {
        Ok(vh) => vh,
        Err(_) => {
            tabprint(tab, "Error reading HFS+ volume header");
            return;
        }
    };
    tabprint(tab, &format!("Created: {}", dates.format_date(vh.create_date)));
    tabprint(
        tab,
        &format!("Last modified: {}", dates.format_date(vh.modify_date)),
    );
    tabprint(
        tab,
        &format!(
            "Capacity: {:.1} MB ({} bytes)",
            megabytes(vh.capacity()),
            vh.capacity()
        ),
    );
    tabprint(
        tab,
        &format!("Used: {:.1} MB ({} bytes)", megabytes(vh.used()), vh.used()),
    );
    tabprint(
        tab,
        &format!("Free: {:.1} MB ({} bytes)", megabytes(vh.free()), vh.free()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hfs_epoch() {
        let f = UtcDateFormatter;
        assert_eq!(f.format_date(0), "1904-01-01 00:00:00 UTC");
    }

    #[test]
    fn test_unix_epoch() {
        let f = UtcDateFormatter;
        assert_eq!(
            f.format_date(HFS_EPOCH_TO_UNIX as u32),
            "1970-01-01 00:00:00 UTC"
        );
    }

    #[test]
    fn test_known_date() {
        // 1997-08-06 00:00:00 UTC = 10072 days after the unix epoch
        let f = UtcDateFormatter;
        let secs = (HFS_EPOCH_TO_UNIX + 10_072 * 86_400) as u32 + 3_600;
        assert_eq!(f.format_date(secs), "1997-08-06 01:00:00 UTC");
    }

    #[test]
    fn test_civil_from_days() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(-1), (1969, 12, 31));
        assert_eq!(civil_from_days(11_016), (2000, 2, 29));
    }

    #[test]
    fn test_signature_chars() {
        assert_eq!(signature_chars(0x4552), "ER");
        assert_eq!(signature_chars(0x4244), "BD");
        assert_eq!(signature_chars(0x0001), "..");
    }
}
