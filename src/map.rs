/// Partition layout visualization

use crate::error::Result;
use crate::format::constants::*;
use crate::probe::walk_partitions;
use crate::record::DriverDescriptorRecord;
use std::io::{Read, Seek};

/// ANSI color codes for the layout map
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BRIGHT_WHITE: &str = "\x1b[97m";
    pub const DARK_WHITE: &str = "\x1b[37m";
    pub const BRIGHT_RED: &str = "\x1b[91m";
    pub const BRIGHT_YELLOW: &str = "\x1b[93m";
    pub const BRIGHT_CYAN: &str = "\x1b[96m";
}

const BAR_WIDTH: u64 = 40;
const BLOCK_CHAR: &str = "\u{2593}"; // ▓

fn bar_color(partition_type: &str, truncated: bool) -> &'static str {
    if truncated {
        colors::BRIGHT_RED
    } else if partition_type == PARTITION_TYPE_HFS {
        colors::BRIGHT_WHITE
    } else if partition_type.starts_with("Apple_Driver") {
        colors::BRIGHT_YELLOW
    } else if partition_type == PARTITION_TYPE_MAP {
        colors::BRIGHT_CYAN
    } else {
        colors::DARK_WHITE
    }
}

/// Draw a proportional layout map of a partitioned device image
pub fn draw_partition_map<R: Read + Seek>(r: &mut R, file_size: u64) -> Result<()> {
    let ddr = DriverDescriptorRecord::read_at(r, 0)?;
    if ddr.signature != DEVICE_SIGNATURE {
        println!("Not a partitioned device image.");
        return Ok(());
    }

    let partitions = walk_partitions(r);
    if partitions.is_empty() {
        println!("No partition map found.");
        return Ok(());
    }

    println!("=== Partition Layout ===");
    println!(
        "Legend: {}HFS{} {}Driver{} {}Map{} {}Other{} {}Truncated{}",
        colors::BRIGHT_WHITE,
        colors::RESET,
        colors::BRIGHT_YELLOW,
        colors::RESET,
        colors::BRIGHT_CYAN,
        colors::RESET,
        colors::DARK_WHITE,
        colors::RESET,
        colors::BRIGHT_RED,
        colors::RESET
    );
    println!();

    for (index, (_, pme)) in partitions.iter().enumerate() {
        let offset = u64::from(pme.start_block) * BLOCK_SIZE;
        let length = u64::from(pme.block_count) * BLOCK_SIZE;
        let truncated = offset + length > file_size;
        let partition_type = pme.partition_type();

        let width = if file_size > 0 {
            (length * BAR_WIDTH / file_size).max(1) as usize
        } else {
            1
        };
        let bar = BLOCK_CHAR.repeat(width.min(BAR_WIDTH as usize));
        println!(
            "{:>2} {}{:<40}{} {} ({}) blocks {}..{}",
            index,
            bar_color(&partition_type, truncated),
            bar,
            colors::RESET,
            pme.name(),
            partition_type,
            pme.start_block,
            u64::from(pme.start_block) + u64::from(pme.block_count)
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_color_by_type() {
        assert_eq!(bar_color("Apple_HFS", false), colors::BRIGHT_WHITE);
        assert_eq!(bar_color("Apple_Driver43", false), colors::BRIGHT_YELLOW);
        assert_eq!(bar_color("Apple_partition_map", false), colors::BRIGHT_CYAN);
        assert_eq!(bar_color("Apple_Free", false), colors::DARK_WHITE);
        assert_eq!(bar_color("Apple_HFS", true), colors::BRIGHT_RED);
    }
}
