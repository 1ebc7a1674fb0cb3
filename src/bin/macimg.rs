/// Interactive console and command-line tool for Macintosh disk images

use macimage::*;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::fs::File;
use std::io::Write;

/// Command completer for the REPL
struct CommandCompleter {
    commands: Vec<&'static str>,
}

impl CommandCompleter {
    fn new() -> Self {
        Self {
            commands: vec![
                "checksum",
                "cvt2hfs",
                "cvt2iso",
                "exit",
                "help",
                "info",
                "map",
                "open",
                "partitions",
                "quit",
                "verbose",
                "writable",
            ],
        }
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // Only complete the first word (command name)
        let line_to_cursor = &line[..pos];
        if line_to_cursor.contains(' ') {
            return Ok((pos, vec![]));
        }

        let prefix = line_to_cursor.to_lowercase();
        let matches: Vec<Pair> = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(&prefix))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();

        Ok((0, matches))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}
impl Validator for CommandCompleter {}
impl Helper for CommandCompleter {}

/// Get the path to the history file
fn history_path() -> Option<std::path::PathBuf> {
    dirs::home_dir().map(|mut p| {
        p.push(".macimage_history");
        p
    })
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        std::process::exit(run_once(&args));
    }
    repl();
}

/// Execute a single command-line invocation
fn run_once(args: &[String]) -> i32 {
    let mut verbose = false;
    let mut writable = false;
    let mut rest = Vec::new();
    for arg in args {
        match arg.as_str() {
            "-v" => verbose = true,
            "-w" => writable = true,
            _ => rest.push(arg.clone()),
        }
    }
    if rest.len() < 2 {
        usage();
        return 1;
    }

    let verb = rest[0].as_str();
    let path = rest[1].as_str();
    match verb {
        "info" => match describe_file(path, verbose) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        "cvt2hfs" | "cvt2iso" => {
            let to_device = verb == "cvt2iso";
            let dst = rest
                .get(2)
                .cloned()
                .unwrap_or_else(|| default_destination(path, to_device));
            run_convert(to_device, path, &dst, writable)
        }
        _ => {
            eprintln!("\nInvalid parameter: {}\n", verb);
            usage();
            1
        }
    }
}

/// Default destination filename when none is given
fn default_destination(path: &str, to_device: bool) -> String {
    format!("{}{}", path, if to_device { ".iso" } else { ".dsk" })
}

fn run_convert(to_device: bool, src: &str, dst: &str, writable: bool) -> i32 {
    println!("Input file: \"{}\"", src);
    let mut src_file = match File::open(src) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Unable to open \"{}\" ({})", src, e);
            return 1;
        }
    };
    if let Ok(meta) = src_file.metadata() {
        println!("Input file size: {} bytes", meta.len());
    }
    // probe first so the volume location is reported before the copy
    match locate_volume(&mut src_file) {
        Ok((kind, extent)) => {
            println!("File format: {}", kind.name());
            println!(
                "HFS volume found at offset {}, length {}",
                extent.offset, extent.length
            );
            if extent.truncated {
                println!("Partition extends past the end of the file; using truncated length");
            }
        }
        Err(e) => {
            eprintln!("Unable to find HFS volume ({})", e);
            return 1;
        }
    }
    println!("Output file: \"{}\"", dst);
    if to_device {
        println!("Writing Apple partition map device image");
    } else {
        println!("Writing HFS volume data");
    }

    match convert(to_device, src, dst, writable, draw_progress) {
        Ok(report) => {
            println!();
            println!(
                "Marked HFS volume as {}",
                if writable { "writable" } else { "read-only" }
            );
            println!("Wrote {} bytes to output file.", report.bytes_written);
            0
        }
        Err(e) => {
            println!();
            eprintln!("An error occurred writing the image: {}", e);
            1
        }
    }
}

const PROGRESS_WIDTH: usize = 50;

/// Render conversion progress as a bar on standard output
fn draw_progress(fraction: f64) {
    let filled = (fraction * PROGRESS_WIDTH as f64) as usize;
    print!(
        "\r{:3}% [{}{}]",
        (fraction * 100.0) as u32,
        "#".repeat(filled.min(PROGRESS_WIDTH)),
        " ".repeat(PROGRESS_WIDTH - filled.min(PROGRESS_WIDTH))
    );
    let _ = std::io::stdout().flush();
}

fn repl() {
    println!("=== macimage ===");
    println!("Interactive console for Macintosh HFS and Apple Partition Map disk images.");
    println!("Type 'help' for available commands\n");

    let mut rl = Editor::new().expect("Failed to create editor");
    rl.set_helper(Some(CommandCompleter::new()));

    // Load history if available
    if let Some(history_path) = history_path() {
        let _ = rl.load_history(&history_path);
    }

    let mut current: Option<String> = None;
    let mut verbose = false;
    let mut writable = false;

    loop {
        let readline = rl.readline("> ");
        let input = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                if let Some(history_path) = history_path() {
                    let _ = rl.save_history(&history_path);
                }
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let _ = rl.add_history_entry(input);

        let parts = parse_command_line(input);
        if parts.is_empty() {
            continue;
        }
        let command = parts[0].to_lowercase();

        match command.as_str() {
            "help" => {
                print_help();
            }
            "quit" | "exit" => {
                if let Some(history_path) = history_path() {
                    let _ = rl.save_history(&history_path);
                }
                println!("Goodbye!");
                break;
            }
            "open" => {
                if parts.len() < 2 {
                    println!("Usage: open <path>");
                    continue;
                }
                match File::open(&parts[1]) {
                    Ok(mut file) => match classify_image(&mut file) {
                        Ok(kind) => {
                            println!("Opened: {} ({})", parts[1], kind.name());
                            current = Some(parts[1].clone());
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    Err(e) => println!("Error: {}", e),
                }
            }
            "info" => {
                if let Some(ref path) = current {
                    if let Err(e) = describe_file(path, verbose) {
                        println!("Error: {}", e);
                    }
                } else {
                    println!("No image opened. Use 'open <path>' first.");
                }
            }
            "partitions" => {
                if let Some(ref path) = current {
                    list_partitions(path);
                } else {
                    println!("No image opened.");
                }
            }
            "map" => {
                if let Some(ref path) = current {
                    match File::open(path) {
                        Ok(mut file) => {
                            let size = file.metadata().map(|m| m.len()).unwrap_or(0);
                            if let Err(e) = draw_partition_map(&mut file, size) {
                                println!("Error: {}", e);
                            }
                        }
                        Err(e) => println!("Error: {}", e),
                    }
                } else {
                    println!("No image opened.");
                }
            }
            "checksum" => {
                if parts.len() < 3 {
                    println!("Usage: checksum <offset> <length>");
                    continue;
                }
                if let Some(ref path) = current {
                    let offset: u64 = parts[1].parse().unwrap_or(0);
                    let length: usize = parts[2].parse().unwrap_or(0);
                    match File::open(path)
                        .map_err(ImageError::from)
                        .and_then(|mut f| file_checksum16(&mut f, offset, length))
                    {
                        Ok(value) => println!("Checksum: {:#06x}", value),
                        Err(e) => println!("Error: {}", e),
                    }
                } else {
                    println!("No image opened.");
                }
            }
            "cvt2hfs" | "cvt2iso" => {
                let to_device = command == "cvt2iso";
                if let Some(ref path) = current {
                    let dst = parts
                        .get(1)
                        .cloned()
                        .unwrap_or_else(|| default_destination(path, to_device));
                    run_convert(to_device, path, &dst, writable);
                } else {
                    println!("No image opened.");
                }
            }
            "verbose" => {
                verbose = toggle(&parts, verbose);
                println!("Verbose: {}", if verbose { "on" } else { "off" });
            }
            "writable" => {
                writable = toggle(&parts, writable);
                println!(
                    "Converted volumes will be {}",
                    if writable { "writable" } else { "read-only" }
                );
            }
            _ => {
                println!("Unknown command: {}. Type 'help' for available commands.", command);
            }
        }
    }
}

fn toggle(parts: &[String], value: bool) -> bool {
    match parts.get(1).map(|s| s.as_str()) {
        Some("on") => true,
        Some("off") => false,
        _ => !value,
    }
}

fn list_partitions(path: &str) {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };
    let partitions = walk_partitions(&mut file);
    if partitions.is_empty() {
        println!("No partition map found.");
        return;
    }
    println!(
        "{:<3} {:<16} {:<24} {:>8} {:>8} {:>12}",
        "Idx", "Name", "Type", "Start", "Blocks", "Bytes"
    );
    println!("{}", "-".repeat(76));
    for (index, (_, pme)) in partitions.iter().enumerate() {
        println!(
            "{:<3} {:<16} {:<24} {:>8} {:>8} {:>12}",
            index,
            pme.name(),
            pme.partition_type(),
            pme.start_block,
            pme.block_count,
            u64::from(pme.block_count) * 512
        );
    }
}

fn parse_command_line(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
            }
            ' ' | '\t' if !in_quotes => {
                if !current.is_empty() {
                    parts.push(current.clone());
                    current.clear();
                }
            }
            _ => {
                current.push(ch);
            }
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
}

fn print_help() {
    println!("Available commands:");
    println!("  open <path>        - Open a disk image file (use quotes for paths with spaces)");
    println!("  info               - Describe the opened image ('verbose' adds detail)");
    println!("  partitions         - List partition map entries");
    println!("  map                - Visual partition layout");
    println!("  checksum <o> <l>   - Driver checksum over a byte range");
    println!("  cvt2hfs [dst]      - Convert to a raw HFS volume image (default <file>.dsk)");
    println!("  cvt2iso [dst]      - Convert to an APM device image (default <file>.iso)");
    println!("  verbose [on|off]   - Toggle verbose reports");
    println!("  writable [on|off]  - Toggle writable output volumes");
    println!("  help               - Show this help");
    println!("  quit, exit         - Exit");
}

fn usage() {
    eprintln!("Usage: macimg [-v] [-w] <verb> <file> [dstfile]");
    eprintln!("<verb> is one of the following options:");
    eprintln!("  info      Prints type, size, and other info about <file>.");
    eprintln!("            Use \"-v info\" to see more verbose detail.");
    eprintln!("  cvt2hfs   Converts input file to an HFS volume image.");
    eprintln!("            If dstfile not specified, will create <file>.dsk.");
    eprintln!("  cvt2iso   Converts input file to an APM device image.");
    eprintln!("            If dstfile not specified, will create <file>.iso.");
    eprintln!("            Use \"-w cvt2iso\" for a writable image (default is read-only)");
    eprintln!();
    eprintln!("Run with no arguments for an interactive console.");
    eprintln!();
    eprintln!("Use cvt2hfs to create an image for emulators that expect a raw HFS");
    eprintln!("volume, such as Mini vMac. Use cvt2iso for a device image usable in");
    eprintln!("Basilisk, SheepShaver, QEMU and other emulators. Conversion copies");
    eprintln!("only the Apple_HFS partition; always keep the original disk image.");
}
