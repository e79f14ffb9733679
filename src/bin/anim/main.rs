//! anim CLI - Tool for inspecting Maya .anim files.

use std::env;

use std::sync::atomic::{AtomicU8, Ordering};

use maya_anim::model::hierarchy_parents;
use maya_anim::prelude::*;

/// Verbosity level (thread-safe)
const LOG_QUIET: u8 = 0;
const LOG_INFO: u8 = 1;
const LOG_DEBUG: u8 = 2;
const LOG_TRACE: u8 = 3;

static LOG_LEVEL: AtomicU8 = AtomicU8::new(LOG_INFO);

#[inline]
fn log_level() -> u8 {
    LOG_LEVEL.load(Ordering::Relaxed)
}

#[inline]
fn set_log_level(level: u8) {
    LOG_LEVEL.store(level, Ordering::Relaxed);
}

macro_rules! info {
    ($($arg:tt)*) => {
        if log_level() >= LOG_INFO {
            println!("[INFO] {}", format!($($arg)*));
        }
    };
}

macro_rules! debug {
    ($($arg:tt)*) => {
        if log_level() >= LOG_DEBUG {
            println!("[DEBUG] {}", format!($($arg)*));
        }
    };
}

macro_rules! trace {
    ($($arg:tt)*) => {
        if log_level() >= LOG_TRACE {
            println!("[TRACE] {}", format!($($arg)*));
        }
    };
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => set_log_level(LOG_DEBUG),
            "-vv" | "--trace" => set_log_level(LOG_TRACE),
            "-q" | "--quiet" => set_log_level(LOG_QUIET),
            _ => filtered_args.push(arg),
        }
    }

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    match filtered_args[0] {
        // Info command - show document summary
        "info" | "i" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: anim info <file.anim>");
                std::process::exit(1);
            }
            cmd_info(filtered_args[1]);
        }

        // Tree command - show node hierarchy
        "tree" | "t" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: anim tree <file.anim>");
                std::process::exit(1);
            }
            cmd_tree(filtered_args[1]);
        }

        // Check command - validate a file
        "check" | "c" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: anim check <file.anim>");
                std::process::exit(1);
            }
            cmd_check(filtered_args[1]);
        }

        "help" | "-h" | "--help" => print_help(),

        other => {
            eprintln!("Error: unknown command '{other}'");
            print_help();
            std::process::exit(1);
        }
    }
}

fn load(path: &str) -> AnimDecode {
    match decode_file(path) {
        Ok(decoded) => decoded,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_info(path: &str) {
    let decoded = load(path);
    let doc = &decoded.document;
    let h = &doc.header;

    info!("File: {path}");
    info!("Version: {} (app {})", h.version, h.app_version);
    info!(
        "Units: {} ({} fps), {}, {}",
        h.time_unit.wire_name(),
        h.time_unit.fps(),
        h.linear_unit.wire_name(),
        h.angular_unit.wire_name()
    );
    info!("Range: {}..{}", h.start, h.end);
    info!("Nodes: {}", doc.nodes.len());

    let mut channels = 0usize;
    let mut keys = 0usize;
    for node in &doc.nodes {
        channels += node.groups.channel_count();
        for (_, group) in node.groups.iter() {
            keys += group.iter().map(|c| c.keys.len()).sum::<usize>();
        }
        debug!("  {} ({} channels)", node.name, node.groups.channel_count());
    }
    info!("Channels: {channels}, keys: {keys}");

    if decoded.report.nan_substitutions > 0 {
        info!("NaN substitutions: {}", decoded.report.nan_substitutions);
    }
    if let Some(abort) = &decoded.report.abort {
        info!("Decode aborted at line {}: {}", abort.line, abort.reason);
    }
}

fn cmd_tree(path: &str) {
    let decoded = load(path);
    let nodes = &decoded.document.nodes;
    let parents = hierarchy_parents(nodes);

    // depth of each node from its parent chain
    let mut depths = vec![0usize; nodes.len()];
    for (i, parent) in parents.iter().enumerate() {
        if let Some(p) = parent {
            depths[i] = depths[*p] + 1;
        }
    }

    for (i, node) in nodes.iter().enumerate() {
        let indent = "  ".repeat(depths[i]);
        let channels = node.groups.channel_count();
        if channels > 0 {
            println!("{indent}{} ({channels} channels)", node.name);
        } else {
            println!("{indent}{}", node.name);
        }
        trace!("node {i}: parent {:?}", parents[i]);
    }
}

fn cmd_check(path: &str) {
    let decoded = load(path);
    let mut findings = 0usize;

    if decoded.report.nan_substitutions > 0 {
        println!(
            "{} malformed numeric value(s) replaced by NaN",
            decoded.report.nan_substitutions
        );
        findings += 1;
    }
    if let Some(abort) = &decoded.report.abort {
        println!("decode aborted at line {}: {}", abort.line, abort.reason);
        findings += 1;
    }
    for node in &decoded.document.nodes {
        if !node.groups.rotation_euler.is_empty() && !node.groups.rotation_quaternion.is_empty() {
            println!("node '{}' carries both rotation representations", node.name);
            findings += 1;
        }
        for (kind, group) in node.groups.iter() {
            if let Some(expected) = kind.component_count() {
                if !group.is_empty() && group.len() != expected {
                    debug!(
                        "node '{}' has a partial {:?} group ({}/{expected})",
                        node.name,
                        kind,
                        group.len()
                    );
                }
            }
        }
    }

    if findings == 0 {
        info!("OK");
    } else {
        info!("{findings} finding(s)");
        std::process::exit(1);
    }
}

fn print_help() {
    println!("anim - Maya .anim file tool");
    println!();
    println!("Usage: anim [flags] <command> [args]");
    println!();
    println!("Commands:");
    println!("  info,  i <file>    Show document summary");
    println!("  tree,  t <file>    Show node hierarchy");
    println!("  check, c <file>    Validate a file (exit 1 on findings)");
    println!("  help               Show this help");
    println!();
    println!("Flags:");
    println!("  -v, --verbose      Debug output");
    println!("  -vv, --trace       Trace output");
    println!("  -q, --quiet        Errors only");
}
