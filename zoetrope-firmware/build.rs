//! Build script for zoetrope-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates frame.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate frame.toml at compile time
///
/// The firmware parses the embedded config with a minimal TOML-subset
/// parser at boot; this catches mistakes on the host where the error
/// message can actually be read.
fn validate_config() {
    println!("cargo:rerun-if-changed=frame.toml");

    let config_path = Path::new("frame.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => panic!("failed to read frame.toml: {e}"),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => panic!("frame.toml is not valid TOML: {e}"),
    };

    let mut errors = Vec::new();

    match config.get("wifi") {
        Some(toml::Value::Table(wifi)) => {
            match wifi.get("ssid") {
                Some(toml::Value::String(ssid)) if !ssid.is_empty() => {}
                _ => errors.push("[wifi] needs a non-empty 'ssid' string".to_string()),
            }
            if !matches!(wifi.get("password"), Some(toml::Value::String(_))) {
                errors.push("[wifi] needs a 'password' string".to_string());
            }
        }
        _ => errors.push("missing [wifi] section".to_string()),
    }

    if let Some(toml::Value::Table(frame)) = config.get("frame") {
        if let Some(toml::Value::Integer(dwell)) = frame.get("dwell_secs") {
            if !(30..=86_400).contains(dwell) {
                errors.push(format!("[frame] dwell_secs {dwell} outside 30-86400"));
            }
        }
        if let Some(toml::Value::String(border)) = frame.get("border") {
            if border != "white" && border != "black" {
                errors.push(format!("[frame] border '{border}' must be white or black"));
            }
        }
    }

    if let Some(toml::Value::Table(reminders)) = config.get("reminders") {
        for (name, value) in reminders {
            let ok = match value {
                toml::Value::String(date) => valid_anniversary(date),
                _ => false,
            };
            if !ok {
                errors.push(format!(
                    "[reminders] '{name}' must be a \"DD-MM\" or \"DD-MM-YYYY\" string"
                ));
            }
        }
    }

    if !errors.is_empty() {
        panic!("invalid frame.toml:\n  - {}", errors.join("\n  - "));
    }

    println!("cargo:warning=frame.toml validated successfully");
}

fn valid_anniversary(date: &str) -> bool {
    let parts: Vec<&str> = date.split('-').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return false;
    }
    let day: u8 = match parts[0].parse() {
        Ok(d) => d,
        Err(_) => return false,
    };
    let month: u8 = match parts[1].parse() {
        Ok(m) => m,
        Err(_) => return false,
    };
    if parts.len() == 3 && parts[2].parse::<u16>().is_err() {
        return false;
    }
    (1..=31).contains(&day) && (1..=12).contains(&month)
}
