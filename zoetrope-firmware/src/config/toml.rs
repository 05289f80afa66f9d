//! Simple TOML parser for the frame configuration
//!
//! This is a minimal TOML parser that handles only the subset frame.toml
//! needs. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer)
//! - [section] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings
//! - Arrays and inline tables
//! - Datetime values
//! - Dotted keys

use heapless::String;
use zoetrope_core::config::{Border, FrameConfig, ReminderEntry};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown section header
    InvalidSection,
    /// Value not parseable for its key
    InvalidValue,
    /// Exceeded a heapless capacity
    TooManyItems,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Frame,
    Wifi,
    Stats,
    Market,
    Daily,
    Reminders,
}

/// Parse TOML configuration into a FrameConfig
pub fn parse_config(input: &str) -> Result<FrameConfig, ParseError> {
    let mut config = FrameConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(ParseError::InvalidValue)?;
        apply(&mut config, section, key.trim(), value.trim())?;
    }

    Ok(config)
}

fn parse_section_header(name: &str) -> Result<Section, ParseError> {
    match name.trim() {
        "frame" => Ok(Section::Frame),
        "wifi" => Ok(Section::Wifi),
        "stats" => Ok(Section::Stats),
        "market" => Ok(Section::Market),
        "daily" => Ok(Section::Daily),
        "reminders" => Ok(Section::Reminders),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply(
    config: &mut FrameConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    match section {
        Section::Root => Err(ParseError::InvalidSection),
        Section::Frame => {
            match key {
                "dwell_secs" => {
                    config.dwell_secs = value.parse().map_err(|_| ParseError::InvalidValue)?;
                }
                "border" => {
                    config.border = match unquote(value)? {
                        "white" => Border::White,
                        "black" => Border::Black,
                        _ => return Err(ParseError::InvalidValue),
                    };
                }
                // Unknown keys are ignored so old firmware reads new files
                _ => {}
            }
            Ok(())
        }
        Section::Wifi => match key {
            "ssid" => copy_string(&mut config.wifi.ssid, value),
            "password" => copy_string(&mut config.wifi.password, value),
            _ => Ok(()),
        },
        Section::Stats => match key {
            "endpoint" => copy_string(&mut config.stats.endpoint, value),
            "password" => copy_string(&mut config.stats.password, value),
            _ => Ok(()),
        },
        Section::Market => match key {
            "endpoint" => copy_string(&mut config.market.endpoint, value),
            "symbol" => copy_string(&mut config.market.symbol, value),
            _ => Ok(()),
        },
        Section::Daily => match key {
            "endpoint" => copy_string(&mut config.daily.endpoint, value),
            "api_key" => copy_string(&mut config.daily.api_key, value),
            _ => Ok(()),
        },
        Section::Reminders => {
            // Every key in [reminders] is a name, its value the date
            let mut entry = ReminderEntry::default();
            entry
                .name
                .push_str(key)
                .map_err(|_| ParseError::InvalidValue)?;
            entry
                .date
                .push_str(unquote(value)?)
                .map_err(|_| ParseError::InvalidValue)?;
            config
                .reminders
                .push(entry)
                .map_err(|_| ParseError::TooManyItems)
        }
    }
}

fn unquote(value: &str) -> Result<&str, ParseError> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseError::InvalidValue)
}

fn copy_string<const N: usize>(dst: &mut String<N>, value: &str) -> Result<(), ParseError> {
    let v = unquote(value)?;
    dst.clear();
    dst.push_str(v).map_err(|_| ParseError::InvalidValue)
}
