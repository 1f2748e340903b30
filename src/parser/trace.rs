//! Parser for `-finstrument-functions` trace text.
//!
//! Each line is `this_fn call_site flag timestamp`, where both addresses are
//! hex offsets from the load base, `flag` is `E` (enter) or `X` (exit), and
//! `timestamp` is decimal nanoseconds.

use crate::utils::error::TraceError;
use std::fmt;

/// Direction of a trace event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventFlag {
    Enter,
    Exit,
}

impl EventFlag {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "E" => Some(Self::Enter),
            "X" => Some(Self::Exit),
            _ => None,
        }
    }
}

impl fmt::Display for EventFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enter => "E",
            Self::Exit => "X",
        })
    }
}

/// One function enter or exit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    /// 1-based line number in the trace text
    pub line: usize,

    /// Entry address of the function
    pub address: u64,

    /// Return address inside the caller
    pub call_site: u64,

    pub flag: EventFlag,

    /// Nanoseconds
    pub timestamp: u64,
}

/// Parse one non-blank trace line
///
/// # Errors
/// * `TraceError::Format` - wrong token count, bad number or unknown flag
pub fn parse_trace_line(line: usize, text: &str) -> Result<TraceEvent, TraceError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [address, call_site, flag, timestamp] = tokens.as_slice() else {
        return Err(TraceError::format(
            line,
            format!("expected 4 fields, found {}", tokens.len()),
        ));
    };

    let address = parse_address(address)
        .ok_or_else(|| TraceError::format(line, format!("invalid address '{}'", address)))?;
    let call_site = parse_address(call_site)
        .ok_or_else(|| TraceError::format(line, format!("invalid call site '{}'", call_site)))?;
    let flag = EventFlag::from_token(flag)
        .ok_or_else(|| TraceError::format(line, format!("unknown flag '{}'", flag)))?;
    let timestamp = timestamp
        .parse::<u64>()
        .map_err(|e| TraceError::format(line, format!("invalid timestamp: {}", e)))?;

    Ok(TraceEvent {
        line,
        address,
        call_site,
        flag,
        timestamp,
    })
}

/// Lazily parse every non-blank line of a trace
pub fn parse_trace(text: &str) -> impl Iterator<Item = Result<TraceEvent, TraceError>> + '_ {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_trace_line(index + 1, line))
}

/// Parse a hex address, with or without `0x`
///
/// glibc prints a null pointer as `(nil)`; that reads as 0.
pub fn parse_address(token: &str) -> Option<u64> {
    if token == "(nil)" {
        return Some(0);
    }
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u64::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x1139"), Some(0x1139));
        assert_eq!(parse_address("1139"), Some(0x1139));
        assert_eq!(parse_address("(nil)"), Some(0));
        assert_eq!(parse_address("0xZZ"), None);
        assert_eq!(parse_address(""), None);
    }

    #[test]
    fn test_parse_enter_line() {
        let event = parse_trace_line(3, "0x1160 0x1151 E 123456").unwrap();
        assert_eq!(
            event,
            TraceEvent {
                line: 3,
                address: 0x1160,
                call_site: 0x1151,
                flag: EventFlag::Enter,
                timestamp: 123456,
            }
        );
    }

    #[test]
    fn test_parse_exit_line() {
        let event = parse_trace_line(1, "0x1160 0x1151 X 99").unwrap();
        assert_eq!(event.flag, EventFlag::Exit);
    }

    #[test]
    fn test_wrong_field_count() {
        let err = parse_trace_line(7, "0x1160 0x1151 E").unwrap_err();
        assert!(matches!(err, TraceError::Format { line: 7, .. }));
    }

    #[test]
    fn test_unknown_flag() {
        let err = parse_trace_line(2, "0x1160 0x1151 Q 10").unwrap_err();
        assert!(matches!(err, TraceError::Format { line: 2, .. }));
    }

    #[test]
    fn test_hex_timestamp_rejected() {
        assert!(parse_trace_line(1, "0x1160 0x1151 E 0x10").is_err());
    }

    #[test]
    fn test_parse_trace_skips_blank_lines() {
        let text = "0x1139 0x0 E 1\n\n0x1160 0x1151 E 2\n   \n0x1160 0x1151 X 3\n";
        let events: Vec<_> = parse_trace(text).collect::<Result<_, _>>().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].line, 3);
        assert_eq!(events[2].line, 5);
    }
}
