//! Trace adapter: reads a plain-text memory reference stream into typed
//! records.

use std::path::{Path, PathBuf};

use crate::error::{SimResult, TraceError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefKind {
    IFetch,
    Load,
    Store,
}

#[derive(Clone, Copy, Debug)]
pub struct TraceEntry {
    pub kind: RefKind,
    pub core_id: u8,
    pub address: u32,
}

/// Reads `<kind> <core_id> <hex address>` lines, one reference per line.
/// `<kind>` is `I`, `L`, or `S`. Blank lines are skipped.
pub fn fetch_operations(trace_path: &Path) -> SimResult<Vec<TraceEntry>> {
    let content = std::fs::read_to_string(trace_path)
        .map_err(|e| TraceError::FileReadError(trace_path.to_path_buf(), e))?;

    let mut entries = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        entries.push(parse_line(trace_path, line_num + 1, line)?);
    }

    Ok(entries)
}

fn parse_line(trace_path: &Path, line_num: usize, line: &str) -> SimResult<TraceEntry> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(parse_error(
            trace_path,
            line_num,
            "expected 'kind core_id address'",
        ));
    }

    let kind = match parts[0] {
        "I" => RefKind::IFetch,
        "L" => RefKind::Load,
        "S" => RefKind::Store,
        other => {
            return Err(parse_error(
                trace_path,
                line_num,
                format!("invalid kind '{}': expected 'I', 'L', or 'S'", other),
            ))
        }
    };

    let core_id: u8 = parts[1]
        .parse()
        .map_err(|_| parse_error(trace_path, line_num, format!("invalid core id '{}'", parts[1])))?;

    let addr_str = parts[2];
    let hex = addr_str.strip_prefix("0x").ok_or_else(|| {
        parse_error(
            trace_path,
            line_num,
            "address must start with '0x'".to_string(),
        )
    })?;
    let address = u32::from_str_radix(hex, 16)
        .map_err(|_| parse_error(trace_path, line_num, format!("invalid hex address '{}'", addr_str)))?;

    Ok(TraceEntry { kind, core_id, address })
}

fn parse_error(
    trace_path: &Path,
    line_num: usize,
    message: impl Into<String>,
) -> crate::error::SimError {
    TraceError::ParseError(PathBuf::from(trace_path), line_num, message.into()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct TempTrace(PathBuf);

    impl TempTrace {
        fn write(tag: &str, contents: &str) -> Self {
            let mut path = std::env::temp_dir();
            path.push(format!("memsim-trace-test-{}-{}.trace", std::process::id(), tag));
            std::fs::write(&path, contents).unwrap();
            TempTrace(path)
        }
    }

    impl Drop for TempTrace {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn parses_well_formed_lines() {
        let trace = TempTrace::write("well-formed", "I 0 0x0\nL 0 0x40\nS 1 0x80\n");
        let entries = fetch_operations(&trace.0).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].kind, RefKind::IFetch);
        assert_eq!(entries[1].address, 0x40);
        assert_eq!(entries[2].core_id, 1);
    }

    #[test]
    fn skips_blank_lines() {
        let trace = TempTrace::write("blank-lines", "I 0 0x0\n\nL 0 0x4\n");
        let entries = fetch_operations(&trace.0).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn rejects_unknown_kind() {
        let trace = TempTrace::write("bad-kind", "X 0 0x0\n");
        let err = fetch_operations(&trace.0).unwrap_err();
        assert!(matches!(
            err,
            crate::error::SimError::TraceError(TraceError::ParseError(_, 1, _))
        ));
    }

    #[test]
    fn rejects_non_hex_address() {
        let trace = TempTrace::write("bad-address", "L 0 40\n");
        let err = fetch_operations(&trace.0).unwrap_err();
        assert!(matches!(
            err,
            crate::error::SimError::TraceError(TraceError::ParseError(_, 1, _))
        ));
    }
}
