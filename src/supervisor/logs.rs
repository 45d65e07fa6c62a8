//! Log file inspection for the status report.

use std::path::Path;

/// Number of trailing lines shown per log.
pub const TAIL_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogInfo {
    pub file_name: String,
    /// Size in bytes; 0 if the file could not be read
    pub size: u64,
    /// Last few lines, without trailing newlines
    pub last_lines: Vec<String>,
}

/// Inspect a server log. Returns None when the file does not exist.
///
/// A file that exists but cannot be read is reported with size 0 and no
/// lines rather than as an error.
pub fn inspect(path: &Path) -> Option<LogInfo> {
    if !path.exists() {
        return None;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let info = std::fs::metadata(path)
        .and_then(|meta| Ok((meta.len(), std::fs::read(path)?)))
        .map(|(size, bytes)| LogInfo {
            file_name: file_name.clone(),
            size,
            last_lines: tail(&String::from_utf8_lossy(&bytes), TAIL_LINES),
        })
        .unwrap_or_else(|e| {
            tracing::debug!(path = %path.display(), error = %e, "Unreadable log file");
            LogInfo {
                file_name,
                size: 0,
                last_lines: Vec::new(),
            }
        });
    Some(info)
}

/// The last `n` lines of `content`.
pub fn tail(content: &str, n: usize) -> Vec<String> {
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].iter().map(|l| l.to_string()).collect()
}
