/// Debug logging utility function
///
/// Prints debug messages with a colored prefix when debug assertions are enabled.
pub fn debug_log(msg: &str) {
    if cfg!(debug_assertions) {
        eprintln!("\x1b[1;33m[git-fault]\x1b[0m {}", msg);
    }
}

/// Split raw file content into lines, each keeping its `\n` terminator.
/// A final line without a terminator is kept as-is.
pub fn split_lines(data: &[u8]) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (pos, byte) in data.iter().enumerate() {
        if *byte == b'\n' {
            lines.push(data[start..=pos].to_vec());
            start = pos + 1;
        }
    }
    if start < data.len() {
        lines.push(data[start..].to_vec());
    }
    lines
}
