//! File and stdin helpers shared by the commands.

use std::io::BufRead;

/// Reads one line, trimmed. `None` on EOF or read error.
///
/// ```rust
/// use std::io::Cursor;
/// use hanabi_cli::io_utils::read_stdin_line;
///
/// let mut input = Cursor::new("play 0\n");
/// assert_eq!(read_stdin_line(&mut input).as_deref(), Some("play 0"));
/// assert_eq!(read_stdin_line(&mut input), None);
/// ```
pub fn read_stdin_line(stdin: &mut dyn BufRead) -> Option<String> {
    let mut line = String::new();
    match stdin.read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}

/// Reads a UTF-8 text file, stripping a leading BOM.
pub fn read_text(path: &str) -> Result<String, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    Ok(content
        .strip_prefix('\u{feff}')
        .map(str::to_string)
        .unwrap_or(content))
}

pub fn ensure_parent_dir(path: &std::path::Path) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory {}: {}", parent.display(), e))?;
    }
    Ok(())
}
