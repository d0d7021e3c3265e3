//! Line-delimited "already seen" files.
//!
//! One entry per line. A missing file is an empty set. Updates only ever
//! append, so earlier runs are never rewritten.

use std::collections::HashSet;
use std::io;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

/// Read a seen-set file; a file that does not exist yields an empty set.
///
/// Lines that are not valid UTF-8 are decoded lossily rather than failing
/// the whole file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_seen(path: &Path) -> io::Result<HashSet<String>> {
    let bytes = match fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("No seen file yet; starting empty");
            return Ok(HashSet::new());
        }
        Err(e) => return Err(e),
    };

    let seen: HashSet<String> = bytes
        .split(|&b| b == b'\n')
        .map(|line| String::from_utf8_lossy(line).trim_end_matches('\r').to_string())
        .filter(|l| !l.is_empty())
        .collect();
    info!(count = seen.len(), "Loaded seen entries");
    Ok(seen)
}

/// Append `entries` to a seen-set file, one per line, creating it if needed.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = entries.len()))]
pub async fn append_seen(path: &Path, entries: &[String]) -> io::Result<()> {
    let mut buf = String::new();
    for entry in entries {
        buf.push_str(entry);
        buf.push('\n');
    }

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(buf.as_bytes()).await?;
    file.flush().await?;
    info!("Appended seen entries");
    Ok(())
}
