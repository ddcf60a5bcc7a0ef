//! Helpers for replacement and updater tests

use bytes::Bytes;
use futures_util::stream;
use futures_util::StreamExt;
use inplace_update::ByteStream;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Create a fake executable with the given content
pub fn create_fake_binary(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}

/// Hex-encoded SHA-256 of a file's content
pub fn sha256_file(path: &Path) -> String {
    let content = fs::read(path).expect("file should be readable");
    hex::encode(Sha256::digest(&content))
}

/// Hex-encoded SHA-256 of a byte slice
pub fn sha256_bytes(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Stream `content` in chunks of `chunk_size` bytes
pub fn chunked_stream(content: &'static [u8], chunk_size: usize) -> ByteStream {
    let chunks: Vec<io::Result<Bytes>> = content
        .chunks(chunk_size)
        .map(|c| Ok(Bytes::from_static(c)))
        .collect();
    stream::iter(chunks).boxed()
}

/// Stream `prefix` and then fail with `kind`
pub fn failing_stream(prefix: &'static [u8], kind: io::ErrorKind) -> ByteStream {
    let items: Vec<io::Result<Bytes>> = vec![
        Ok(Bytes::from_static(prefix)),
        Err(io::Error::new(kind, "connection reset mid-download")),
    ];
    stream::iter(items).boxed()
}

/// Names of the entries directly inside `dir`
pub fn dir_entries(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .expect("directory should be readable")
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

/// Backup directories named after `label` directly inside `dir`
pub fn backup_dirs(dir: &Path, label: &str) -> Vec<PathBuf> {
    let prefix = format!("{}-bak-", label);
    fs::read_dir(dir)
        .expect("directory should be readable")
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.is_dir()
                && p.file_name()
                    .map(|n| n.to_string_lossy().starts_with(&prefix))
                    .unwrap_or(false)
        })
        .collect()
}

/// Install a test subscriber so debug logs show up with `--nocapture`
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("inplace_update=debug")
        .with_test_writer()
        .try_init();
}
