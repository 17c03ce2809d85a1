use anyhow::Result;
use std::fs::{rename, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const MAX_LOG_BYTES: u64 = 16 * 1024 * 1024; // 16 MB
const MAX_LOG_BACKUPS: usize = 5; // number of rotated archives to keep

/// Route `tracing` output to `<dir>/qa-chat.log`. The terminal belongs to the
/// UI, so nothing is written to stdout or stderr.
///
/// `RUST_LOG` wins over `filter` when set.
pub fn init(dir: &Path, filter: &str) -> Result<PathBuf> {
    let path = dir.join("qa-chat.log");
    let file = RotatingFile::open(path.clone(), MAX_LOG_BYTES, MAX_LOG_BACKUPS)?;
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(filter))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(path)
}

/// Append-only log file that rotates itself once it reaches `max_bytes`.
struct RotatingFile {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    max_backups: usize,
}

impl RotatingFile {
    fn open(path: PathBuf, max_bytes: u64, max_backups: usize) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            file,
            written,
            max_bytes,
            max_backups,
        })
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        rotate_backups(&self.path, self.max_backups);
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.written = self.file.metadata()?.len();
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written >= self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Shift `base.log.(n-1)` to `base.log.n`, ..., `base` to `base.log.1`.
/// Best effort: failures leave the files where they are.
fn rotate_backups(base: &Path, max_backups: usize) {
    for i in (1..=max_backups).rev() {
        let src = if i == 1 {
            base.to_path_buf()
        } else {
            base.with_extension(format!("log.{}", i - 1))
        };

        let dst = base.with_extension(format!("log.{}", i));

        if src.exists() {
            if dst.exists() {
                let _ = std::fs::remove_file(&dst);
            }
            if rename(&src, &dst).is_err() {
                if let (Ok(mut r), Ok(mut w)) = (
                    std::fs::File::open(&src),
                    OpenOptions::new().create(true).write(true).open(&dst),
                ) {
                    let _ = std::io::copy(&mut r, &mut w);
                    let _ = std::fs::remove_file(&src);
                }
            }
        }
    }
}
