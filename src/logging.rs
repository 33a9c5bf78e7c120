use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

/// Routes `log` output to `path`, appending. The terminal belongs to the
/// TUI, so nothing is ever written to stderr. Level comes from `RUST_LOG`
/// and defaults to `warn`.
pub fn init(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    // a second init (e.g. across tests) keeps the first logger
    let _ = Builder::from_env(Env::default().default_filter_or("warn"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .try_init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn init_creates_log_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("quizr.log");

        init(&path).unwrap();
        assert!(path.exists());

        // repeated init is harmless
        init(&path).unwrap();
    }
}
