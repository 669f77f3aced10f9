pub mod inference;
pub mod planner;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use inference::{InferenceClient, InferenceError, PlannerConfig};
use planner::{CompletionEngine, Planner};

/// Return the platform-standard data directory for robot-planner logs.
///
/// - macOS: `~/Library/Application Support/robot-planner/`
/// - Windows: `{FOLDERID_RoamingAppData}\robot-planner\`
/// - Linux: `$XDG_DATA_HOME/robot-planner/` (fallback `~/.local/share/...`)
///
/// Falls back to `~/.robot-planner/` only if none of the above can be resolved.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = dirs::data_dir() {
        return dir.join("robot-planner");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".robot-planner")
}

/// Build the planner over the hosted model.
///
/// Reads the credential from the environment; a missing token is fatal here,
/// before any instruction is processed. The returned planner shares one
/// read-only client for every call.
pub fn build_planner(config: &PlannerConfig) -> Result<Planner, InferenceError> {
    let client = InferenceClient::from_config(config.clone())?;
    tracing::info!(
        model = client.model(),
        chat_base_url = %config.chat_base_url,
        text_base_url = %config.text_base_url,
        "inference client ready"
    );
    let engine = CompletionEngine::new(Arc::new(client), config);
    Ok(Planner::new(engine))
}

/// Initialize the tracing subscriber and write structured logs to the data directory.
///
/// On each startup:
/// 1. Rotates existing logs (planner.log → planner.log.1 → .2 → .3, keeps last 3).
/// 2. Opens a fresh planner.log with a line-flushing writer.
/// 3. Logs a startup banner with the log file path.
///
/// `RUST_LOG` overrides the default `robot_planner=info,warn` filter; set
/// `robot_planner=debug` to see raw and filtered model output.
pub fn init_tracing() -> std::io::Result<PathBuf> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = data_dir();
    std::fs::create_dir_all(&log_dir)?;

    let log_path = log_dir.join("planner.log");
    rotate_log_file(&log_path, 3);

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("robot_planner=info,warn"));

    fmt::fmt()
        .with_env_filter(filter)
        .with_writer(FlushingWriter::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = %log_path.display(),
        pid = std::process::id(),
        "=== robot-planner starting ==="
    );

    Ok(log_path)
}

/// Rotate log files: `planner.log` → `planner.log.1` → `.2` → … → `.{keep}`.
///
/// Oldest file beyond `keep` is deleted. Missing files in the chain are skipped.
fn rotate_log_file(base_path: &Path, keep: u32) {
    // Delete the oldest
    let oldest = format!("{}.{keep}", base_path.display());
    let _ = std::fs::remove_file(&oldest);

    // Shift: .{n-1} → .{n}
    for i in (1..keep).rev() {
        let from = format!("{}.{i}", base_path.display());
        let to = format!("{}.{}", base_path.display(), i + 1);
        let _ = std::fs::rename(&from, &to);
    }

    // Current → .1
    if base_path.exists() {
        let to = format!("{}.1", base_path.display());
        let _ = std::fs::rename(base_path, &to);
    }
}

/// A writer that wraps `std::fs::File` and flushes after every write.
#[derive(Clone)]
struct FlushingWriter {
    file: Arc<std::sync::Mutex<std::fs::File>>,
}

impl FlushingWriter {
    fn new(file: std::fs::File) -> Self {
        Self {
            file: Arc::new(std::sync::Mutex::new(file)),
        }
    }
}

impl std::io::Write for FlushingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        let n = std::io::Write::write(&mut *f, buf)?;
        std::io::Write::flush(&mut *f)?;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        std::io::Write::flush(&mut *f)
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FlushingWriter {
    type Writer = FlushingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
