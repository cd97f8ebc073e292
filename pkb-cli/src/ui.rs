//! Progress feedback for the pkb CLI
//!
//! The connection spinner is suppressed when:
//! - `--quiet` flag is passed
//! - `PKB_QUIET=1` environment variable is set
//! - stderr is not a TTY (piped output)

use std::io::IsTerminal;
use std::sync::OnceLock;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Global quiet mode state
static QUIET_MODE: OnceLock<bool> = OnceLock::new();

/// Initialize quiet mode from the --quiet flag, PKB_QUIET and TTY status.
///
/// Call this once at startup.
pub fn init_quiet_mode(quiet_flag: bool) {
    let is_quiet = quiet_flag
        || std::env::var("PKB_QUIET").map(|v| v == "1").unwrap_or(false)
        || !std::io::stderr().is_terminal();

    QUIET_MODE.set(is_quiet).ok();
}

/// Check if we're in quiet mode
pub fn is_quiet() -> bool {
    *QUIET_MODE.get().unwrap_or(&false)
}

/// Create a spinner that respects quiet mode
///
/// Returns None in quiet mode.
pub fn spinner(msg: impl Into<String>) -> Option<ProgressBar> {
    if is_quiet() {
        return None;
    }

    let style = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());

    let pb = ProgressBar::new_spinner();
    pb.set_style(style);
    pb.set_message(msg.into());
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}

/// Remove the spinner without leaving a line behind
pub fn finish_clear(pb: Option<ProgressBar>) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
}

/// Finish a spinner with an error message
pub fn finish_error(pb: Option<ProgressBar>, msg: impl Into<String>) {
    if let Some(pb) = pb {
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            pb.set_style(style);
        }
        pb.finish_with_message(format!("✗ {}", msg.into()));
    }
}
