//! External viewer launched at the located timestamp.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::{debug, info};
use vidseek_core::{Notify, VidseekError};

/// Template used when `VIDSEEK_VIEWER` is unset.
pub const DEFAULT_VIEWER: &str = "mpv --start={seconds} {path}";

/// Spawns a viewer process from a command template and does not wait for it.
///
/// The template is split on whitespace; `{path}` and `{seconds}` are
/// substituted inside each argument.
#[derive(Debug, Clone)]
pub struct ProcessViewer {
    template: String,
}

impl ProcessViewer {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Program and arguments for `location` at `start`.
    pub fn command_line(&self, location: &Path, start: Duration) -> Vec<String> {
        let path = location.display().to_string();
        let seconds = format!("{:.3}", start.as_secs_f64());
        self.template
            .split_whitespace()
            .map(|arg| arg.replace("{path}", &path).replace("{seconds}", &seconds))
            .collect()
    }
}

impl Default for ProcessViewer {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWER)
    }
}

impl Notify for ProcessViewer {
    fn notify(&self, location: &Path, start: Duration) -> vidseek_core::Result<()> {
        let argv = self.command_line(location, start);
        let Some((program, args)) = argv.split_first() else {
            return Err(VidseekError::InvalidQuery("viewer command is empty".into()));
        };

        debug!(program = %program, args = ?args, "Launching viewer");
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| VidseekError::Io {
                path: PathBuf::from(program),
                source: e,
            })?;

        info!(pid = child.id(), video = %location.display(), "Viewer launched");
        Ok(())
    }
}
