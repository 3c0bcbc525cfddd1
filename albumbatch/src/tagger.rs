use anyhow::{Context, Result, bail};
use stacks_common::config::BatchConfig;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

const LIVENESS_PROGRAM: &str = "pgrep";

/// The external application that tags one album at a time.
pub trait TaggerApp {
    /// Make sure the application is up before a pass starts.
    fn ensure_running(&mut self) -> Result<()>;

    /// Tag a single album folder, blocking until the application returns.
    /// An error classifies the album as failed.
    fn tag_album(&mut self, album: &Path) -> Result<()>;
}

/// Drives a tagging program installed on the system (Picard by default).
#[derive(Debug, Clone)]
pub struct ExternalTagger {
    program: String,
    args: Vec<String>,
    start_args: Vec<String>,
    process_name: String,
    liveness_program: String,
    commands_file: PathBuf,
    startup_delay: Duration,
}

impl From<&BatchConfig> for ExternalTagger {
    fn from(config: &BatchConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            start_args: config.start_args.clone(),
            process_name: config.process_name.clone(),
            liveness_program: LIVENESS_PROGRAM.into(),
            commands_file: config.commands_file.clone(),
            startup_delay: Duration::from_secs(config.startup_delay_secs),
        }
    }
}

impl ExternalTagger {
    fn command_args(&self, album: &Path) -> Vec<String> {
        let album = album.to_string_lossy();
        let commands = self.commands_file.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{album}", &album).replace("{commands}", &commands))
            .collect()
    }

    /// `pgrep -x`: exit 0 means running, 1 means no match, anything else is
    /// a failure of the check itself.
    fn is_running(&self) -> Result<bool> {
        let status = Command::new(&self.liveness_program)
            .arg("-x")
            .arg(&self.process_name)
            .stdout(Stdio::null())
            .status()
            .with_context(|| format!("Failed to run {}", self.liveness_program))?;

        match status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => bail!("{} exited with {status}", self.liveness_program),
        }
    }
}

impl TaggerApp for ExternalTagger {
    fn ensure_running(&mut self) -> Result<()> {
        if self.is_running()? {
            return Ok(());
        }

        tracing::info!("Starting {}", self.program);
        Command::new(&self.program)
            .args(&self.start_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start {}", self.program))?;
        thread::sleep(self.startup_delay);
        Ok(())
    }

    fn tag_album(&mut self, album: &Path) -> Result<()> {
        let status = Command::new(&self.program)
            .args(self.command_args(album))
            .status()
            .with_context(|| format!("Failed to run {}", self.program))?;

        if !status.success() {
            bail!("{} exited with {status}", self.program);
        }
        Ok(())
    }
}
