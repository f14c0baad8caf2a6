//! Local script binding.
//!
//! Runs `[interpreter] <script> <input> <output>` against files in a per-job
//! temp directory under the work directory. The directory is removed when the
//! job ends, including when the request is dropped mid-run, and the child is
//! killed with it. The B-roll style, when present, is passed as `BROLL_TYPE`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{ProcessorError, ProcessorResult};
use crate::traits::{ProcessRequest, ProcessedOutput, VideoProcessor};

/// Environment variable carrying the B-roll style to the script.
pub const BROLL_ENV: &str = "BROLL_TYPE";

/// Processor that shells out to a local executable.
#[derive(Debug, Clone)]
pub struct ScriptProcessor {
    script: PathBuf,
    interpreter: Option<String>,
    work_dir: PathBuf,
}

impl ScriptProcessor {
    pub fn new(
        script: impl Into<PathBuf>,
        interpreter: Option<String>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            script: script.into(),
            interpreter: interpreter.filter(|i| !i.trim().is_empty()),
            work_dir: work_dir.into(),
        }
    }

    /// Resolve the program to spawn and its leading arguments.
    fn command_line(&self) -> ProcessorResult<(PathBuf, Vec<OsString>)> {
        match &self.interpreter {
            Some(interpreter) => {
                let program = which::which(interpreter)
                    .map_err(|_| ProcessorError::ExecutableNotFound(interpreter.clone()))?;
                if !self.script.is_file() {
                    return Err(ProcessorError::ExecutableNotFound(
                        self.script.display().to_string(),
                    ));
                }
                Ok((program, vec![self.script.clone().into_os_string()]))
            }
            None => {
                let program = which::which(&self.script).map_err(|_| {
                    ProcessorError::ExecutableNotFound(self.script.display().to_string())
                })?;
                Ok((program, Vec::new()))
            }
        }
    }

    async fn run(
        &self,
        input: &Path,
        output: &Path,
        broll: Option<&str>,
    ) -> ProcessorResult<ProcessedOutput> {
        let (program, leading_args) = self.command_line()?;

        let mut cmd = Command::new(&program);
        cmd.args(&leading_args)
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(broll) = broll {
            cmd.env(BROLL_ENV, broll);
        }

        debug!(
            "Running processor: {} {:?} {} {}",
            program.display(),
            leading_args,
            input.display(),
            output.display()
        );

        let result = cmd.output().await?;
        let stderr = String::from_utf8_lossy(&result.stderr).into_owned();

        if !result.status.success() {
            return Err(ProcessorError::script_failed(
                format!("{} exited with {}", self.script.display(), result.status),
                Some(stderr),
                result.status.code(),
            ));
        }

        if !stderr.trim().is_empty() {
            debug!(stderr = %stderr.trim(), "Processor script stderr");
        }

        let bytes = match tokio::fs::read(output).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProcessorError::MissingOutput(output.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(ProcessedOutput::new(bytes))
    }
}

/// File extension for the transient input file, `mp4` when unusable.
fn input_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "mp4".to_string())
}

fn job_dir(work_dir: &Path) -> std::io::Result<TempDir> {
    std::fs::create_dir_all(work_dir)?;
    tempfile::Builder::new()
        .prefix("vboost-job-")
        .tempdir_in(work_dir)
}

fn close_job_dir(dir: TempDir) {
    let path = dir.path().to_path_buf();
    match dir.close() {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) => warn!("Failed to remove job dir {}: {}", path.display(), e),
    }
}

#[async_trait]
impl VideoProcessor for ScriptProcessor {
    async fn process(&self, request: ProcessRequest) -> ProcessorResult<ProcessedOutput> {
        let work_dir = self.work_dir.clone();
        let dir = tokio::task::spawn_blocking(move || job_dir(&work_dir))
            .await
            .map_err(std::io::Error::other)??;

        let input = dir
            .path()
            .join(format!("input.{}", input_extension(&request.file_name)));
        let output = dir.path().join("output.mp4");

        let result = match tokio::fs::write(&input, &request.bytes).await {
            Ok(()) => {
                info!(
                    job_dir = %dir.path().display(),
                    file_name = %request.file_name,
                    bytes = request.bytes.len(),
                    "Running processor script"
                );
                self.run(&input, &output, request.broll.as_deref()).await
            }
            Err(e) => Err(e.into()),
        };

        close_job_dir(dir);

        result
    }

    async fn check_health(&self) -> ProcessorResult<()> {
        self.command_line().map(|_| ())
    }

    fn backend_name(&self) -> &'static str {
        "script"
    }
}
