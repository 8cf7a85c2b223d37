//! Engine process boundary.
//!
//! The batch runner talks to engines through [`EngineLauncher`] /
//! [`EngineSession`]; [`KataGoLauncher`] is the real implementation,
//! driving `katago analysis` over newline-delimited JSON.

use std::ffi::OsString;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use crate::engine::evaluator::{is_warning, response_id};
use crate::engine::models::{AnalysisQuery, Model};
use crate::error::{EvalError, Result};

/// Starts one engine process per model.
pub trait EngineLauncher {
    fn launch(&self, model: &Model) -> Result<Box<dyn EngineSession>>;
}

/// A running engine configured with one model.
pub trait EngineSession {
    /// Send one query and return the raw response line.
    fn query(&mut self, query: &AnalysisQuery) -> Result<String>;

    /// Close the engine's input and wait for it to exit.
    fn shutdown(self: Box<Self>) -> Result<()>;
}

/// Launches `<engine> analysis -model <model> [-config <cfg>] [extra args]`.
#[derive(Debug, Clone)]
pub struct KataGoLauncher {
    pub engine: PathBuf,
    pub config: Option<PathBuf>,
    pub extra_args: Vec<String>,
    pub show_stderr: bool,
}

impl KataGoLauncher {
    /// Command-line arguments for `model`.
    pub fn args(&self, model: &Model) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["analysis".into(), "-model".into(), model.path.clone().into()];
        if let Some(cfg) = &self.config {
            args.push("-config".into());
            args.push(cfg.clone().into());
        }
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }
}

impl EngineLauncher for KataGoLauncher {
    fn launch(&self, model: &Model) -> Result<Box<dyn EngineSession>> {
        let stderr = if self.show_stderr {
            Stdio::inherit()
        } else {
            Stdio::null()
        };
        let mut child = Command::new(&self.engine)
            .args(self.args(model))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(stderr)
            .spawn()
            .map_err(|source| EvalError::Spawn {
                engine: self.engine.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| EvalError::EngineExited("<startup>".into()))?;

        tracing::debug!(model = %model.name, pid = child.id(), "engine started");
        Ok(Box::new(KataGoSession {
            child,
            stdin,
            stdout,
            model: model.label.clone(),
        }))
    }
}

struct KataGoSession {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    model: String,
}

impl EngineSession for KataGoSession {
    fn query(&mut self, query: &AnalysisQuery) -> Result<String> {
        let line = serde_json::to_string(query)?;
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| EvalError::EngineExited(query.id.clone()))?;
        writeln!(stdin, "{}", line)?;
        stdin.flush()?;

        let mut buf = String::new();
        loop {
            buf.clear();
            if self.stdout.read_line(&mut buf)? == 0 {
                return Err(EvalError::EngineExited(query.id.clone()));
            }
            let response = buf.trim();
            if response.is_empty() {
                continue;
            }
            if is_warning(response) {
                tracing::warn!(model = %self.model, id = %query.id, warning = %response, "engine warning");
                continue;
            }
            // A late answer to an earlier query, pushed back by an extra line.
            if let Some(id) = response_id(response).filter(|id| *id != query.id) {
                tracing::debug!(model = %self.model, id = %query.id, stale_id = %id, "discarding stale response");
                continue;
            }
            return Ok(response.to_string());
        }
    }

    fn shutdown(mut self: Box<Self>) -> Result<()> {
        // EOF on stdin makes the analysis engine finish and exit.
        drop(self.stdin.take());
        let status = self.child.wait()?;
        if !status.success() {
            tracing::warn!(model = %self.model, %status, "engine exited with failure status");
        }
        Ok(())
    }
}

impl Drop for KataGoSession {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
