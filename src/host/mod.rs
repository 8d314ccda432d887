use std::{
    collections::HashMap,
    path::PathBuf,
    process::{Command, Stdio},
};

use log::{debug, info, warn};
use thiserror::Error;

#[cfg(test)]
pub mod testing;

/// One external command to run on behalf of the orchestrator.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    pub capture_stdout: bool,
    /// Captured stderr is additionally written to this file.
    pub stderr_file: Option<PathBuf>,
    pub step_name: String,
    pub infra_step: bool,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub success: bool,
    pub stdout: Option<String>,
    pub stderr: String,
}

#[derive(Error, Debug)]
pub enum HostError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

/// Capability set supplied by the build framework hosting the orchestration:
/// step execution, a named property store and tool path resolution.
pub trait BuildHost {
    fn run(&mut self, invocation: &Invocation) -> Result<RunOutput, HostError>;
    fn property(&self, name: &str) -> Option<String>;
    fn set_property(&mut self, name: &str, value: String);
    fn resolve_tool(&self, name: &str) -> Option<PathBuf>;
}

/// Real host backed by `std::process::Command` and an in-memory property map.
/// Each invocation blocks until the child exits.
#[derive(Default)]
pub struct ProcessHost {
    properties: HashMap<String, String>,
    tools: HashMap<String, PathBuf>,
}

impl ProcessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resolvable tool path, e.g. a `git.bat` shim on Windows.
    pub fn with_tool(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.tools.insert(name.into(), path.into());
        self
    }
}

impl BuildHost for ProcessHost {
    fn run(&mut self, invocation: &Invocation) -> Result<RunOutput, HostError> {
        if invocation.infra_step {
            info!(target: "step", "{}", invocation.step_name);
        } else {
            debug!(target: "step", "{}", invocation.step_name);
        }

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }
        for (key, value) in &invocation.env {
            command.env(key, value);
        }

        let output = command.output().map_err(|source| HostError::Spawn {
            program: invocation.program.display().to_string(),
            source,
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if let Some(path) = &invocation.stderr_file {
            std::fs::write(path, &stderr)?;
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            warn!(
                "step `{}` exited with {}",
                invocation.step_name, output.status
            );
        }
        if !invocation.capture_stdout && !stdout.is_empty() {
            debug!("{}", stdout.trim_end());
        }

        Ok(RunOutput {
            success: output.status.success(),
            stdout: invocation.capture_stdout.then_some(stdout),
            stderr,
        })
    }

    fn property(&self, name: &str) -> Option<String> {
        self.properties.get(name).cloned()
    }

    fn set_property(&mut self, name: &str, value: String) {
        debug!("property {name} = {value}");
        self.properties.insert(name.to_string(), value);
    }

    fn resolve_tool(&self, name: &str) -> Option<PathBuf> {
        self.tools.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn property_store_roundtrip() {
        let mut host = ProcessHost::new();
        assert_eq!(host.property("got_revision"), None);
        host.set_property("got_revision", "deadbeef".to_string());
        assert_eq!(host.property("got_revision"), Some("deadbeef".to_string()));
    }

    #[test]
    fn tool_resolution() {
        let host = ProcessHost::new().with_tool("git.bat", "C:/depot_tools/git.bat");
        assert_eq!(
            host.resolve_tool("git.bat"),
            Some(PathBuf::from("C:/depot_tools/git.bat"))
        );
        assert_eq!(host.resolve_tool("hg"), None);
    }
}
