pub mod checkout;
pub mod objects;
pub mod refs;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use log::warn;
use thiserror::Error;

use crate::host::{BuildHost, HostError, Invocation};

pub const DEFAULT_REMOTE: &str = "origin";

#[derive(Error, Debug)]
pub enum GitError {
    #[error("step `{step}` failed")]
    CommandFailure { step: String, result: StepResult },
    #[error("count-objects report line is not `name: value`: {line:?}")]
    MalformedReport { line: String },
    #[error("count-objects failed: {0}")]
    Infra(String),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Success,
    Failure,
    Warning,
}

/// Outcome of a single git invocation, recorded in order by the sequencer.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub name: String,
    pub status: StepStatus,
    pub stdout: Option<String>,
    /// Human-readable diagnostics attached to the step.
    pub notes: Vec<String>,
}

impl StepResult {
    pub fn succeeded(&self) -> bool {
        self.status == StepStatus::Success
    }
}

/// Per-invocation knobs. `can_fail_build` decides whether a non-zero exit
/// aborts the orchestration or hands back the failed result instead.
#[derive(Debug, Clone)]
pub struct InvokeOptions {
    pub name: Option<String>,
    pub cwd: Option<PathBuf>,
    /// Rendered as `-c key=value` before the subcommand, in key order.
    pub git_config_options: BTreeMap<String, String>,
    pub env: Vec<(String, String)>,
    pub capture_stdout: bool,
    pub stderr_file: Option<PathBuf>,
    pub can_fail_build: bool,
    pub infra_step: bool,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        InvokeOptions {
            name: None,
            cwd: None,
            git_config_options: BTreeMap::new(),
            env: Vec::new(),
            capture_stdout: false,
            stderr_file: None,
            can_fail_build: true,
            infra_step: true,
        }
    }
}

/// Issues git commands through an injected [`BuildHost`]. Holds the explicit
/// orchestration state that the steps share: the current checkout path (set at
/// most once per target) and the configured defaults.
pub struct Git<H> {
    host: H,
    checkout_path: Option<PathBuf>,
    default_branch: Option<String>,
    git_command: Option<PathBuf>,
}

impl<H: BuildHost> Git<H> {
    pub fn new(host: H) -> Self {
        Git {
            host,
            checkout_path: None,
            default_branch: None,
            git_command: None,
        }
    }

    /// Overrides the git binary; wins over platform tool resolution.
    pub fn git_command(mut self, path: Option<PathBuf>) -> Self {
        self.git_command = path;
        self
    }

    /// Branch fetched when a checkout is requested without a ref.
    pub fn default_branch(mut self, branch: Option<String>) -> Self {
        self.default_branch = branch;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn checkout_path(&self) -> Option<&Path> {
        self.checkout_path.as_deref()
    }

    pub(crate) fn remember_checkout_path(&mut self, path: PathBuf) {
        if self.checkout_path.is_none() {
            self.checkout_path = Some(path);
        }
    }

    fn program(&self) -> PathBuf {
        if let Some(command) = &self.git_command {
            return command.clone();
        }
        if cfg!(windows) {
            if let Some(tool) = self.host.resolve_tool("git.bat") {
                return tool;
            }
        }
        PathBuf::from("git")
    }

    /// Runs one git command as a named infrastructure step.
    ///
    /// The step name defaults to `git <subcommand>` and the working directory
    /// to the current checkout path. A non-zero exit becomes
    /// [`GitError::CommandFailure`] unless `can_fail_build` is off, in which
    /// case the failed [`StepResult`] is returned for inspection.
    pub fn invoke<I, S>(&mut self, args: I, options: InvokeOptions) -> Result<StepResult, GitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let name = options.name.unwrap_or_else(|| {
            format!("git {}", args.first().map(String::as_str).unwrap_or(""))
        });

        let mut argv = Vec::with_capacity(args.len() + 2 * options.git_config_options.len());
        for (key, value) in &options.git_config_options {
            argv.push("-c".to_string());
            argv.push(format!("{key}={value}"));
        }
        argv.extend(args);

        let invocation = Invocation {
            program: self.program(),
            args: argv,
            cwd: options.cwd.or_else(|| self.checkout_path.clone()),
            env: options.env,
            capture_stdout: options.capture_stdout,
            stderr_file: options.stderr_file,
            step_name: name.clone(),
            infra_step: options.infra_step,
        };
        let output = self.host.run(&invocation)?;

        let mut result = StepResult {
            name,
            status: if output.success {
                StepStatus::Success
            } else {
                StepStatus::Failure
            },
            stdout: output.stdout,
            notes: Vec::new(),
        };
        if !output.success {
            if !output.stderr.is_empty() {
                result.notes.push(output.stderr.trim_end().to_string());
            }
            if options.can_fail_build {
                return Err(GitError::CommandFailure {
                    step: result.name.clone(),
                    result,
                });
            }
        }
        Ok(result)
    }

    /// Fetches all tags from the remote.
    pub fn fetch_tags(&mut self, remote_name: Option<&str>) -> Result<StepResult, GitError> {
        let remote = remote_name.unwrap_or(DEFAULT_REMOTE);
        self.invoke(
            ["fetch", remote, "--tags"],
            InvokeOptions {
                name: Some("git fetch tags".to_string()),
                ..Default::default()
            },
        )
    }

    /// Outputs the contents of a file at a given revision.
    pub fn cat_file_at_commit(
        &mut self,
        file_path: &str,
        commit_hash: &str,
        remote_name: Option<&str>,
    ) -> Result<StepResult, GitError> {
        self.fetch_tags(remote_name)?;
        let spec = format!("{commit_hash}:{file_path}");
        self.invoke(
            ["cat-file".to_string(), "blob".to_string(), spec.clone()],
            InvokeOptions {
                name: Some(format!("git cat-file {spec}")),
                capture_stdout: true,
                ..Default::default()
            },
        )
    }

    /// Finds and returns the timestamp of the given commit.
    pub fn get_timestamp(&mut self, commit: &str) -> Result<String, GitError> {
        let result = self.invoke(
            ["show", commit, "--format=%at", "-s"],
            InvokeOptions {
                capture_stdout: true,
                ..Default::default()
            },
        )?;
        Ok(result.stdout.unwrap_or_default().trim_end().to_string())
    }

    /// Rebases HEAD onto `<remote>/<branch>`. On failure the in-progress
    /// rebase is aborted before the error propagates, so the working tree is
    /// never left in a conflicted state.
    pub fn rebase(
        &mut self,
        name_prefix: &str,
        branch: &str,
        dir_path: &Path,
        remote_name: Option<&str>,
    ) -> Result<StepResult, GitError> {
        let remote = remote_name.unwrap_or(DEFAULT_REMOTE);
        let onto = format!("{remote}/{branch}");
        match self.invoke(
            ["rebase".to_string(), onto],
            InvokeOptions {
                name: Some(format!("{name_prefix} rebase")),
                cwd: Some(dir_path.to_path_buf()),
                ..Default::default()
            },
        ) {
            Ok(result) => Ok(result),
            Err(error) => {
                if let Err(abort_error) = self.invoke(
                    ["rebase", "--abort"],
                    InvokeOptions {
                        name: Some(format!("{name_prefix} rebase abort")),
                        cwd: Some(dir_path.to_path_buf()),
                        can_fail_build: false,
                        ..Default::default()
                    },
                ) {
                    warn!("could not abort failed rebase: {abort_error}");
                }
                Err(error)
            }
        }
    }

    /// Returns the value of a git config property, or `None` if the lookup
    /// produced no output.
    pub fn config_get(
        &mut self,
        prop_name: &str,
        options: InvokeOptions,
    ) -> Result<Option<String>, GitError> {
        let result = self.invoke(
            ["config", "--get", prop_name],
            InvokeOptions {
                name: options
                    .name
                    .or_else(|| Some(format!("git config {prop_name}"))),
                capture_stdout: true,
                ..options
            },
        )?;
        Ok(result
            .stdout
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string))
    }

    /// Returns the URL of the remote repository, or `None`.
    pub fn get_remote_url(&mut self, remote_name: Option<&str>) -> Result<Option<String>, GitError> {
        let remote = remote_name.unwrap_or(DEFAULT_REMOTE);
        self.config_get(&format!("remote.{remote}.url"), InvokeOptions::default())
    }

    /// Runs `git bundle create` with the given rev-list args, defaulting to
    /// all refs.
    pub fn bundle_create(
        &mut self,
        bundle_path: &Path,
        rev_list_args: &[String],
    ) -> Result<StepResult, GitError> {
        let mut args = vec![
            "bundle".to_string(),
            "create".to_string(),
            bundle_path.display().to_string(),
        ];
        if rev_list_args.is_empty() {
            args.push("--all".to_string());
        } else {
            args.extend(rev_list_args.iter().cloned());
        }
        self.invoke(args, InvokeOptions::default())
    }
}
