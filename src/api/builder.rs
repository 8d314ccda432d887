use std::{error::Error, path::PathBuf};

use crate::{config::GitstepsConfig, git::Git, host::ProcessHost, Gitsteps};

#[derive(Default)]
pub struct GitstepsBuilder {
    workdir: Option<PathBuf>,
    default_branch: Option<String>,
    git_command: Option<PathBuf>,
}

impl GitstepsBuilder {
    /// Working directory for git commands.
    ///
    /// Defaults to the directory a checkout establishes, or the current
    /// directory before any checkout ran.
    pub fn workdir(mut self, path: impl Into<PathBuf>) -> Self {
        self.workdir = Some(path.into());
        self
    }

    /// Branch to fetch when a checkout is requested without a ref.
    ///
    /// Defaults to `GITSTEPS_CHECKOUT_BRANCH`, then `master`.
    pub fn default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = Some(branch.into());
        self
    }

    /// Path of the git binary to invoke.
    ///
    /// Defaults to `GITSTEPS_GIT_COMMAND`, then `git` on the search path.
    pub fn git_command(mut self, path: impl Into<PathBuf>) -> Self {
        self.git_command = Some(path.into());
        self
    }

    pub fn try_build(self) -> Result<Gitsteps, Box<dyn Error>> {
        let Self {
            workdir,
            default_branch,
            git_command,
        } = self;

        let config = GitstepsConfig::load()?;

        let mut git = Git::new(ProcessHost::new())
            .default_branch(default_branch.or(config.default_branch))
            .git_command(git_command.or(config.git_command));
        if let Some(workdir) = workdir {
            git.remember_checkout_path(workdir);
        }

        Ok(Gitsteps::new(git))
    }
}
