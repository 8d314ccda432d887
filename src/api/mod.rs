use std::{error::Error, path::Path};

use crate::{
    git::{
        checkout::CheckoutOptions,
        objects::ObjectCountReport,
        Git, GitError, InvokeOptions, StepResult,
    },
    host::{BuildHost, ProcessHost},
};

mod builder;

pub use builder::GitstepsBuilder;

/// Facade over the orchestrator, wired to the real process host.
pub struct Gitsteps {
    git: Git<ProcessHost>,
}

impl Gitsteps {
    pub fn builder() -> GitstepsBuilder {
        GitstepsBuilder::default()
    }

    pub(crate) fn new(git: Git<ProcessHost>) -> Self {
        Gitsteps { git }
    }

    /// Performs a full fetch/checkout/clean/submodule sequence.
    pub fn checkout(
        &mut self,
        options: &CheckoutOptions,
    ) -> Result<Vec<StepResult>, Box<dyn Error>> {
        Ok(self.git.checkout(options)?)
    }

    /// Runs the object-count diagnostic on the current working directory.
    pub fn count_objects(&mut self) -> Result<Option<ObjectCountReport>, GitError> {
        let outcome = self.git.count_objects(
            None,
            InvokeOptions {
                can_fail_build: false,
                ..Default::default()
            },
        )?;
        Ok(outcome.report)
    }

    /// Returns the URL of a git remote, or `None` when unset.
    pub fn remote_url(&mut self, remote_name: Option<&str>) -> Result<Option<String>, GitError> {
        self.git.get_remote_url(remote_name)
    }

    /// Returns the timestamp of the given commit.
    pub fn timestamp(&mut self, commit: &str) -> Result<String, GitError> {
        self.git.get_timestamp(commit)
    }

    /// Creates a git bundle at the given path.
    pub fn bundle(
        &mut self,
        bundle_path: &Path,
        rev_list_args: &[String],
    ) -> Result<StepResult, GitError> {
        self.git.bundle_create(bundle_path, rev_list_args)
    }

    /// The revision captured by the latest `set_got_revision` checkout.
    pub fn got_revision(&self) -> Option<String> {
        self.git.host().property("got_revision")
    }
}
