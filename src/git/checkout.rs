use std::path::PathBuf;

use log::debug;

use crate::host::BuildHost;

use super::{refs, Git, GitError, InvokeOptions, StepResult, DEFAULT_REMOTE};

/// Options for one full checkout sequence. Defaults mirror a plain CI
/// checkout: submodules on, errors fatal, everything else off.
#[derive(Debug, Clone)]
pub struct CheckoutOptions {
    /// URL of the remote repo to use as upstream.
    pub url: String,
    /// Ref to fetch and check out; the configured default branch when absent.
    pub git_ref: Option<String>,
    /// Directory to clone into; derived from the URL when absent.
    pub dir_path: Option<PathBuf>,
    /// Fetch with `--recurse-submodules`.
    pub recursive: bool,
    /// Sync and update submodules after the checkout.
    pub submodules: bool,
    /// Update submodules with `--force`.
    pub submodule_update_force: bool,
    /// Gitignore-style patterns excluded from `git clean`.
    pub keep_paths: Vec<String>,
    /// Suffix added to each step name, rendered as ` (<suffix>)`.
    pub step_suffix: Option<String>,
    /// Dump a `GIT_CURL_VERBOSE=1` trace of the fetch to this file.
    pub curl_trace_file: Option<PathBuf>,
    /// When off, fetch/checkout/clean/submodule failures are recorded instead
    /// of aborting the sequence.
    pub can_fail_build: bool,
    /// Resolve HEAD after the checkout and publish it as `got_revision`.
    pub set_got_revision: bool,
    /// Git remote to use, `origin` by default.
    pub remote_name: Option<String>,
    /// Run `git count-objects` before and after the fetch and report the
    /// delta. Adds two more steps.
    pub display_fetch_size: bool,
    /// Restrict the checkout to a single file.
    pub file_name: Option<String>,
    /// Update submodules with `--recursive`.
    pub submodule_update_recursive: bool,
}

impl CheckoutOptions {
    pub fn new(url: impl Into<String>) -> Self {
        CheckoutOptions {
            url: url.into(),
            git_ref: None,
            dir_path: None,
            recursive: false,
            submodules: true,
            submodule_update_force: false,
            keep_paths: Vec::new(),
            step_suffix: None,
            curl_trace_file: None,
            can_fail_build: true,
            set_got_revision: false,
            remote_name: None,
            display_fetch_size: false,
            file_name: None,
            submodule_update_recursive: true,
        }
    }
}

/// Default checkout directory name for a repository URL: the last path
/// segment, with a `.git` suffix stripped. A URL ending in a separator (e.g.
/// `ssh://host/foobar/.git`) re-derives the name from the remaining segment.
fn default_dir_path(url: &str) -> PathBuf {
    let last = url.rsplit('/').next().unwrap_or(url);
    let name = last.strip_suffix(".git").unwrap_or(last);
    if !name.is_empty() {
        return PathBuf::from(name);
    }
    let remainder = url[..url.len() - last.len()].trim_end_matches('/');
    PathBuf::from(remainder.rsplit('/').next().unwrap_or(remainder))
}

impl<H: BuildHost> Git<H> {
    /// Performs a full git checkout: setup, fetch, checkout, clean and
    /// optionally submodule sync/update, returning each step's result in
    /// execution order.
    pub fn checkout(&mut self, options: &CheckoutOptions) -> Result<Vec<StepResult>, GitError> {
        let remote_name = options.remote_name.as_deref().unwrap_or(DEFAULT_REMOTE);
        let dir_path = match &options.dir_path {
            Some(path) if !path.as_os_str().is_empty() => path.clone(),
            _ => default_dir_path(&options.url),
        };
        self.remember_checkout_path(dir_path.clone());

        let suffix = options
            .step_suffix
            .as_deref()
            .map(|s| format!(" ({s})"))
            .unwrap_or_default();
        let at = |name: Option<String>| InvokeOptions {
            name,
            cwd: Some(dir_path.clone()),
            can_fail_build: options.can_fail_build,
            ..Default::default()
        };

        let mut steps = Vec::new();

        // Setup: make sure the repository exists and its remote points at the
        // requested URL. Both invocations are idempotent.
        std::fs::create_dir_all(&dir_path)?;
        steps.push(self.invoke(["init"], at(Some(format!("git setup{suffix}"))))?);
        steps.push(self.invoke(
            [
                "config".to_string(),
                format!("remote.{remote_name}.url"),
                options.url.clone(),
            ],
            at(Some(format!("git setup remote{suffix}"))),
        )?);

        let default_branch = self
            .host
            .property("branch")
            .or_else(|| self.default_branch.clone());
        let resolved = refs::resolve(
            options.git_ref.as_deref(),
            default_branch.as_deref(),
            remote_name,
        );
        debug!(
            "resolved ref {:?} to fetch {:?} from {}, checkout {}",
            options.git_ref, resolved.fetch_ref, resolved.fetch_remote, resolved.checkout_ref
        );

        let fetch_step_name = format!("git fetch{suffix}");

        let before = if options.display_fetch_size {
            let outcome = self.count_objects(
                None,
                InvokeOptions {
                    can_fail_build: false,
                    ..at(Some(format!("count-objects before {fetch_step_name}")))
                },
            )?;
            steps.push(outcome.step);
            outcome.report
        } else {
            None
        };

        let mut fetch_args = vec![
            "retry".to_string(),
            "fetch".to_string(),
            resolved.fetch_remote.clone(),
        ];
        if let Some(fetch_ref) = &resolved.fetch_ref {
            fetch_args.push(fetch_ref.clone());
        }
        if options.recursive {
            fetch_args.push("--recurse-submodules".to_string());
        }
        let mut fetch_options = at(Some(fetch_step_name.clone()));
        if let Some(trace_file) = &options.curl_trace_file {
            fetch_options
                .env
                .push(("GIT_CURL_VERBOSE".to_string(), "1".to_string()));
            fetch_options.stderr_file = Some(trace_file.clone());
        }
        steps.push(self.invoke(fetch_args, fetch_options)?);

        if options.display_fetch_size {
            let outcome = self.count_objects(
                before.as_ref(),
                InvokeOptions {
                    can_fail_build: false,
                    ..at(Some(format!("count-objects after {fetch_step_name}")))
                },
            )?;
            steps.push(outcome.step);
        }

        let mut checkout_args = vec![
            "checkout".to_string(),
            "-f".to_string(),
            resolved.checkout_ref.clone(),
        ];
        if let Some(file_name) = &options.file_name {
            checkout_args.push("--".to_string());
            checkout_args.push(file_name.clone());
        }
        steps.push(self.invoke(checkout_args, at(Some(format!("git checkout{suffix}"))))?);

        if options.set_got_revision {
            let result = self.invoke(
                ["rev-parse", "HEAD"],
                InvokeOptions {
                    capture_stdout: true,
                    can_fail_build: false,
                    ..at(Some("set got_revision".to_string()))
                },
            )?;
            if result.succeeded() {
                if let Some(stdout) = &result.stdout {
                    self.host
                        .set_property("got_revision", stdout.trim().to_string());
                }
            }
            steps.push(result);
        }

        let mut clean_args = vec![
            "clean".to_string(),
            "-f".to_string(),
            "-d".to_string(),
            "-x".to_string(),
        ];
        for path in &options.keep_paths {
            clean_args.push("-e".to_string());
            clean_args.push(path.clone());
        }
        steps.push(self.invoke(clean_args, at(Some(format!("git clean{suffix}"))))?);

        if options.submodules {
            steps.push(self.invoke(
                ["submodule", "sync"],
                at(Some(format!("submodule sync{suffix}"))),
            )?);
            let mut update_args = vec![
                "submodule".to_string(),
                "update".to_string(),
                "--init".to_string(),
            ];
            if options.submodule_update_recursive {
                update_args.push("--recursive".to_string());
            }
            if options.submodule_update_force {
                update_args.push("--force".to_string());
            }
            steps.push(self.invoke(update_args, at(Some(format!("submodule update{suffix}"))))?);
        }

        Ok(steps)
    }
}
