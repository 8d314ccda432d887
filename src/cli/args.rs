use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Git checkout step orchestration for CI builders.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Command,
    /// Working directory for git commands
    #[clap(short, long)]
    pub workdir: Option<PathBuf>,
    /// Branch fetched when no ref is given
    #[clap(short, long, env = "GITSTEPS_CHECKOUT_BRANCH")]
    pub branch: Option<String>,
    /// Path of the git binary to invoke
    #[clap(long, env = "GITSTEPS_GIT_COMMAND")]
    pub git_command: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    ///Performs a full fetch/checkout/clean/submodule sequence
    Checkout {
        /// URL of the remote repo to use as upstream
        #[clap(long)]
        url: String,
        /// Ref to fetch and check out
        #[clap(long = "ref")]
        git_ref: Option<String>,
        /// Directory to clone into (derived from the URL by default)
        #[clap(long)]
        dir: Option<PathBuf>,
        /// Fetch with --recurse-submodules
        #[clap(long)]
        recursive: bool,
        /// Skip submodule sync and update
        #[clap(long)]
        no_submodules: bool,
        /// Update submodules with --force
        #[clap(long)]
        submodule_force: bool,
        /// Do not update submodules recursively
        #[clap(long)]
        no_submodule_recursive: bool,
        /// Paths to keep during git clean (repeatable)
        #[clap(long = "keep")]
        keep_paths: Vec<String>,
        /// Suffix added to each step name
        #[clap(long)]
        step_suffix: Option<String>,
        /// Dump a GIT_CURL_VERBOSE=1 trace of the fetch to this file
        #[clap(long)]
        curl_trace_file: Option<PathBuf>,
        /// Record fetch/checkout failures instead of aborting
        #[clap(long)]
        ignore_errors: bool,
        /// Resolve HEAD after checkout and report it as got_revision
        #[clap(long)]
        set_got_revision: bool,
        /// Name of the git remote to use
        #[clap(long, env = "GITSTEPS_CHECKOUT_REMOTE")]
        remote: Option<String>,
        /// Run count-objects before and after the fetch and report the delta
        #[clap(long)]
        display_fetch_size: bool,
        /// Restrict the checkout to a single file
        #[clap(long)]
        file: Option<String>,
    },
    ///Prints the object-count report of the repository
    CountObjects,
    ///Prints the URL of a git remote
    RemoteUrl {
        #[clap(short, long, env = "GITSTEPS_CHECKOUT_REMOTE")]
        remote: Option<String>,
    },
    ///Prints the timestamp of a commit
    Timestamp {
        #[clap(default_value = "HEAD")]
        commit: String,
    },
    ///Creates a git bundle
    Bundle {
        path: PathBuf,
        /// rev-list arguments selecting what to bundle (defaults to --all)
        #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
        rev_list_args: Vec<String>,
    },
}
