use std::error::Error;

use clap::Parser;

use gitsteps::{
    cli::{
        args::{CliArgs, Command},
        command_handlers::{do_bundle, do_checkout, do_count_objects, do_remote_url, do_timestamp},
    },
    git::checkout::CheckoutOptions,
    Gitsteps,
};

fn run() -> Result<(), Box<dyn Error>> {
    let cli_args = CliArgs::parse();

    let mut builder = Gitsteps::builder();
    if let Some(workdir) = cli_args.workdir {
        builder = builder.workdir(workdir);
    }
    if let Some(branch) = cli_args.branch {
        builder = builder.default_branch(branch);
    }
    if let Some(git_command) = cli_args.git_command {
        builder = builder.git_command(git_command);
    }
    let mut gitsteps = builder.try_build()?;

    match cli_args.cmd {
        Command::Checkout {
            url,
            git_ref,
            dir,
            recursive,
            no_submodules,
            submodule_force,
            no_submodule_recursive,
            keep_paths,
            step_suffix,
            curl_trace_file,
            ignore_errors,
            set_got_revision,
            remote,
            display_fetch_size,
            file,
        } => {
            let options = CheckoutOptions {
                git_ref,
                dir_path: dir,
                recursive,
                submodules: !no_submodules,
                submodule_update_force: submodule_force,
                keep_paths,
                step_suffix,
                curl_trace_file,
                can_fail_build: !ignore_errors,
                set_got_revision,
                remote_name: remote,
                display_fetch_size,
                file_name: file,
                submodule_update_recursive: !no_submodule_recursive,
                ..CheckoutOptions::new(url)
            };
            do_checkout(&mut gitsteps, options)
        }
        Command::CountObjects => do_count_objects(&mut gitsteps),
        Command::RemoteUrl { remote } => do_remote_url(&mut gitsteps, remote.as_deref()),
        Command::Timestamp { commit } => do_timestamp(&mut gitsteps, &commit),
        Command::Bundle {
            path,
            rev_list_args,
        } => do_bundle(&mut gitsteps, &path, &rev_list_args),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
