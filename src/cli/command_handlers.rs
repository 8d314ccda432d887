use std::{error::Error, path::Path};

use log::{info, warn};

use crate::{git::checkout::CheckoutOptions, Gitsteps};

/// Handler to checkout command
pub fn do_checkout(
    gitsteps: &mut Gitsteps,
    options: CheckoutOptions,
) -> Result<(), Box<dyn Error>> {
    let steps = gitsteps.checkout(&options)?;

    for step in &steps {
        if step.succeeded() {
            info!("{}: ok", step.name);
        } else {
            warn!("{}: {:?}", step.name, step.status);
        }
        for note in &step.notes {
            info!("{note}");
        }
    }

    if let Some(revision) = gitsteps.got_revision() {
        info!("got_revision: {revision}");
    }

    Ok(())
}

/// Handler to count-objects command
pub fn do_count_objects(gitsteps: &mut Gitsteps) -> Result<(), Box<dyn Error>> {
    match gitsteps.count_objects()? {
        Some(report) => {
            for (name, value) in &report {
                println!("{name}: {value}");
            }
        }
        None => info!("count-objects produced no output"),
    }
    Ok(())
}

/// Handler to remote-url command
pub fn do_remote_url(
    gitsteps: &mut Gitsteps,
    remote_name: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    match gitsteps.remote_url(remote_name)? {
        Some(url) => println!("{url}"),
        None => warn!("remote has no configured url"),
    }
    Ok(())
}

/// Handler to timestamp command
pub fn do_timestamp(gitsteps: &mut Gitsteps, commit: &str) -> Result<(), Box<dyn Error>> {
    let timestamp = gitsteps.timestamp(commit)?;
    println!("{timestamp}");
    Ok(())
}

/// Handler to bundle command
pub fn do_bundle(
    gitsteps: &mut Gitsteps,
    path: &Path,
    rev_list_args: &[String],
) -> Result<(), Box<dyn Error>> {
    gitsteps.bundle(path, rev_list_args)?;
    info!("Wrote bundle to {}", path.display());
    Ok(())
}
