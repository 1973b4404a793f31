//! Merge the private registry entry into the project's vcpkg configuration.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::info;

use port_release::registry::DEFAULT_REGISTRY_URL;
use port_release::{MergeInputs, RegistryMerger, cli};

#[derive(Parser)]
#[command(
    name = "merge-registry",
    about = "Add the private registry to vcpkg.json or vcpkg-configuration.json"
)]
struct Cli {
    /// Directory containing vcpkg.json / vcpkg-configuration.json
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Git URL of the private registry
    #[arg(long, default_value = DEFAULT_REGISTRY_URL)]
    registry_url: String,
}

fn main() -> ExitCode {
    let args: Cli = match cli::parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };

    cli::run(|| {
        let inputs = MergeInputs::from_env().context("Invalid merge inputs")?;
        info!("Merging registry with commit hash: {}", inputs.commit_hash);
        info!("vcpkg package name: {}", inputs.package_name);

        let outcome = RegistryMerger::new(&args.root)
            .with_registry_url(&args.registry_url)
            .run(&inputs)
            .context("Registry merge failed")?;

        info!(
            "Successfully merged private registry into {} configuration ({})",
            outcome.format,
            outcome.path.display()
        );
        Ok(())
    })
}
