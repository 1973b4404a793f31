//! Generate vcpkg port files for a release, or print the package name.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use port_release::{PortGenerator, PortInputs, cli};

#[derive(Parser)]
#[command(
    name = "generate-port-files",
    about = "Generate vcpkg port files or extract the package name"
)]
struct Cli {
    /// Print only the package name from source_extracted/vcpkg.json
    #[arg(long)]
    get_name: bool,

    /// Directory containing source_extracted/ and registry/
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

fn main() -> ExitCode {
    let args: Cli = match cli::parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };
    let generator = PortGenerator::new(&args.root);

    if args.get_name {
        cli::run(|| {
            let name = generator
                .package_name()
                .context("Cannot determine package name")?;
            println!("{name}");
            Ok(())
        })
    } else {
        cli::run(|| generate(&generator))
    }
}

fn generate(generator: &PortGenerator) -> Result<()> {
    info!("Starting port file generation...");

    let inputs = PortInputs::from_env().context("Invalid release inputs")?;
    info!("Repository: {}", inputs.repository);
    info!("Package name: {}", inputs.repo_name);
    info!("Version: {}", inputs.tag_version);
    info!("Hash: {}", inputs.hash_preview());

    let port = generator
        .generate(&inputs)
        .context("Port file generation failed")?;

    info!(
        "Generated port files for {} {}",
        port.manifest.name, inputs.tag_version
    );
    info!("   - {}", port.portfile.display());
    info!("   - {}", port.manifest_path.display());
    Ok(())
}
