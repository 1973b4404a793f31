//! Print the version declared in `vcpkg.json`, without a trailing newline,
//! for shell capture in the release-tag workflow.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use port_release::{MANIFEST_FILE, Manifest, cli};

#[derive(Parser)]
#[command(name = "extract-version", about = "Print the version declared in vcpkg.json")]
struct Cli {
    /// Directory containing vcpkg.json
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

fn main() -> ExitCode {
    let args: Cli = match cli::parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };

    cli::run(|| {
        let path = args.root.join(MANIFEST_FILE);
        let manifest =
            Manifest::load(&path).with_context(|| format!("Error reading {}", path.display()))?;
        let version = manifest
            .version()
            .with_context(|| format!("No version found in {}", path.display()))?;

        let mut stdout = io::stdout().lock();
        stdout.write_all(version.as_bytes())?;
        stdout.flush()?;
        Ok(())
    })
}
