//! Process boundary shared by the binaries
//!
//! Every failure, including a panic, ends here: it is logged with context and
//! turned into exit code 1. Nothing but the exit code and the log leaves the
//! process.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::ffi::OsString;
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;

use clap::Parser;
use log::error;

use crate::{PortError, logging};

/// Parse the process arguments.
///
/// `Err` carries the code to exit with: 0 after `--help`/`--version` output,
/// 1 for a usage error.
pub fn parse_args<P: Parser>() -> Result<P, ExitCode> {
    parse_args_from(std::env::args_os())
}

pub fn parse_args_from<P, I, T>(args: I) -> Result<P, ExitCode>
where
    P: Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    P::try_parse_from(args).map_err(|err| {
        // usage errors go to stderr, help and version to stdout
        let _ = err.print();
        if err.use_stderr() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    })
}

/// Run a tool body with logging, panic capture and exit-code mapping
pub fn run(body: impl FnOnce() -> anyhow::Result<()>) -> ExitCode {
    logging::init();
    let previous_hook = panic::take_hook();
    panic::set_hook(Box::new(|info| {
        error!("Unexpected panic: {info}");
        error!("Stack backtrace:\n{}", Backtrace::force_capture());
    }));

    let outcome = panic::catch_unwind(AssertUnwindSafe(body));
    panic::set_hook(previous_hook);

    match outcome {
        Ok(Ok(())) => return ExitCode::SUCCESS,
        Ok(Err(err)) => report(&err),
        // the panic hook has already logged it
        Err(_) => {}
    }

    error!("Script failed with exit code 1");
    ExitCode::FAILURE
}

/// Log a failure; conditions outside the expected taxonomy get full detail.
pub fn report(err: &anyhow::Error) {
    error!("{err:#}");

    if is_unexpected(err) {
        error!("Error detail: {err:?}");
        if err.backtrace().status() != BacktraceStatus::Captured {
            error!("Stack backtrace:\n{}", Backtrace::force_capture());
        }
    }
}

pub fn is_unexpected(err: &anyhow::Error) -> bool {
    err.downcast_ref::<PortError>()
        .is_none_or(PortError::is_unexpected)
}
