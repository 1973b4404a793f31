//! Diagnostic logging to stderr
//!
//! Standard output is reserved for the single result value a tool prints, so
//! every log line goes to stderr.

use std::io::Write;

use env_logger::{Builder, Env, Target};

/// Install the `[LEVEL] message` logger; `RUST_LOG` overrides the `info` default.
pub fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .target(Target::Stderr)
        .try_init();
}
