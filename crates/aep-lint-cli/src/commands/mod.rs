//! Subcommand implementations.

pub mod check;
pub mod init;
pub mod list_rules;
pub mod output;

use aep_lint::{CheckIdCollision, ConfigError, DescriptorError, EngineError};

/// Prints a fatal error to stderr.
///
/// Library errors carry diagnostic codes and help text, so they are
/// rendered through miette; anything else falls back to the error chain.
pub fn report(err: anyhow::Error) {
    let err = match err.downcast::<ConfigError>() {
        Ok(e) => return eprintln!("{:?}", miette::Report::new(e)),
        Err(err) => err,
    };
    let err = match err.downcast::<DescriptorError>() {
        Ok(e) => return eprintln!("{:?}", miette::Report::new(e)),
        Err(err) => err,
    };
    let err = match err.downcast::<EngineError>() {
        Ok(e) => return eprintln!("{:?}", miette::Report::new(e)),
        Err(err) => err,
    };
    let err = match err.downcast::<CheckIdCollision>() {
        Ok(e) => return eprintln!("{:?}", miette::Report::new(e)),
        Err(err) => err,
    };
    eprintln!("Error: {err:?}");
}
