//! Progress logging through the `log` facade.
//!
//! The crate never installs a logger. Progress lines go to `info` when the
//! caller asked for verbose output and to `debug` otherwise, so verbosity
//! never changes what the solvers compute.

macro_rules! progress {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            log::info!($($arg)+);
        } else {
            log::debug!($($arg)+);
        }
    };
}

pub(crate) use progress;
