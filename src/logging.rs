use env_logger::{Builder, Env};

/// Install an `env_logger` backend for the `log` facade.
///
/// `RUST_LOG` wins when set; otherwise `info` is used. Calling this twice is
/// harmless, the second installation is ignored.
pub fn init_logging() {
    init_logging_with_default("info");
}

pub fn init_logging_with_default(default_filter: &str) {
    let result = Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .format_module_path(false)
        .try_init();

    if result.is_err() {
        log::debug!("logger already initialized");
    }
}
