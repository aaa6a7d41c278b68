// Logging - env_logger setup for the binary

use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Install the global logger. `RUST_LOG` overrides the default
/// `tempo_ramp=info` filter. Safe to call more than once.
pub fn init_logger() {
    let mut builder = Builder::from_env(Env::default().default_filter_or("tempo_ramp=info"));
    builder.filter_module("cpal", LevelFilter::Warn);

    builder.format(|buf, record| {
        let module_path = record.module_path().unwrap_or("<unknown>");
        writeln!(buf, "[{}][{}] {}", record.level(), module_path, record.args())
    });

    let _ = builder.try_init();
}
