use std::io::Write;

use env_logger::{Env, WriteStyle};

/// One-line log format; `RUST_LOG` overrides the default `info` filter.
pub fn try_init() -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[CARTCLASH | {}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .write_style(WriteStyle::Auto)
        .try_init()
}
