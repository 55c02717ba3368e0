use std::io::Write;

use log::LevelFilter;

/// Log to stderr as `[timestamp][LEVEL] message`. The level comes from
/// `RUST_LOG` unless overridden on the command line.
pub fn setup_logging(level: Option<LevelFilter>) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}][{}] {}",
            buf.timestamp_seconds(),
            record.level(),
            record.args()
        )
    });

    if let Some(level) = level {
        builder.filter_level(level);
    }

    builder.try_init()?;
    Ok(())
}
