use std::path::PathBuf;
use std::time::SystemTime;

use color_eyre::{Result, eyre::Context};
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

/// Install the global logger.
///
/// Console output is colored and filtered by `console_level`; when `log_file`
/// is set every record at or above `file_level` is also appended there.
pub fn setup_logging(
    console_level: LevelFilter,
    log_file: Option<PathBuf>,
    file_level: LevelFilter,
) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::BrightBlack);

    let console = fern::Dispatch::new()
        .level(console_level)
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} {} [{}] {}",
                humantime::format_rfc3339_seconds(SystemTime::now()),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .chain(std::io::stdout());

    let mut dispatch = fern::Dispatch::new()
        // Noisy dependencies stay at warn unless asked for explicitly
        .level_for("sqlx", LevelFilter::Warn)
        .level_for("hyper", LevelFilter::Warn)
        .chain(console);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).context(format!(
                "Failed to create log directory: {}",
                parent.display()
            ))?;
        }

        let file = fern::Dispatch::new()
            .level(file_level)
            .format(|out, message, record| {
                out.finish(format_args!(
                    "{} {}: {} [in {}:{}]",
                    humantime::format_rfc3339_seconds(SystemTime::now()),
                    record.level(),
                    message,
                    record.file().unwrap_or("?"),
                    record.line().unwrap_or(0)
                ))
            })
            .chain(
                fern::log_file(&path)
                    .context(format!("Failed to open log file: {}", path.display()))?,
            );
        dispatch = dispatch.chain(file);
    }

    dispatch
        .apply()
        .context("Failed to install logger")?;

    Ok(())
}
