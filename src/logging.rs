use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;

use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Terminal log level for a `-v` count.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Directory holding the run log: `~/.local/share/tool-migrate`.
pub fn log_dir() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".local/share/tool-migrate"))
}

/// Install the global logger: stderr at the level chosen by `verbosity`, plus
/// an info-level append log under [`log_dir`].
/// Best-effort: a missing or unwritable log file only drops the file sink,
/// and a second call is ignored.
pub fn init(verbosity: u8) {
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level_for(verbosity),
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(file) = open_log_file() {
        loggers.push(WriteLogger::new(LevelFilter::Info, config, file));
    }

    let _ = CombinedLogger::init(loggers);
}

fn open_log_file() -> Option<File> {
    let dir = log_dir()?;
    fs::create_dir_all(&dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("migrate.log"))
        .ok()
}
