use anyhow::Result;
use log::info;

use siyuan_backup::backup;
use siyuan_backup::config::BackupConfig;
use siyuan_backup::logging;

fn main() -> Result<()> {
    let config = BackupConfig::default();

    // Initialize logging; this is the only failure that changes the exit code
    let logging = logging::init(&config.logging)?;

    let report = backup::run(&config);
    info!(
        "Backup finished ({}), see {} for details",
        if report.succeeded() { "success" } else { "failure" },
        logging.log_dir().display()
    );

    // Dropping the logging context flushes queued log lines
    drop(logging);
    Ok(())
}
