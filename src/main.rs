use std::sync::Arc;

use clap::Parser;
use log::{error, info, LevelFilter};

use repeat_reminder::{
    describe_interval, Cli, Config, LogSink, NotificationCenter, ReminderManager,
};

pub fn initialize_logger(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp_secs().format_module_path(true).init();

    info!("Logger initialized");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    info!("Application starting up");

    let mut config = Config::load_or_default(cli.config.as_deref());
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let mut center = NotificationCenter::new(&config, Arc::new(LogSink));
    let manager = ReminderManager::open(&config, Arc::new(center.handle()));

    if let Err(e) = center.start().await {
        error!("Failed to start notification center: {}", e);
        return;
    }
    manager.rearm_all();

    for group in manager.groups() {
        info!("Group '{}': {} reminders", group.name, group.reminders.len());
        for reminder in &group.reminders {
            info!(
                "  {} at {} ({})",
                reminder.title,
                reminder.date.format("%Y-%m-%d %H:%M"),
                describe_interval(reminder.repeat_interval)
            );
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    if let Err(e) = center.stop().await {
        error!("Failed to stop notification center: {}", e);
    }

    info!("Application shutting down");
}
