use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use sensor_dashboard_sync::api::{ApiEndpoint, HttpApi};
use sensor_dashboard_sync::render::LogRenderer;
use sensor_dashboard_sync::{Command, DashboardConfig, ViewController};

/// Forward parsed stdin lines to the controller
async fn read_commands(tx: mpsc::UnboundedSender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => match line.parse::<Command>() {
                Ok(command) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("{}", e),
            },
            Ok(None) => {
                info!("stdin closed, commands disabled");
                break;
            }
            Err(e) => {
                error!("Failed to read command: {}", e);
                break;
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match DashboardConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let endpoint = ApiEndpoint::from_config(&config)?;
    let mut controller = ViewController::new(HttpApi::new(endpoint), LogRenderer, &config);

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    if let Some(company_id) = config.company_id {
        command_tx.send(Command::SelectCompany(company_id))?;
    }
    // main holds on to command_tx so a closed stdin does not end the run
    tokio::spawn(read_commands(command_tx.clone()));

    // Handle Ctrl+C gracefully
    let (tx, mut rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        let _ = tx.send(());
    });

    // Run the controller or wait for shutdown signal
    tokio::select! {
        _ = controller.run(command_rx) => {
            info!("Program completed successfully");
        }
        _ = &mut rx => {
            info!("Program terminated by user. Exiting gracefully.");
        }
    }

    Ok(())
}
