use clap::Parser;
use gnss::{NmeaStreamModule, StreamConfig};
use module_core::{EventKind, Module, ModuleCtx};
use telemetry::{Subscription, TelemetryHandle, TelemetryModule};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Position telemetry daemon.
///
/// The position source defaults to the AFBGPS_HOST, AFBGPS_SERVICE and
/// AFBGPS_ISNMEA environment variables; the options below override them.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Host of the position source.
    #[arg(long)]
    host: Option<String>,
    /// Port number or service name of the position source.
    #[arg(short, long)]
    service: Option<String>,
    /// The source streams raw NMEA, don't send the gpsd watch command.
    #[arg(short = 'n', long)]
    raw_nmea: bool,
    /// Subscribe to a position type and log its notifications as JSON.
    #[arg(short, long, value_name = "TYPE")]
    watch: Option<String>,
    /// Period of the watch subscription in milliseconds.
    #[arg(short, long, value_name = "MS", requires = "watch")]
    period: Option<String>,
}

fn stream_config(cli: &Cli) -> StreamConfig {
    let mut config = StreamConfig::from_env();
    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(service) = &cli.service {
        config.service = service.clone();
    }
    if cli.raw_nmea {
        config.gpsd_handshake = false;
    }
    config
}

async fn log_notifications(mut subscription: Subscription) {
    loop {
        match subscription.receiver.recv().await {
            Ok(notification) => match serde_json::to_string(&*notification) {
                Ok(json) => info!("{json}"),
                Err(e) => error!("Failed to serialize notification. Error: {e}"),
            },
            Err(RecvError::Lagged(skipped)) => {
                warn!("Watch of {} skipped {skipped} notifications", subscription.name)
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn quit_on_ctrl_c(ctx: ModuleCtx) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutting down...");
            let _ = ctx.publish_event(EventKind::QuitEvent);
        }
        Err(e) => error!("Failed to listen for Ctrl-C. Error: {e}"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = stream_config(&cli);
    let eb = module_core::EventBus::default();
    let telemetry = TelemetryHandle::new();

    if let Some(type_name) = cli.watch.as_deref() {
        let subscription = telemetry
            .subscribe(Some(type_name), cli.period.as_deref())
            .map_err(|e| error!("Failed to watch {type_name}: {e} ({})", e.code()))?;
        info!(
            "Watching {} as subscription {}",
            subscription.name, subscription.id
        );
        tokio::spawn(log_notifications(subscription));
    }

    let mut stream = NmeaStreamModule::new(eb.context(), config);
    let mut telemetry_module = TelemetryModule::new(eb.context(), telemetry);
    tokio::spawn(quit_on_ctrl_c(eb.context()));

    info!("Starting modules...");
    let (stream_result, telemetry_result) = tokio::join!(stream.run(), telemetry_module.run());
    stream_result.and(telemetry_result)
}
