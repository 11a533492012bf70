use clap::Parser;
use govee_mqtt_bridge::app::{self, Options, RealScanner, RunError};
use govee_mqtt_bridge::dispatch::Dispatcher;
use govee_mqtt_bridge::publish::mqtt::MqttPublisher;
use std::panic::{self, PanicHookInfo};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Exit codes for the application
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_PANIC: i32 = 2;

/// Install the log subscriber. `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Connect to the broker, then scan and publish until the scanner stops.
async fn run(options: Options) -> Result<(), RunError> {
    let (publisher, _eventloop) = MqttPublisher::connect(&options.mqtt_config());
    let dispatcher = Dispatcher::new(publisher, options.dispatch_config());

    app::run(&RealScanner, &dispatcher, options.verbose).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set up panic hook to ensure clean exit codes for process managers
    // (e.g., systemd) that monitor exit status
    panic::set_hook(Box::new(move |info: &PanicHookInfo| {
        eprintln!("Panic! {}", info);
        std::process::exit(EXIT_PANIC);
    }));

    let options = Options::parse();
    init_tracing(options.verbose);
    options.log_settings();

    match run(options).await {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(why) => {
            error!("{why}");
            std::process::exit(EXIT_ERROR);
        }
    }
}
