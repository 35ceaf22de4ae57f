use std::panic::PanicHookInfo;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{filter::EnvFilter, fmt};

/// Panic hook to send panic info to `tracing` instead of stderr, so a
/// panicking poller task shows up in the same stream as everything
/// else.
fn report_panic(panic_info: &PanicHookInfo<'_>) {
    let payload = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
        Some(*s)
    } else {
        panic_info
            .payload()
            .downcast_ref::<String>()
            .map(|s| s.as_str())
    };

    match (panic_info.location(), payload) {
        (Some(location), Some(payload)) => {
            tracing::error!(
                "{}:{}:{}: {}",
                location.file(),
                location.line(),
                location.column(),
                payload,
            );
        }
        _ => {
            tracing::error!("{}", panic_info);
        }
    };
}

pub fn register() {
    // RUST_LOG can be used to set the log level. The default is `info`.
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    std::panic::set_hook(Box::new(report_panic));
}
