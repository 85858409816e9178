//! msnlink simulator binary.
//!
//! Runs scripted client sessions against in-memory collaborators and logs
//! every published event.
//!
//! # Usage
//!
//! ```bash
//! # Run every scenario
//! msnlink-sim
//!
//! # Run one scenario with client internals visible
//! msnlink-sim --scenario inbound-chat --log-level debug
//! ```

use clap::Parser;
use msnlink_client::{ClientConfig, Event, ServerAddr};
use msnlink_harness::{Scenario, SimSession};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// msnlink client simulator
#[derive(Parser, Debug)]
#[command(name = "msnlink-sim")]
#[command(about = "Drive the msnlink client through scripted sessions")]
#[command(version)]
struct Args {
    /// Scenario to run. Runs every scenario if omitted.
    #[arg(short, long, value_enum)]
    scenario: Option<Scenario>,

    /// Notification server host reported in logs
    #[arg(long, default_value = msnlink_client::DEFAULT_SERVER_HOST)]
    host: String,

    /// Notification server port reported in logs
    #[arg(long, default_value_t = msnlink_client::DEFAULT_SERVER_PORT)]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = ClientConfig {
        server: ServerAddr { host: args.host, port: args.port },
        ..ClientConfig::default()
    };
    let scenarios = args.scenario.map_or_else(|| Scenario::ALL.to_vec(), |s| vec![s]);

    for scenario in scenarios {
        let mut session = SimSession::new(config.clone());
        let result = scenario.run(&mut session);

        for event in session.recorder().events() {
            log_event(&event);
        }

        match result {
            Ok(()) => {
                tracing::info!(?scenario, state = %session.client().state(), "scenario passed");
            },
            Err(e) => {
                tracing::error!(?scenario, error = %e, "scenario failed");
                return Err(e.into());
            },
        }
    }

    Ok(())
}

fn log_event(event: &Event) {
    let name = event.name();
    match event {
        Event::ClientStateChanged(state) => tracing::info!(%name, %state),
        Event::ClientError(kind) => tracing::info!(%name, ?kind),
        Event::InviteConversation(conversation) => {
            tracing::info!(%name, participants = ?conversation.participants());
        },
        Event::ContactPropertyChanged { contact, .. } => {
            tracing::info!(%name, contact = %contact.id);
        },
        Event::Contact(event) => tracing::info!(%name, ?event),
        Event::AddressBook(event) => tracing::info!(%name, signal = event.signal_name()),
        Event::OimStateChanged(state) => tracing::info!(%name, ?state),
        Event::Oim(event) => tracing::info!(%name, signal = event.signal_name()),
    }
}
