use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use xlm_forwarder::application::agent::{AgentContext, ForwardingAgent};
use xlm_forwarder::application::dispatcher::FeePolicy;
use xlm_forwarder::config::Settings;
use xlm_forwarder::domain::ports::{CursorStoreBox, LedgerGatewayBox, ReceiptSinkBox};
use xlm_forwarder::infrastructure::cursor_file::FileCursorStore;
use xlm_forwarder::infrastructure::horizon::HorizonGateway;
use xlm_forwarder::infrastructure::receipt_log::FsReceiptLog;
use xlm_forwarder::infrastructure::stellar::keypair::Keypair;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML settings file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.config).into_diagnostic()?;

    let keypair = Keypair::from_secret_seed(&settings.distributor_secret_key).into_diagnostic()?;
    let ctx = AgentContext {
        distributor: keypair.address(),
        receiver: settings.receiver_address.clone(),
        send_fraction: settings.send_fraction,
        min_incoming: settings.min_incoming,
        fee: FeePolicy {
            floor: settings.min_fee,
            cap: settings.fee_cap,
        },
    };

    let ledger: LedgerGatewayBox = Box::new(
        HorizonGateway::new(&settings.horizon_url, keypair, &settings.network_passphrase)
            .into_diagnostic()?,
    );
    let cursors: CursorStoreBox = Box::new(FileCursorStore::new(settings.cursor_file.clone()));
    let receipts: ReceiptSinkBox =
        Box::new(FsReceiptLog::new(settings.log_dir.clone()).into_diagnostic()?);

    let mut agent = ForwardingAgent::new(ctx, ledger, cursors, receipts);
    agent.run().await.into_diagnostic()
}
