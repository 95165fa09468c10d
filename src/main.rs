use curerise_checkout::application::{BankChoice, SubmitOutcome};
use curerise_checkout::domain::MethodTag;
use curerise_checkout::infrastructure::{HttpDonationConfirmer, PendingDonationStore, SimulatedGateway};
use curerise_checkout::shared::LoggingUtils;
use curerise_checkout::{AppConfig, CheckoutService};
use std::sync::Arc;
use tracing::{error, info};

const USAGE: &str = "usage: curerise-checkout <pending-donation.json> [upi|qr|netbanking:<BANK>]";

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = LoggingUtils::initialize(&config.logging.level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };
    let method = args.next().unwrap_or_else(|| "upi".to_string());

    if let Err(e) = run(config, &path, &method).await {
        error!("Checkout failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig, path: &str, method: &str) -> curerise_checkout::Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| curerise_checkout::AppError::Internal(format!("read {}: {}", path, e)))?;

    let store = PendingDonationStore::new(config.donation.limits());
    store.put_raw(&raw).await?;

    let gateway = Arc::new(SimulatedGateway::new(&config.gateway));
    let confirmer = Arc::new(HttpDonationConfirmer::new(config.confirmation.clone())?);
    let service = CheckoutService::new(Arc::new(config), store, gateway, confirmer);

    let session = service.open().await?;
    {
        let mut guard = session.lock().await;
        let (tag, bank) = match method.split_once(':') {
            Some((tag, bank)) => (tag, Some(bank)),
            None => (method, None),
        };
        let tag: MethodTag = tag
            .parse()
            .map_err(curerise_checkout::AppError::Validation)?;
        guard.switch_method(tag)?;
        if let Some(bank) = bank {
            guard.select_bank(BankChoice::Other(bank.to_string()))?;
        }
        info!(label = %guard.pay_button_label(), "Ready to pay");
    }

    match service.submit(&session).await? {
        SubmitOutcome::Succeeded(receipt) => {
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        SubmitOutcome::Rejected(result) => {
            println!("{}", result.user_message().unwrap_or("Payment details are invalid"));
        }
        SubmitOutcome::Failed(reason) => {
            println!("Payment failed: {}", reason);
        }
        SubmitOutcome::InFlight | SubmitOutcome::AlreadyCompleted => {}
    }

    session.lock().await.teardown();
    info!(metrics = ?service.metrics(), "Checkout finished");
    Ok(())
}
