use tracing::info;

use crate::api::kurs::KursClient;
use crate::archive::Archive;
use crate::config::Config;
use crate::error::Result;
use crate::services::collect_service::{self, CollectOutcome};
use crate::utils::Table;

pub async fn execute(config: &Config, dry_run: bool) -> Result<()> {
    info!("💱 Collect command called (dry run: {})", dry_run);

    let client = KursClient::new(&config.url);
    let archive = Archive::new(&config.data_dir);

    let result = collect_service::collect(&client, &archive, dry_run).await?;

    let mut table = Table::new(vec!["Pair", "They buy", "They sell"]);
    for (pair, quote) in &result.record.quotes {
        table.add_row(vec![pair.clone(), quote.buy.to_string(), quote.sell.to_string()]);
    }

    println!("Rates updated at {}", result.record.timestamp);
    println!("{}", table.render());
    match result.outcome {
        CollectOutcome::Written(path) => println!("✅ Saved to {}", path.display()),
        CollectOutcome::Duplicate => println!("⏭️ Same as the previous snapshot, not saved"),
        CollectOutcome::DryRun => println!("⏭️ Dry run, not saved"),
    }

    info!("Successfully ended work");
    Ok(())
}
