pub mod chart;
pub mod collect;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "kurs-watch")]
#[command(about = "Collect retail exchange rates and chart their history")]
pub struct Cli {
    /// Archive root (overrides KURS_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape the rates page and archive the snapshot if the rates changed
    Collect {
        /// Parse and print the rates without writing them
        #[arg(long)]
        dry_run: bool,
        /// Page to scrape (overrides KURS_URL)
        #[arg(long)]
        url: Option<String>,
    },
    /// Draw one chart per currency for archived months
    Chart {
        /// Only this year
        #[arg(long, value_parser = clap::value_parser!(i32).range(2000..=2099))]
        year: Option<i32>,
        /// Only this month (1-12)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },
}

pub async fn run(cli: Cli, mut config: Config) -> ExitCode {
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let result = match cli.command {
        Commands::Collect { dry_run, url } => {
            if let Some(url) = url {
                config.url = url;
            }
            collect::execute(&config, dry_run).await.map(|_| 0)
        }
        Commands::Chart { year, month } => chart::execute(&config, year, month),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_filters_are_validated() {
        assert!(Cli::try_parse_from(["kurs-watch", "chart", "--month", "13"]).is_err());
        assert!(Cli::try_parse_from(["kurs-watch", "chart", "--month", "0"]).is_err());
        assert!(Cli::try_parse_from(["kurs-watch", "chart", "--year", "1999"]).is_err());
        assert!(Cli::try_parse_from(["kurs-watch", "chart", "--year", "twenty"]).is_err());
    }

    #[test]
    fn test_chart_filters_are_parsed() {
        let cli = Cli::try_parse_from(["kurs-watch", "chart", "--month", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Chart { year: None, month: Some(3) }));

        let args = ["kurs-watch", "--data-dir", "/tmp/kurs", "chart", "--year", "2020"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/kurs")));
        assert!(matches!(cli.command, Commands::Chart { year: Some(2020), month: None }));
    }

    #[test]
    fn test_collect_flags() {
        let cli = Cli::try_parse_from(["kurs-watch", "collect", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Commands::Collect { dry_run: true, url: None }));
    }
}
