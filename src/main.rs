use std::process::ExitCode;

use clap::Parser;

use catwalk::Config;

/// Crawl a paginated product listing into a merchant feed
#[derive(Parser, Debug)]
#[command(name = "catwalk")]
#[command(version)]
struct Cli {
    /// Listing page to start from
    start_url: String,

    /// Number of feed items to collect before stopping
    #[arg(value_parser = parse_quota)]
    quota: usize,
}

fn parse_quota(s: &str) -> Result<usize, String> {
    let quota: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a whole number of items", s))?;
    if quota == 0 {
        return Err("must be at least 1".to_owned());
    }
    Ok(quota)
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = Config::default();
    match catwalk::crawl(&config, &cli.start_url, cli.quota).await {
        Ok(summary) if summary.termination.is_failure() => {
            eprintln!("Crawl stopped early: {}", summary.termination);
            println!(
                "Saved {} products collected before the failure to {}.",
                summary.records_written,
                config.output_path.display()
            );
            ExitCode::FAILURE
        }
        Ok(summary) => {
            println!("Total {} products found and saved.", summary.records_written);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
