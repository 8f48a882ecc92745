use agro_compat::app::presenter;
use agro_compat::config::Command;
use agro_compat::utils::logger;
use agro_compat::{CliConfig, LookupSession};
use clap::Parser;

/// Exit code when the sheet could not be loaded or the source is misconfigured.
const EXIT_DEGRADED: i32 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if config.logging.json {
        logger::init_json_logger(cli.verbose, &config.logging.level);
    } else {
        logger::init_cli_logger(cli.verbose, &config.logging.level);
    }
    tracing::debug!("CLI config: {:?}", cli);

    // 驗證配置 (source.* problems degrade the session instead)
    if let Err(e) = config.validate_settings() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let session = LookupSession::from_config(&config).await;

    let output = match &cli.command {
        Command::Check {
            chemical,
            biological,
        } => {
            let response = session.check(chemical, biological);
            presenter::format_rendered(&presenter::render_check(&response), cli.format)?
        }
        Command::List => {
            let view = presenter::render_catalog(&session);
            presenter::format_catalog(&view, cli.format)?
        }
        Command::RequestTest {
            chemical,
            biological,
        } => {
            let request = session.request_test(chemical, biological);
            presenter::format_rendered(&presenter::render_test_request(&request), cli.format)?
        }
    };

    println!("{}", output);

    if session.is_degraded() {
        std::process::exit(EXIT_DEGRADED);
    }

    Ok(())
}
