use anyhow::Result;
use clap::Parser;
use wellfin_cli::cli::{Cli, Commands};
use wellfin_cli::{AppConfig, env_lines, generate_api_key, run_check_model, run_serve};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = AppConfig::from_env()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            run_serve(config).await
        }
        Commands::CheckModel => run_check_model(AppConfig::from_env()?).await,
        Commands::GenerateApiKey { environment } => {
            let key = generate_api_key(environment);
            println!("Generated {} API key:\n", environment.name());
            println!("{key}\n");
            println!("Add to your .env:\n");
            for line in env_lines(environment, &key, "https://your-api-url") {
                println!("{line}");
            }
            Ok(())
        }
    }
}
