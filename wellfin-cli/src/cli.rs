use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "wellfin")]
#[command(about = "WellFin AI planning API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API
    Serve {
        /// Bind address (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send a probe prompt to the configured model and print the result
    CheckModel,

    /// Print a fresh API key and the matching .env lines
    GenerateApiKey {
        /// Deployment the key is meant for
        #[arg(short, long, value_enum, default_value = "dev")]
        environment: KeyEnvironment,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KeyEnvironment {
    #[value(name = "dev", alias = "development")]
    Development,
    #[value(name = "stg", alias = "staging")]
    Staging,
    #[value(name = "prod", alias = "production")]
    Production,
}

impl KeyEnvironment {
    pub fn prefix(self) -> &'static str {
        match self {
            KeyEnvironment::Development => "dev",
            KeyEnvironment::Staging => "stg",
            KeyEnvironment::Production => "prod",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            KeyEnvironment::Development => "development",
            KeyEnvironment::Staging => "staging",
            KeyEnvironment::Production => "production",
        }
    }
}
