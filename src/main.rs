use clap::Parser;
use edgelord::cli::{self, Cli, Commands};
use edgelord::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            cli::run::execute(cli.log_level.as_deref(), cli.json_logs, &args).await?;
        }
        Commands::Check => {
            cli::check::execute().await?;
        }
        Commands::Status(args) => {
            cli::status::execute(&args);
        }
    }

    Ok(())
}
