use anyhow::Result;
use clap::{CommandFactory, Parser};
use persona_forge::app::{
    run_clean, run_evaluate, run_harvest, run_synthesize, run_train, run_transcribe,
};
use persona_forge::cli::{Cli, Commands, ConfigAction};
use persona_forge::config::Config;
use persona_forge::diagnostics::check_dependencies;
use persona_forge::exec::SystemCommandExecutor;
use persona_forge::output::Reporter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let reporter = Reporter::new(cli.quiet, cli.verbose);
    let executor = SystemCommandExecutor::new();

    match cli.command {
        Commands::Harvest(args) => {
            let config = load_config(cli.config.as_deref())?;
            run_harvest(config, args, &reporter).await?;
        }
        Commands::Transcribe(args) => {
            let config = load_config(cli.config.as_deref())?;
            let report = run_transcribe(config, args, &executor, &reporter)?;
            if !report.written.is_empty() || !report.failed.is_empty() {
                reporter.success(format!(
                    "{} transcribed, {} failed",
                    report.written.len(),
                    report.failed.len()
                ));
            }
        }
        Commands::Synthesize(args) => {
            let config = load_config(cli.config.as_deref())?;
            run_synthesize(config, args, &reporter)?;
        }
        Commands::Clean(args) => {
            let config = load_config(cli.config.as_deref())?;
            run_clean(config, args, &reporter)?;
        }
        Commands::Train(args) => {
            let config = load_config(cli.config.as_deref())?;
            run_train(config, args, &executor, &reporter)?;
        }
        Commands::Evaluate(args) => {
            let config = load_config(cli.config.as_deref())?;
            run_evaluate(config, args, &executor, &reporter)?;
        }
        Commands::Check => {
            let config = load_config(cli.config.as_deref())?;
            check_dependencies(&config);
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "persona-forge",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from file, apply env overrides, and validate.
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        // Try default path, fall back to defaults
        Config::load_or_default(&Config::default_path())?
    };

    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

fn handle_config_command(
    action: ConfigAction,
    custom_path: Option<&std::path::Path>,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Dump => {
            print!("{}", Config::dump_template()?);
        }
        ConfigAction::Path => {
            let path = custom_path
                .map(std::path::PathBuf::from)
                .unwrap_or_else(Config::default_path);
            println!("{}", path.display());
        }
    }
    Ok(())
}
