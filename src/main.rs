use clap::{Arg, ArgAction, Command};
use tracing::info;

use neta::config::Config;
use neta::credential_store;
use neta::executor::Executor;
use neta::llm_generator::{CommandGenerator, MockGenerator, OpenAiGenerator};
use neta::pipeline::Pipeline;
use neta::selection::Selection;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let matches = Command::new("neta")
        .about("AI-powered ffmpeg command generator")
        .long_about(
            "neta turns a plain-language description of a media operation plus input files \
             into a ready-to-run ffmpeg command, and can execute it on request",
        )
        .arg(
            Arg::new("instruction")
                .help("What to do with the files, in plain language")
                .num_args(1),
        )
        .arg(
            Arg::new("files")
                .help("Input media files")
                .num_args(1..),
        )
        .arg(
            Arg::new("run")
                .long("run")
                .help("Execute the generated command instead of just printing it")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("set-api-key")
                .long("set-api-key")
                .help("Save the OpenAI API key")
                .value_name("API_KEY")
                .num_args(1),
        )
        .arg(
            Arg::new("clear-api-key")
                .long("clear-api-key")
                .help("Remove the stored OpenAI API key")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Show configuration information")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    // Handle configuration commands
    if let Some(api_key) = matches.get_one::<String>("set-api-key") {
        credential_store::set_api_key(api_key)?;
        println!("✅ API key saved successfully");
        return Ok(());
    }

    if matches.get_flag("clear-api-key") {
        credential_store::clear_api_key()?;
        println!("✅ API key removed");
        return Ok(());
    }

    if matches.get_flag("config") {
        Config::show_config_info()?;
        return Ok(());
    }

    let Some(instruction) = matches.get_one::<String>("instruction") else {
        eprintln!("No operation described. Use 'neta --help' for usage information.");
        return Ok(());
    };
    let files: Vec<String> = matches
        .get_many::<String>("files")
        .unwrap_or_default()
        .map(|s| s.to_string())
        .collect();

    if files.is_empty() {
        eprintln!("No input files given. Pass at least one media file after the instruction.");
        return Ok(());
    }

    let config = Config::load()?;
    let generator: Box<dyn CommandGenerator> = if config.is_mock_mode() {
        Box::new(MockGenerator::new())
    } else {
        Box::new(OpenAiGenerator::new())
    };

    let api_key = config.resolve_api_key();
    if api_key.is_none() && !config.is_mock_mode() {
        anyhow::bail!(
            "No OpenAI API key found. Please set it using one of these methods:

1. Save it to the credential store:
   neta --set-api-key sk-your-key-here

2. Set an environment variable:
   export OPENAI_API_KEY=sk-your-key-here

3. Check current config:
   neta --config"
        );
    }
    // The mock generator ignores the credential
    let api_key = api_key.unwrap_or_else(|| "mock".to_string());

    let selection = Selection::from_paths(&files);
    info!("Processing: {} with {} file(s)", instruction, files.len());

    let mut pipeline = Pipeline::new(generator, Executor::new());
    let command_text = pipeline
        .submit(instruction, &selection, Some(&api_key))
        .await?;

    println!("{}", command_text);

    if matches.get_flag("run") {
        let output = pipeline.run().await?;
        print!("{}", output);
    }

    Ok(())
}
