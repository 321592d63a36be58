use clap::Parser;
use localmem::cli::commands::{add_metadata, Cli, Commands};
use localmem::config::Settings;
use localmem::LocalMemory;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("localmem=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };
    if cli.command.skips_gate() {
        settings.retrieval.relevance_gate = false;
    }

    let mem = match LocalMemory::new(&settings).await {
        Ok(mem) => mem,
        Err(e) => {
            eprintln!("Error initializing localmem: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(mem, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(mem: LocalMemory, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Add { text, source, meta } => {
            let metadata = add_metadata(source, meta.as_deref())?;
            let outcome = mem.add_document_with_metadata(text, metadata).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Query { text, k } => {
            let results = mem.query(&text, k).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::Context { task, history, .. } => {
            let context = mem.process_task(&task, &history).await;
            println!("{}", serde_json::to_string_pretty(&context)?);
        }
        Commands::Enhance { prompt, .. } => {
            let enhancement = mem.enhance(&prompt).await?;
            println!("{}", serde_json::to_string_pretty(&enhancement)?);
        }
        Commands::Stats => {
            println!("{}", serde_json::to_string_pretty(&mem.stats())?);
        }
    }
    Ok(())
}
