use clap::Parser;
use tracing_subscriber::EnvFilter;

use spendwise::cli::{self, CategoriesCommands, Cli, Commands, TransactionsCommands};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Preview { file, rows, json } => cli::preview::run(&file, rows, json),
        Commands::Import {
            files,
            statement_type,
            map,
            bank,
            dry_run,
            json,
        } => cli::import::run(&files, statement_type, &map, bank.as_deref(), dry_run, json),
        Commands::Analyze { top, json } => cli::analyze::run(top, json),
        Commands::Transactions { command } => match command {
            TransactionsCommands::List { json } => cli::transactions::list(json),
            TransactionsCommands::Add {
                date,
                description,
                amount,
                category,
            } => cli::transactions::add(&date, &description, &amount, category.as_deref()),
            TransactionsCommands::Delete { id } => cli::transactions::delete(id),
            TransactionsCommands::Update {
                id,
                date,
                description,
                amount,
                category,
            } => cli::transactions::update(id, date, description, amount, category),
            TransactionsCommands::Clear => cli::transactions::clear(),
        },
        Commands::Categories { command } => match command {
            CategoriesCommands::List { json } => cli::categories::list(json),
            CategoriesCommands::Add { name, keywords } => cli::categories::add(&name, &keywords),
            CategoriesCommands::Delete { id } => cli::categories::delete(id),
        },
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
