mod categorizer;
mod cli;
mod db;
mod error;
mod fmt;
mod formats;
mod importer;
mod models;
mod parser;
mod settings;
mod store;

use clap::Parser;

use cli::{AccountsCommands, Cli, Commands, RulesCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Accounts { command } => match command {
            AccountsCommands::Add { name, group } => cli::accounts::add(&name, &group),
            AccountsCommands::List => cli::accounts::list(),
        },
        Commands::Import {
            file,
            account,
            format,
            json,
        } => cli::import::run(&file, &account, format.as_deref(), json),
        Commands::Transactions {
            account,
            page,
            per_page,
        } => cli::transactions::list(&account, page, per_page),
        Commands::Rules { command } => match command {
            RulesCommands::Add {
                pattern,
                category,
                account,
                case_sensitive,
            } => cli::rules::add(&pattern, &category, &account, case_sensitive),
            RulesCommands::List => cli::rules::list(),
        },
        Commands::Categorize => cli::categorize::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
