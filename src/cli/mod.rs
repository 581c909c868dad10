pub mod accounts;
pub mod categorize;
pub mod import;
pub mod init;
pub mod rules;
pub mod transactions;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tally", about = "Personal-finance tracker: import bank statements, browse the ledger.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up tally: choose a data directory and initialize the database.
    Init {
        /// Path for tally data (default: ~/Documents/tally)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Manage accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Import a CSV bank statement into an account.
    Import {
        /// Path to the statement file
        file: String,
        /// Account name to import into
        #[arg(long)]
        account: String,
        /// Statement format key (generic, checking, credit_card); detected
        /// from the header row when omitted
        #[arg(long)]
        format: Option<String>,
        /// Print the import summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Page through an account's transactions, newest first.
    Transactions {
        /// Account name
        #[arg(long)]
        account: String,
        /// Zero-based page number
        #[arg(long, default_value_t = 0)]
        page: u32,
        /// Rows per page
        #[arg(long = "per-page", default_value_t = 20)]
        per_page: u32,
    },
    /// Manage categorization rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Re-run categorization rules on uncategorized transactions.
    Categorize,
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add a new account.
    Add {
        /// Account name
        name: String,
        /// Grouping label (e.g. bank or household member)
        #[arg(long, default_value = "")]
        group: String,
    },
    /// List accounts.
    List,
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// Add a substring rule assigning a category within one account.
    Add {
        /// Substring to look for in transaction descriptions
        pattern: String,
        /// Category name to assign
        #[arg(long)]
        category: String,
        /// Account the rule applies to
        #[arg(long)]
        account: String,
        /// Match case-sensitively
        #[arg(long)]
        case_sensitive: bool,
    },
    /// List rules.
    List,
}
