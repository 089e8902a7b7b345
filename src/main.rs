mod db;
mod errors;
mod models;
mod operations;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

use crate::errors::Result;
use crate::models::category::CategoryGroup;
use crate::models::transaction::Transaction;
use crate::operations::add::{self, TransactionInput};
use crate::operations::browse::run_browse;
use crate::operations::export::export_csv_file;
use crate::operations::import::import_csv_file;
use crate::operations::remove::remove_transaction;
use crate::operations::search_by_category::search_transactions_by_category;
use crate::operations::summary::{compute_summary, compute_summary_in_range, render_summary};

#[derive(Parser)]
#[command(name = "moni", version, about = "Track personal income and expenses")]
struct Cli {
    /// Path to the SQLite ledger file. Created on first use.
    #[arg(long, global = true, default_value = "money_tracker.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Record a transaction
    Add {
        /// Transaction date (YYYY-MM-DD), empty means today
        #[arg(long, default_value = "")]
        date: String,
        #[arg(long)]
        category: String,
        #[arg(long = "type", value_name = "income|expense")]
        kind: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List all transactions with running totals
    List,
    /// Remove a transaction by id
    Remove { id: String },
    /// Show transactions for one category
    Search { category: String },
    /// Totals by category, by month and overall balance
    Summary {
        /// Earliest date to include (inclusive)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest date to include (inclusive)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Import transactions from a CSV file
    Import { file: PathBuf },
    /// Export the ledger to a CSV file
    Export { file: PathBuf },
    /// Show the built-in category catalog
    Categories,
    /// Interactive table view
    Browse,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let conn = match db::connection::establish_connection(&cli.db) {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("Failed to open database '{}': {}", cli.db.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = match cli.command {
        Some(command) => run_command(&conn, command),
        None => run_shell(&conn),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_command(conn: &Connection, command: Command) -> Result<()> {
    match command {
        Command::Add {
            date,
            category,
            kind,
            amount,
            description,
        } => {
            let input = TransactionInput {
                date,
                category,
                kind,
                amount,
                description,
            };
            let tx = add::add_transaction(conn, &input)?;
            println!(
                "Added {} of {} to '{}' on {} (id {}).",
                tx.kind, tx.amount, tx.category, tx.date, tx.id
            );
        }
        Command::List => {
            let transactions = db::repository::get_all_transactions(conn)?;
            print_transactions(&transactions);
        }
        Command::Remove { id } => {
            remove_transaction(conn, &id)?;
            println!("Transaction removed successfully.");
        }
        Command::Search { category } => {
            let results = search_transactions_by_category(conn, &category)?;
            if results.is_empty() {
                println!("No transactions found for category: {}", category.trim());
            } else {
                print_transactions(&results);
            }
        }
        Command::Summary { from, to } => {
            let transactions = db::repository::get_all_transactions(conn)?;
            let summary = compute_summary_in_range(&transactions, from, to);
            println!("{}", render_summary(&summary).trim_end());
        }
        Command::Import { file } => {
            let count = import_csv_file(conn, &file)?;
            println!("Successfully imported {} transactions.", count);
        }
        Command::Export { file } => {
            let count = export_csv_file(conn, &file)?;
            println!("Exported {} transactions to {}.", count, file.display());
        }
        Command::Categories => print_categories(),
        Command::Browse => run_browse(conn)?,
    }
    Ok(())
}

fn print_transactions(transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("No transactions recorded yet.");
        return;
    }

    println!(
        "{:<36}  {:<10}  {:<20}  {:<7}  {:>12}  {}",
        "Id", "Date", "Category", "Type", "Amount", "Description"
    );
    for tx in transactions {
        println!(
            "{:<36}  {:<10}  {:<20}  {:<7}  {:>12.2}  {}",
            tx.id,
            tx.date.format("%Y-%m-%d").to_string(),
            tx.category,
            tx.kind.as_str(),
            tx.amount,
            tx.description
        );
    }

    let summary = compute_summary(transactions);
    println!();
    println!("Total income:   {:.2}", summary.income_total);
    println!("Total expenses: {:.2}", summary.expense_total);
    println!("Balance:        {:.2}", summary.balance());
}

fn print_categories() {
    for group in CategoryGroup::ALL {
        println!("{} categories:", group.label());
        for name in group.categories() {
            println!("  {}", name);
        }
        println!();
    }
    println!("Any other category is accepted and reported as uncategorized.");
}

enum ShellCommand {
    Add,
    List,
    Remove,
    Search,
    Summary,
    Import,
    Export,
    Categories,
    Browse,
    Help,
    Exit,
    Unknown,
}

fn run_shell(conn: &Connection) -> Result<()> {
    println!("Welcome to moni, your personal money tracker!");
    print_shell_help();

    loop {
        println!();
        println!("Enter a command (type 'help' for the list):");

        let Some(input) = read_user_input()? else {
            break;
        };
        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parse_shell_command(parts[0]) {
            ShellCommand::Add => shell_add(conn)?,
            ShellCommand::List => match db::repository::get_all_transactions(conn) {
                Ok(transactions) => print_transactions(&transactions),
                Err(e) => println!("Error listing transactions: {}", e),
            },
            ShellCommand::Remove => shell_remove(conn)?,
            ShellCommand::Search => shell_search(conn)?,
            ShellCommand::Summary => match db::repository::get_all_transactions(conn) {
                Ok(transactions) => {
                    let summary = compute_summary(&transactions);
                    println!("{}", render_summary(&summary).trim_end());
                }
                Err(e) => println!("Error computing summary: {}", e),
            },
            ShellCommand::Import => shell_import(conn)?,
            ShellCommand::Export => shell_export(conn)?,
            ShellCommand::Categories => print_categories(),
            ShellCommand::Browse => {
                if let Err(e) = run_browse(conn) {
                    println!("Error in browse view: {}", e);
                }
            }
            ShellCommand::Help => print_shell_help(),
            ShellCommand::Exit => {
                println!("Goodbye.");
                break;
            }
            ShellCommand::Unknown => {
                println!("Unknown command '{}'. Type 'help' for the list.", parts[0]);
            }
        }
    }

    Ok(())
}

fn shell_add(conn: &Connection) -> Result<()> {
    let Some(date) = prompt("Date (YYYY-MM-DD, empty for today):")? else {
        return Ok(());
    };
    let Some(category) = prompt("Category:")? else {
        return Ok(());
    };
    let Some(kind) = prompt("Type (income/expense):")? else {
        return Ok(());
    };
    let Some(amount) = prompt("Amount:")? else {
        return Ok(());
    };
    let Some(description) = prompt("Description (optional):")? else {
        return Ok(());
    };

    let input = TransactionInput {
        date,
        category,
        kind,
        amount,
        description,
    };
    match add::add_transaction(conn, &input) {
        Ok(tx) => println!("Transaction added successfully (id {}).", tx.id),
        Err(e) => {
            println!("Error adding transaction: {}", e);
            println!("Please try again.");
        }
    }
    Ok(())
}

fn shell_remove(conn: &Connection) -> Result<()> {
    let Some(id) = prompt("Provide the transaction ID to remove:")? else {
        return Ok(());
    };
    match remove_transaction(conn, &id) {
        Ok(()) => println!("Transaction removed successfully."),
        Err(e) => println!("Error: {}", e),
    }
    Ok(())
}

fn shell_search(conn: &Connection) -> Result<()> {
    let Some(category) = prompt("Provide the category to search for:")? else {
        return Ok(());
    };
    match search_transactions_by_category(conn, &category) {
        Ok(transactions) => {
            if transactions.is_empty() {
                println!("No transactions found for category: {}", category.trim());
            } else {
                print_transactions(&transactions);
            }
        }
        Err(e) => println!("Error searching transactions: {}", e),
    }
    Ok(())
}

fn shell_import(conn: &Connection) -> Result<()> {
    let Some(path) = prompt("Provide the CSV file path to import from:")? else {
        return Ok(());
    };
    match import_csv_file(conn, Path::new(&path)) {
        Ok(count) => println!("Successfully imported {} transactions.", count),
        Err(e) => println!("Error importing transactions: {}", e),
    }
    Ok(())
}

fn shell_export(conn: &Connection) -> Result<()> {
    let Some(path) = prompt("Provide the CSV file path to export to:")? else {
        return Ok(());
    };
    match export_csv_file(conn, Path::new(&path)) {
        Ok(count) => println!("Exported {} transactions to {}.", count, path),
        Err(e) => println!("Error exporting transactions: {}", e),
    }
    Ok(())
}

fn print_shell_help() {
    println!("Commands:");
    println!("  add         record a new transaction");
    println!("  list        show all transactions and the balance");
    println!("  remove      delete a transaction by id");
    println!("  search      show transactions for one category");
    println!("  summary     totals by category, by month and overall");
    println!("  import      load transactions from a CSV file");
    println!("  export      write all transactions to a CSV file");
    println!("  categories  show the built-in category catalog");
    println!("  browse      interactive table view");
    println!("  help        show this list");
    println!("  exit        leave the program");
}

fn parse_shell_command(word: &str) -> ShellCommand {
    match word {
        "add" => ShellCommand::Add,
        "list" | "print" => ShellCommand::List,
        "remove" => ShellCommand::Remove,
        "search" => ShellCommand::Search,
        "summary" => ShellCommand::Summary,
        "import" => ShellCommand::Import,
        "export" => ShellCommand::Export,
        "categories" => ShellCommand::Categories,
        "browse" => ShellCommand::Browse,
        "help" => ShellCommand::Help,
        "exit" | "quit" => ShellCommand::Exit,
        _ => ShellCommand::Unknown,
    }
}

fn prompt(label: &str) -> io::Result<Option<String>> {
    println!("{}", label);
    read_user_input()
}

/// Reads one trimmed line from stdin. `None` signals end of input.
fn read_user_input() -> io::Result<Option<String>> {
    let mut input = String::new();
    let bytes = io::stdin().read_line(&mut input)?;
    if bytes == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_shell_command_words() {
        assert!(matches!(parse_shell_command("add"), ShellCommand::Add));
        assert!(matches!(parse_shell_command("print"), ShellCommand::List));
        assert!(matches!(parse_shell_command("quit"), ShellCommand::Exit));
        assert!(matches!(parse_shell_command("bogus"), ShellCommand::Unknown));
    }
}
