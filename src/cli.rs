use crate::dates;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "studentsdb", version, about = "Manage the students table")]
pub struct Cli {
    /// SQLite connection string
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite://students.db?mode=rwc",
        global = true
    )]
    pub database_url: String,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the students table
    Init,

    /// Add a new student
    Add {
        id: i32,
        first_name: String,
        last_name: String,
        #[arg(long, value_parser = parse_birthday)]
        birthday: Option<NaiveDate>,
    },

    /// Show one student
    Get { id: i32 },

    /// List every student
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List students born on a date
    Born {
        #[arg(value_parser = parse_birthday)]
        date: NaiveDate,
    },

    /// List students with a last name
    Surname { last_name: String },

    /// Replace a student's names and birthday
    Update {
        id: i32,
        first_name: String,
        last_name: String,
        #[arg(long, value_parser = parse_birthday)]
        birthday: Option<NaiveDate>,
    },

    /// Remove a student
    Remove { id: i32 },

    /// Drop the students table
    Drop,
}

fn parse_birthday(input: &str) -> Result<NaiveDate, String> {
    dates::parse_date(input).map_err(|e| e.to_string())
}
