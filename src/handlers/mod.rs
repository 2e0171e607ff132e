mod query;
mod write;

use crate::cli::Command;
use crate::db::StudentsTable;

/// Run one CLI command against the students table and return what to print.
pub async fn handle_command(table: &StudentsTable, command: Command) -> anyhow::Result<String> {
    tracing::debug!("Handling command: {:?}", command);

    match command {
        Command::Init => write::handle_init(table).await,
        Command::Add { id, first_name, last_name, birthday } => {
            write::handle_add(table, id, first_name, last_name, birthday).await
        }
        Command::Get { id } => query::handle_get(table, id).await,
        Command::List { json } => query::handle_list(table, json).await,
        Command::Born { date } => query::handle_born(table, date).await,
        Command::Surname { last_name } => query::handle_surname(table, &last_name).await,
        Command::Update { id, first_name, last_name, birthday } => {
            write::handle_update(table, id, first_name, last_name, birthday).await
        }
        Command::Remove { id } => write::handle_remove(table, id).await,
        Command::Drop => write::handle_drop(table).await,
    }
}
