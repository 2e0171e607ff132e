use crate::db::{StudentsTable, Table};
use crate::models::Student;
use anyhow::Context;
use chrono::NaiveDate;

pub async fn handle_init(table: &StudentsTable) -> anyhow::Result<String> {
    table
        .create_table()
        .await
        .with_context(|| format!("Failed to create table '{}'", table.table_name()))?;
    Ok(format!("Created table '{}'", table.table_name()))
}

pub async fn handle_add(
    table: &StudentsTable,
    id: i32,
    first_name: String,
    last_name: String,
    birthday: Option<NaiveDate>,
) -> anyhow::Result<String> {
    let student = Student::new(id, first_name, last_name, birthday);
    table.save(&student).await?;
    Ok(format!("Added {}", student))
}

pub async fn handle_update(
    table: &StudentsTable,
    id: i32,
    first_name: String,
    last_name: String,
    birthday: Option<NaiveDate>,
) -> anyhow::Result<String> {
    let student = Student::new(id, first_name, last_name, birthday);
    table.update(&student).await?;
    Ok(format!("Updated {}", student))
}

pub async fn handle_remove(table: &StudentsTable, id: i32) -> anyhow::Result<String> {
    table.delete(id).await?;
    Ok(format!("Removed student {}", id))
}

pub async fn handle_drop(table: &StudentsTable) -> anyhow::Result<String> {
    table
        .drop_table()
        .await
        .with_context(|| format!("Failed to drop table '{}'", table.table_name()))?;
    Ok(format!("Dropped table '{}'", table.table_name()))
}
