use crate::db::{StudentsTable, Table};
use crate::models::Student;
use anyhow::Context;
use chrono::NaiveDate;

pub async fn handle_get(table: &StudentsTable, id: i32) -> anyhow::Result<String> {
    let student = table
        .find_by_primary_key(id)
        .await
        .with_context(|| format!("Failed to look up student {}", id))?;

    Ok(match student {
        Some(student) => student.to_string(),
        None => format!("No student with id {}", id),
    })
}

pub async fn handle_list(table: &StudentsTable, json: bool) -> anyhow::Result<String> {
    let students = table.find_all().await.context("Failed to list students")?;
    tracing::info!("Found {} student(s)", students.len());

    if json {
        return Ok(serde_json::to_string_pretty(&students)?);
    }
    Ok(format_students(&students))
}

pub async fn handle_born(table: &StudentsTable, date: NaiveDate) -> anyhow::Result<String> {
    let students = table
        .find_by_birthday(date)
        .await
        .with_context(|| format!("Failed to find students born on {}", date))?;
    Ok(format_students(&students))
}

pub async fn handle_surname(table: &StudentsTable, last_name: &str) -> anyhow::Result<String> {
    let students = table
        .find_by_last_name(last_name)
        .await
        .with_context(|| format!("Failed to find students named {}", last_name))?;
    Ok(format_students(&students))
}

fn format_students(students: &[Student]) -> String {
    if students.is_empty() {
        return "No students found".to_string();
    }
    students
        .iter()
        .map(Student::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
