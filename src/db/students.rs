use crate::dates::{self, DateError};
use crate::db::{Table, TableError};
use crate::models::Student;
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::{Stream, TryStreamExt};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

pub const TABLE_NAME: &str = "students";

pub struct StudentsTable {
    pool: SqlitePool,
}

impl StudentsTable {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All students born on `date`. Students without a birthday never match.
    pub async fn find_by_birthday(&self, date: NaiveDate) -> Result<Vec<Student>, TableError> {
        let rows = sqlx::query(
            "SELECT id, firstName, lastName, birthday FROM students WHERE birthday = ? ORDER BY id",
        )
        .bind(dates::date_to_sql_date(date))
        .fetch(&self.pool);
        read_students(rows).await
    }

    pub async fn find_by_last_name(&self, last_name: &str) -> Result<Vec<Student>, TableError> {
        let rows = sqlx::query(
            "SELECT id, firstName, lastName, birthday FROM students WHERE lastName = ? ORDER BY id",
        )
        .bind(last_name)
        .fetch(&self.pool);
        read_students(rows).await
    }
}

#[async_trait]
impl Table for StudentsTable {
    type Value = Student;
    type Key = i32;

    fn table_name(&self) -> &'static str {
        TABLE_NAME
    }

    async fn create_table(&self) -> Result<(), TableError> {
        sqlx::query(
            "CREATE TABLE students (
                id INT NOT NULL PRIMARY KEY,
                firstName CHAR(40) NOT NULL,
                lastName CHAR(40) NOT NULL,
                birthday DATE
            )",
        )
        .execute(&self.pool)
        .await?;
        tracing::info!("Created table '{}'", TABLE_NAME);
        Ok(())
    }

    async fn find_by_primary_key(&self, id: i32) -> Result<Option<Student>, TableError> {
        let row = sqlx::query("SELECT id, firstName, lastName, birthday FROM students WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        // A row that exists but cannot be mapped is an error, never "not found".
        row.map(|row| student_from_row(&row))
            .transpose()
            .map_err(|e| TableError::Decode {
                table: TABLE_NAME,
                key: id.to_string(),
                source: Box::new(e),
            })
    }

    async fn find_all(&self) -> Result<Vec<Student>, TableError> {
        let rows = sqlx::query("SELECT id, firstName, lastName, birthday FROM students ORDER BY id")
            .fetch(&self.pool);
        read_students(rows).await
    }

    async fn drop_table(&self) -> Result<(), TableError> {
        sqlx::query("DROP TABLE students").execute(&self.pool).await?;
        tracing::info!("Dropped table '{}'", TABLE_NAME);
        Ok(())
    }

    async fn save(&self, student: &Student) -> Result<(), TableError> {
        let result = sqlx::query(
            "INSERT INTO students (id, firstName, lastName, birthday) VALUES (?, ?, ?, ?)",
        )
        .bind(student.id)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(student.birthday.map(dates::date_to_sql_date))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                tracing::debug!("Saved student {}", student.id);
                Ok(())
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(TableError::AlreadyExists {
                    table: TABLE_NAME,
                    key: student.id.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: i32) -> Result<(), TableError> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TableError::NotFound {
                table: TABLE_NAME,
                key: id.to_string(),
            });
        }
        tracing::debug!("Deleted student {}", id);
        Ok(())
    }

    async fn update(&self, student: &Student) -> Result<(), TableError> {
        let result = sqlx::query(
            "UPDATE students SET firstName = ?, lastName = ?, birthday = ? WHERE id = ?",
        )
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(student.birthday.map(dates::date_to_sql_date))
        .bind(student.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TableError::NotFound {
                table: TABLE_NAME,
                key: student.id.to_string(),
            });
        }
        tracing::debug!("Updated student {}", student.id);
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
enum RowError {
    #[error("{0}")]
    Column(#[from] sqlx::Error),

    #[error("{0}")]
    Date(#[from] DateError),
}

fn student_from_row(row: &SqliteRow) -> Result<Student, RowError> {
    let birthday = row
        .try_get::<Option<String>, _>("birthday")?
        .map(|value| dates::sql_date_to_date(&value))
        .transpose()?;

    Ok(Student {
        id: row.try_get("id")?,
        first_name: row.try_get("firstName")?,
        last_name: row.try_get("lastName")?,
        birthday,
    })
}

/// Map every row of a result stream into a `Student`.
///
/// Errors from the statement itself are returned. A row that cannot be
/// mapped is logged and ends the iteration; the students read before it are
/// returned.
async fn read_students<S>(mut rows: S) -> Result<Vec<Student>, TableError>
where
    S: Stream<Item = Result<SqliteRow, sqlx::Error>> + Unpin,
{
    let mut students = Vec::new();
    while let Some(row) = rows.try_next().await? {
        match student_from_row(&row) {
            Ok(student) => students.push(student),
            Err(e) => {
                tracing::warn!(
                    "Stopped reading '{}' after {} row(s): {}",
                    TABLE_NAME,
                    students.len(),
                    e
                );
                break;
            }
        }
    }
    Ok(students)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn empty_table() -> StudentsTable {
        let pool = db::connect("sqlite::memory:").await.unwrap();
        let table = StudentsTable::new(pool);
        table.create_table().await.unwrap();
        table
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn roster() -> Vec<Student> {
        vec![
            Student::new(1, "Ada", "Lovelace", date(1815, 12, 10)),
            Student::new(2, "Alan", "Turing", None),
            Student::new(3, "Grace", "Hopper", date(1906, 12, 9)),
            Student::new(4, "Edsger", "Dijkstra", date(1930, 5, 11)),
        ]
    }

    #[tokio::test]
    async fn test_create_table_twice_fails() {
        let pool = db::connect("sqlite::memory:").await.unwrap();
        let table = StudentsTable::new(pool);
        assert_eq!(table.table_name(), "students");

        table.create_table().await.unwrap();
        assert!(matches!(
            table.create_table().await,
            Err(TableError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_find_by_primary_key() {
        let table = empty_table().await;
        for student in roster() {
            table.save(&student).await.unwrap();
        }

        assert_eq!(table.find_by_primary_key(3).await.unwrap(), Some(roster()[2].clone()));
        assert_eq!(table.find_by_primary_key(2).await.unwrap(), Some(roster()[1].clone()));
        assert_eq!(table.find_by_primary_key(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_table_is_an_error_not_absent() {
        let pool = db::connect("sqlite::memory:").await.unwrap();
        let table = StudentsTable::new(pool);

        assert!(table.find_by_primary_key(1).await.is_err());
        assert!(table.find_all().await.is_err());
    }

    #[tokio::test]
    async fn test_find_all() {
        let table = empty_table().await;
        assert!(table.find_all().await.unwrap().is_empty());

        // Saved out of order; results come back by id.
        let mut students = roster();
        students.reverse();
        for student in &students {
            table.save(student).await.unwrap();
        }

        assert_eq!(table.find_all().await.unwrap(), roster());
    }

    #[tokio::test]
    async fn test_save_duplicate_id() {
        let table = empty_table().await;
        table.save(&roster()[0]).await.unwrap();

        let imposter = Student::new(1, "Charles", "Babbage", None);
        assert!(matches!(
            table.save(&imposter).await,
            Err(TableError::AlreadyExists { key, .. }) if key == "1"
        ));
        assert_eq!(table.find_all().await.unwrap(), vec![roster()[0].clone()]);
    }

    #[tokio::test]
    async fn test_update() {
        let table = empty_table().await;
        table.save(&roster()[1]).await.unwrap();

        let updated = Student::new(2, "Alan M.", "Turing", date(1912, 6, 23));
        table.update(&updated).await.unwrap();
        assert_eq!(table.find_by_primary_key(2).await.unwrap(), Some(updated));

        // Clearing the birthday stores NULL again.
        let cleared = Student::new(2, "Alan", "Turing", None);
        table.update(&cleared).await.unwrap();
        assert_eq!(table.find_by_primary_key(2).await.unwrap(), Some(cleared));

        let missing = Student::new(9, "Nobody", "Here", None);
        assert!(matches!(
            table.update(&missing).await,
            Err(TableError::NotFound { key, .. }) if key == "9"
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let table = empty_table().await;
        for student in roster() {
            table.save(&student).await.unwrap();
        }

        table.delete(1).await.unwrap();
        assert_eq!(table.find_by_primary_key(1).await.unwrap(), None);
        assert_eq!(table.find_all().await.unwrap().len(), 3);

        assert!(matches!(
            table.delete(1).await,
            Err(TableError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_drop_table() {
        let table = empty_table().await;
        table.save(&roster()[0]).await.unwrap();

        table.drop_table().await.unwrap();
        assert!(table.find_all().await.is_err());
        assert!(table.drop_table().await.is_err());

        // The name is free again.
        table.create_table().await.unwrap();
        assert!(table.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_birthday() {
        let table = empty_table().await;
        for student in roster() {
            table.save(&student).await.unwrap();
        }
        let twin = Student::new(5, "Augusta", "King", date(1815, 12, 10));
        table.save(&twin).await.unwrap();

        let found = table
            .find_by_birthday(NaiveDate::from_ymd_opt(1815, 12, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(found, vec![roster()[0].clone(), twin]);

        let none = table
            .find_by_birthday(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap())
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_hostile_key_is_bound_not_executed() {
        let table = empty_table().await;
        for student in roster() {
            table.save(&student).await.unwrap();
        }

        let found = table
            .find_by_last_name("x'; DROP TABLE students; --")
            .await
            .unwrap();
        assert!(found.is_empty());

        let found = table.find_by_last_name("Turing' OR '1'='1").await.unwrap();
        assert!(found.is_empty());

        assert_eq!(table.find_all().await.unwrap(), roster());
        assert_eq!(
            table.find_by_last_name("Hopper").await.unwrap(),
            vec![roster()[2].clone()]
        );
    }

    #[tokio::test]
    async fn test_unreadable_row_returns_rows_before_it() {
        let table = empty_table().await;
        table.save(&roster()[0]).await.unwrap();
        table.save(&roster()[1]).await.unwrap();
        sqlx::query("INSERT INTO students (id, firstName, lastName, birthday) VALUES (3, 'Bad', 'Date', 'someday')")
            .execute(&table.pool)
            .await
            .unwrap();
        table.save(&roster()[3]).await.unwrap();

        assert_eq!(
            table.find_all().await.unwrap(),
            vec![roster()[0].clone(), roster()[1].clone()]
        );
        assert_eq!(table.find_by_primary_key(4).await.unwrap(), Some(roster()[3].clone()));
    }

    #[tokio::test]
    async fn test_unreadable_row_by_key_is_an_error_not_absent() {
        let table = empty_table().await;
        sqlx::query("INSERT INTO students (id, firstName, lastName, birthday) VALUES (3, 'Bad', 'Date', 'someday')")
            .execute(&table.pool)
            .await
            .unwrap();

        assert!(matches!(
            table.find_by_primary_key(3).await,
            Err(TableError::Decode { key, .. }) if key == "3"
        ));
        assert!(matches!(
            table.save(&Student::new(3, "Bad", "Date", None)).await,
            Err(TableError::AlreadyExists { .. })
        ));
        assert_eq!(table.find_by_primary_key(4).await.unwrap(), None);
    }
}
