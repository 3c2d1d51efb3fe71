//! Course storage — the `CourseRepository` seam consumed by the recommendation
//! pipeline, plus the Postgres queries behind the catalog endpoints.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::course::CourseRow;
use crate::recommendation::matcher::TermPattern;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Repository unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                RepositoryError::Unavailable(err.to_string())
            }
            other => RepositoryError::Database(other),
        }
    }
}

/// Read side of the course catalog used by recommendation resolution.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Every course, in repository order.
    async fn find_all(&self) -> Result<Vec<CourseRow>, RepositoryError>;

    /// Courses whose title, description or content contains any term of
    /// `pattern`, case-insensitively.
    async fn find_matching(&self, pattern: &TermPattern) -> Result<Vec<CourseRow>, RepositoryError>;
}

/// Postgres-backed repository. Repository order is creation order.
#[derive(Clone)]
pub struct PgCourseRepository {
    pool: PgPool,
}

impl PgCourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseRepository for PgCourseRepository {
    async fn find_all(&self) -> Result<Vec<CourseRow>, RepositoryError> {
        Ok(list_courses(&self.pool).await?)
    }

    async fn find_matching(&self, pattern: &TermPattern) -> Result<Vec<CourseRow>, RepositoryError> {
        // Terms are alphanumeric (see TermPattern), so no LIKE metacharacters need escaping.
        let likes: Vec<String> = pattern.terms().iter().map(|t| format!("%{t}%")).collect();
        debug!("Course search with {} ILIKE terms", likes.len());

        let rows = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT * FROM courses
            WHERE title ILIKE ANY($1)
               OR description ILIKE ANY($1)
               OR content ILIKE ANY($1)
            ORDER BY created_at, id
            "#,
        )
        .bind(&likes)
        .fetch_all(&self.pool)
        .await?;

        // ILIKE folds case by collation; keep only rows the pattern itself accepts.
        Ok(rows.into_iter().filter(|c| pattern.matches(c)).collect())
    }
}

/// Fields for a new course. Both free-text fields default to empty.
pub struct NewCourse<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub content: &'a str,
    pub instructor_id: Uuid,
}

pub async fn insert_course(pool: &PgPool, course: NewCourse<'_>) -> Result<CourseRow, sqlx::Error> {
    let row = sqlx::query_as::<_, CourseRow>(
        r#"
        INSERT INTO courses (id, title, description, content, instructor_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(course.title)
    .bind(course.description)
    .bind(course.content)
    .bind(course.instructor_id)
    .fetch_one(pool)
    .await?;

    info!("Created course {} for instructor {}", row.id, row.instructor_id);
    Ok(row)
}

pub async fn list_courses(pool: &PgPool) -> Result<Vec<CourseRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM courses ORDER BY created_at, id")
        .fetch_all(pool)
        .await
}

pub async fn find_course(pool: &PgPool, id: Uuid) -> Result<Option<CourseRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM courses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_instructor_courses(
    pool: &PgPool,
    instructor_id: Uuid,
) -> Result<Vec<CourseRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM courses WHERE instructor_id = $1 ORDER BY created_at, id")
        .bind(instructor_id)
        .fetch_all(pool)
        .await
}

pub async fn save_course(pool: &PgPool, course: &CourseRow) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE courses SET title = $1, description = $2, content = $3 WHERE id = $4")
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.content)
        .bind(course.id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn remove_course(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    info!("Deleted course {id}");
    Ok(())
}
