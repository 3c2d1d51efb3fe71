use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::catalog::courses::{ensure_owner, get_course};
use crate::errors::AppError;
use crate::models::course::CourseRow;
use crate::models::enrollment::EnrollmentRow;

/// Enrolls a user in a course. A second enrollment in the same course is rejected.
pub async fn enroll(pool: &PgPool, course_id: Uuid, user_id: Uuid) -> Result<EnrollmentRow, AppError> {
    get_course(pool, course_id).await?;

    let inserted: Option<EnrollmentRow> = sqlx::query_as(
        r#"
        INSERT INTO enrollments (user_id, course_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, course_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(pool)
    .await?;

    let enrollment = inserted
        .ok_or_else(|| AppError::Validation("Already enrolled in this course".to_string()))?;

    info!("User {user_id} enrolled in course {course_id}");
    Ok(enrollment)
}

pub async fn enrolled_courses(pool: &PgPool, user_id: Uuid) -> Result<Vec<CourseRow>, AppError> {
    let courses: Vec<CourseRow> = sqlx::query_as(
        r#"
        SELECT c.* FROM courses c
        JOIN enrollments e ON e.course_id = c.id
        WHERE e.user_id = $1
        ORDER BY e.enrolled_at
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(courses)
}

/// The roster of a course, visible to its instructor only.
pub async fn enrolled_students(
    pool: &PgPool,
    course_id: Uuid,
    instructor_id: Uuid,
) -> Result<Vec<EnrollmentRow>, AppError> {
    let course = get_course(pool, course_id).await?;
    ensure_owner(&course, instructor_id)?;

    let roster: Vec<EnrollmentRow> = sqlx::query_as(
        "SELECT * FROM enrollments WHERE course_id = $1 ORDER BY enrolled_at",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await?;
    Ok(roster)
}
