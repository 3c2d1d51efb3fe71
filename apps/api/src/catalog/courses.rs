use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::catalog::repository::{
    find_course, insert_course, remove_course, save_course, NewCourse,
};
use crate::errors::AppError;
use crate::models::course::CourseRow;

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    pub instructor_id: Uuid,
}

/// Partial update. Absent or empty fields keep the stored value; a provided
/// title goes through the same validation as on create.
#[derive(Debug, Deserialize)]
pub struct UpdateCourseRequest {
    pub instructor_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
}

impl UpdateCourseRequest {
    pub fn apply(&self, course: &mut CourseRow) -> Result<(), AppError> {
        if let Some(title) = provided(self.title.as_deref()) {
            course.title = validate_title(title)?.to_string();
        }
        if let Some(description) = provided(self.description.as_deref()) {
            course.description = description.to_string();
        }
        if let Some(content) = provided(self.content.as_deref()) {
            course.content = content.to_string();
        }
        Ok(())
    }
}

fn provided(update: Option<&str>) -> Option<&str> {
    update.filter(|v| !v.trim().is_empty())
}

pub fn validate_title(title: &str) -> Result<&str, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Course title must not be empty".to_string()));
    }
    Ok(title)
}

/// Only the instructor who owns a course may change it or see its roster.
pub fn ensure_owner(course: &CourseRow, instructor_id: Uuid) -> Result<(), AppError> {
    if course.instructor_id != instructor_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub async fn create_course(pool: &PgPool, req: &CreateCourseRequest) -> Result<CourseRow, AppError> {
    let title = validate_title(&req.title)?;
    let course = insert_course(
        pool,
        NewCourse {
            title,
            description: &req.description,
            content: &req.content,
            instructor_id: req.instructor_id,
        },
    )
    .await?;
    Ok(course)
}

pub async fn get_course(pool: &PgPool, id: Uuid) -> Result<CourseRow, AppError> {
    find_course(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Course {id} not found")))
}

pub async fn update_course(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateCourseRequest,
) -> Result<CourseRow, AppError> {
    let mut course = get_course(pool, id).await?;
    ensure_owner(&course, req.instructor_id)?;

    req.apply(&mut course)?;
    save_course(pool, &course).await?;
    Ok(course)
}

pub async fn delete_course(pool: &PgPool, id: Uuid, instructor_id: Uuid) -> Result<(), AppError> {
    let course = get_course(pool, id).await?;
    ensure_owner(&course, instructor_id)?;
    remove_course(pool, id).await?;
    Ok(())
}
