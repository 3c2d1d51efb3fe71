use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::catalog::courses::{
    create_course, delete_course, get_course, update_course, CreateCourseRequest,
    UpdateCourseRequest,
};
use crate::catalog::enrollment::{enroll, enrolled_courses, enrolled_students};
use crate::catalog::repository::{list_courses, list_instructor_courses};
use crate::errors::AppError;
use crate::models::course::CourseRow;
use crate::models::enrollment::EnrollmentRow;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct InstructorQuery {
    pub instructor_id: Uuid,
}

#[derive(Deserialize)]
pub struct EnrollRequest {
    pub user_id: Uuid,
}

/// GET /api/v1/courses
pub async fn handle_list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseRow>>, AppError> {
    Ok(Json(list_courses(&state.db).await?))
}

/// POST /api/v1/courses
pub async fn handle_create_course(
    State(state): State<AppState>,
    Json(req): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CourseRow>), AppError> {
    let course = create_course(&state.db, &req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// GET /api/v1/courses/:id
pub async fn handle_get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseRow>, AppError> {
    Ok(Json(get_course(&state.db, id).await?))
}

/// PUT /api/v1/courses/:id
pub async fn handle_update_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<CourseRow>, AppError> {
    Ok(Json(update_course(&state.db, id, &req).await?))
}

/// DELETE /api/v1/courses/:id?instructor_id=
pub async fn handle_delete_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<InstructorQuery>,
) -> Result<StatusCode, AppError> {
    delete_course(&state.db, id, params.instructor_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/instructors/:id/courses
pub async fn handle_instructor_courses(
    State(state): State<AppState>,
    Path(instructor_id): Path<Uuid>,
) -> Result<Json<Vec<CourseRow>>, AppError> {
    Ok(Json(list_instructor_courses(&state.db, instructor_id).await?))
}

/// POST /api/v1/courses/:id/enroll
pub async fn handle_enroll(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(req): Json<EnrollRequest>,
) -> Result<Json<EnrollmentRow>, AppError> {
    Ok(Json(enroll(&state.db, course_id, req.user_id).await?))
}

/// GET /api/v1/courses/:id/students?instructor_id=
pub async fn handle_enrolled_students(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Query(params): Query<InstructorQuery>,
) -> Result<Json<Vec<EnrollmentRow>>, AppError> {
    let roster = enrolled_students(&state.db, course_id, params.instructor_id).await?;
    Ok(Json(roster))
}

/// GET /api/v1/users/:id/enrollments
pub async fn handle_user_enrollments(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<CourseRow>>, AppError> {
    Ok(Json(enrolled_courses(&state.db, user_id).await?))
}
