pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::catalog::handlers as catalog;
use crate::recommendation::handlers as recommendation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Recommendation API
        .route(
            "/api/v1/recommendations",
            post(recommendation::handle_recommend),
        )
        .route(
            "/api/v1/recommendations/direct",
            post(recommendation::handle_recommend_direct),
        )
        .route(
            "/api/v1/recommendations/quota",
            get(recommendation::handle_quota),
        )
        // Catalog API
        .route(
            "/api/v1/courses",
            get(catalog::handle_list_courses).post(catalog::handle_create_course),
        )
        .route(
            "/api/v1/courses/:id",
            get(catalog::handle_get_course)
                .put(catalog::handle_update_course)
                .delete(catalog::handle_delete_course),
        )
        .route("/api/v1/courses/:id/enroll", post(catalog::handle_enroll))
        .route(
            "/api/v1/courses/:id/students",
            get(catalog::handle_enrolled_students),
        )
        .route(
            "/api/v1/instructors/:id/courses",
            get(catalog::handle_instructor_courses),
        )
        .route(
            "/api/v1/users/:id/enrollments",
            get(catalog::handle_user_enrollments),
        )
        .with_state(state)
}
