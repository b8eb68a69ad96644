use axum::Router;

use crate::{
    admin, assessment, auth, horoscope, mentor, payment, state::ApiState, student,
};

/// V1 API routes, mounted under `/api`
pub fn routes() -> Router<ApiState> {
    Router::new()
        .merge(auth::routes())
        .merge(student::routes())
        .merge(mentor::routes())
        .merge(assessment::routes())
        .merge(horoscope::routes())
        .merge(payment::routes())
        .merge(admin::routes())
}
