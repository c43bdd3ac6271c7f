use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::{require_profile_owner, CurrentUser};
use crate::api::payload::ApiJson;
use crate::core::security;
use crate::core::state::AppState;
use crate::schemas::profile::{ProfileUpdate, TeacherProfileResponse};
use crate::schemas::test::{
    AssignRequest, AssignResponse, QuestionsUpdate, SubmissionRequest, TestCreate, TestResponse,
};
use crate::schemas::MessageResponse;
use crate::services::assessment::{ProfileChanges, TestListing};


pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/tests/:teacher_id", get(list_tests))
        .route("/classes", get(list_classes))
        .route("/profile/:profile_id", get(get_profile))
        .route("/create-test", post(create_test))
        .route("/update-test/:test_id", put(update_test))
        .route("/update-profile/:profile_id", put(update_profile))
        .route("/assigned-to/:test_id", put(assign_test))
        .route("/delete-test/:test_id", delete(delete_test))
        .route("/test/:test_id", get(get_test))
        .route("/student/attempt/:test_id", post(attempt_test))
        .route("/student/submit/:test_id", post(submit_test))
}

async fn list_tests(
    Path(teacher_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<TestListing>>, ApiError> {
    let tests = state.assessment().list_tests_for_teacher(&teacher_id).await?;
    Ok(Json(tests))
}

async fn list_classes(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let classes = state.assessment().list_distinct_class_names().await?;
    Ok(Json(classes))
}

async fn get_profile(
    Path(profile_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<TeacherProfileResponse>, ApiError> {
    let profile = state.assessment().get_teacher_profile(&profile_id).await?;
    Ok(Json(TeacherProfileResponse::from_profile(profile)))
}

async fn create_test(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TestCreate>,
) -> Result<Json<TestResponse>, ApiError> {
    let test = state.assessment().create_test(payload.into()).await?;
    Ok(Json(TestResponse::from_db(test)))
}

async fn update_test(
    Path(test_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<QuestionsUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.assessment().update_test_questions(&test_id, payload.questions).await?;
    Ok(Json(MessageResponse::new("Questions successfully updated")))
}

async fn update_profile(
    Path(profile_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ProfileUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_profile_owner(&state, &user, &profile_id).await?;

    let password_hash = match payload.password.as_deref() {
        Some(password) if password.is_empty() => {
            return Err(ApiError::BadRequest("password must not be empty".to_string()));
        }
        Some(password) => Some(
            security::hash_password(password)
                .map_err(|e| ApiError::internal(e, "Failed to hash password"))?,
        ),
        None => None,
    };

    let changes = ProfileChanges {
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        phone: payload.phone,
        password_hash,
    };

    state.assessment().update_teacher_profile(&profile_id, changes).await?;
    Ok(Json(MessageResponse::new("Profile successfully updated")))
}

async fn assign_test(
    Path(test_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<AssignRequest>,
) -> Result<Json<AssignResponse>, ApiError> {
    let assigned_to =
        state.assessment().assign_test_to_classes(&test_id, &payload.class_names).await?;
    Ok(Json(AssignResponse { message: "Test assigned".to_string(), assigned_to }))
}

async fn delete_test(
    Path(test_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.assessment().delete_test(&test_id).await?;
    Ok(Json(MessageResponse::new("Test successfully deleted")))
}

async fn get_test(
    Path(test_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<TestResponse>, ApiError> {
    let test = state.assessment().get_test(&test_id).await?;
    Ok(Json(TestResponse::from_db(test)))
}

async fn attempt_test(
    Path(test_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let student = state.assessment().student_for_user(&user.id).await?;
    state.assessment().record_attempt(&test_id, &student.id).await?;
    Ok(Json(MessageResponse::new("Attempt recorded")))
}

async fn submit_test(
    Path(test_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SubmissionRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let student = state.assessment().student_for_user(&user.id).await?;
    state.assessment().record_submission(&test_id, &student.id, payload.answers).await?;
    Ok(Json(MessageResponse::new("Submission recorded")))
}
