use actix_web::{delete, get, post, put, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{CreateSessionRequest, SelectAnswerRequest, TickRequest},
        response::{DeleteSessionResponse, QuizOverview},
    },
};

#[get("/api/quizzes/{quiz_id}")]
pub async fn get_quiz_overview(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let quiz = state.quiz_service.get_quiz(&quiz_id).await?;
    Ok(HttpResponse::Ok().json(QuizOverview::from(&quiz)))
}

#[post("/api/quizzes/{quiz_id}/sessions")]
pub async fn create_session(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    request: web::Json<CreateSessionRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let view = state
        .session_service
        .create_session(&quiz_id, &request.student_id)
        .await?;
    Ok(HttpResponse::Created().json(view))
}

#[get("/api/sessions/{id}")]
pub async fn get_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let view = state.session_service.view(&id).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/api/sessions/{id}/start")]
pub async fn start_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let view = state.session_service.start(&id).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[put("/api/sessions/{id}/answers")]
pub async fn select_answer(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<SelectAnswerRequest>,
) -> Result<HttpResponse, AppError> {
    let view = state
        .session_service
        .select_answer(&id, request.question_index, request.option_index)
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/api/sessions/{id}/next")]
pub async fn next_question(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let view = state.session_service.next_question(&id).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/api/sessions/{id}/previous")]
pub async fn previous_question(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let view = state.session_service.previous_question(&id).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/api/sessions/{id}/tick")]
pub async fn tick_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<TickRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;

    let view = state
        .session_service
        .tick(&id, request.elapsed_seconds)
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/api/sessions/{id}/submit")]
pub async fn submit_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let view = state.session_service.submit(&id).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[get("/api/sessions/{id}/result")]
pub async fn get_session_result(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let result = state.session_service.result(&id).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[delete("/api/sessions/{id}")]
pub async fn discard_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.session_service.discard(&id).await?;
    Ok(HttpResponse::Ok().json(DeleteSessionResponse {
        message: format!("Session '{}' discarded", id.as_str()),
    }))
}

#[get("/api/students/{student_id}/results")]
pub async fn get_student_results(
    state: web::Data<AppState>,
    student_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let results = state
        .session_service
        .results_for_student(&student_id)
        .await?;
    Ok(HttpResponse::Ok().json(results))
}
