pub mod health_handler;
pub mod quiz_session_handler;

use actix_web::web;

pub use health_handler::{health_check, health_check_ready};
pub use quiz_session_handler::{
    create_session, discard_session, get_quiz_overview, get_session, get_session_result,
    get_student_results, next_question, previous_question, select_answer, start_session,
    submit_session, tick_session,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(health_check_ready)
        .service(get_quiz_overview)
        .service(create_session)
        .service(get_session)
        .service(start_session)
        .service(select_answer)
        .service(next_question)
        .service(previous_question)
        .service(tick_session)
        .service(submit_session)
        .service(get_session_result)
        .service(discard_session)
        .service(get_student_results);
}
