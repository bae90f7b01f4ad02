pub mod quiz_result_service;
pub mod quiz_service;
pub mod quiz_session_service;
pub mod scoring_service;
