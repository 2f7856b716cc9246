pub mod candidate_service;
pub mod join_request_service;
pub mod posting_service;
pub mod recommendation;
pub mod skill_matcher;
