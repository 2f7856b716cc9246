pub mod candidate_dto;
pub mod join_request_dto;
pub mod posting_dto;
pub mod recommendation_dto;
