pub mod candidate;
pub mod join_request;
pub mod match_result;
pub mod posting;
