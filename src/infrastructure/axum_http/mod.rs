pub mod default_routers;
pub mod http_serve;
pub mod outcome_responses;
pub mod routers;
