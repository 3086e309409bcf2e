pub mod calling_queries;
pub mod position_queries;
pub mod dashboard_queries;
