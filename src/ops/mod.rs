pub mod calling_ops;
pub mod unit_ops;
pub mod organization_ops;
pub mod position_ops;
pub mod member_ops;
pub mod group_ops;
