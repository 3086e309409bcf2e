pub mod ids;
pub mod user;
pub mod unit;
pub mod organization;
pub mod position;
pub mod member;
pub mod calling;
pub mod history;

// Re-exports for convenience
pub use ids::Id;
pub use user::User;
pub use unit::{Unit, UnitType};
pub use organization::Organization;
pub use position::Position;
pub use member::Member;
pub use calling::{Calling, CallingStatus, Holder, StatusBadge};
pub use history::{CallingHistory, HistoryAction};
