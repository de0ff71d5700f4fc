pub mod identity;
pub mod notify;

pub use identity::{Actor, Role};
pub use notify::{DispatchError, NotificationDispatcher, NullDispatcher};
