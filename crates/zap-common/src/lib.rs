pub mod errors;
pub mod id;
pub mod notifications;

pub use errors::{ConfigError, PlatformError, ZapError};
pub use id::{new_correlation_id, new_id, InstanceId};
pub use notifications::{Notification, NotificationCenter, NotificationKind};

pub type Result<T> = std::result::Result<T, ZapError>;
