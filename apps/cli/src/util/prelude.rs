pub use crate::print_output;
pub use crate::util::error::{Failure, NotifyErr};
pub use athena_utils::notify::{Notification, Notifier};
