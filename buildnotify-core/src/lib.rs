//! # buildnotify-core
//!
//! Foundation layer for build notifications: what is being notified about,
//! how the title and message are worked out, and how a reporter is called.
//!
//! ### Key Submodules:
//! - `item`: artifacts and upstream build errors
//! - `template`: `<%= expr %>` interpolation
//! - `resolve`: configuration precedence into a [`Notification`]
//! - `reporter`: the reporting capability boundary and stock reporters
//! - `invoke`: isolated, logged reporter invocation
//! - `registry`: process-wide log level, log sink and default reporter

pub mod error;
pub mod invoke;
pub mod item;
pub mod notification;
pub mod options;
pub mod registry;
pub mod reporter;
pub mod resolve;
pub mod template;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::invoke::{dispatch, invoke, Outcome};
    pub use crate::item::*;
    pub use crate::notification::Notification;
    pub use crate::options::*;
    pub use crate::registry::{LogLevel, Registry};
    pub use crate::reporter::*;
    pub use crate::resolve::{resolve, DEFAULT_ERROR_TITLE, DEFAULT_TITLE};
}

pub use error::{NotifyError, ReporterError, TemplateError};
pub use notification::Notification;
