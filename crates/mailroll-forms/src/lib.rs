//! The mailroll subscription engine.
//!
//! [`SubscriptionService`] applies subscribe/unsubscribe/update transitions,
//! bracketed by [`HookBus`](mailroll_core::hooks::HookBus) emissions.
//! [`Notifications`] composes and sends the verification and
//! unsubscribe-confirmation emails. Storage, rendering, and transport are
//! supplied by the caller through the traits in `mailroll-core`.

pub mod compose;
pub mod dispatch;
pub mod notify;
pub mod settings;
pub mod site;
pub mod subscription;

pub use compose::{Composed, NotificationComposer, NotificationTemplate};
pub use dispatch::MailDispatcher;
pub use notify::Notifications;
pub use settings::{MailSettings, SiteSender};
pub use site::{SiteConfig, SiteUrls};
pub use subscription::SubscriptionService;
