/// Admin Monitoring Client
///
/// Keeps an operator's view of the service continuously reconciled with the
/// admin gateway: session bound to the dashboard URL's `key` parameter,
/// cancellable auto-refresh loop, and ban/unban commands that are always
/// followed by a fresh snapshot rather than a local edit.

pub mod dashboard;
pub mod gateway;
pub mod poller;
pub mod session;
pub mod terminal;

pub use dashboard::{BanForm, Dashboard, DashboardState, DashboardStatus, DashboardView, MutationOutcome};
pub use gateway::{GatewayApi, HttpGateway};
pub use poller::Poller;
pub use session::{SessionStore, UrlSession};
