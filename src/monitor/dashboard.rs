/// Admin dashboard state
///
/// Binds to an admin key, reconciles the displayed state wholesale with the
/// latest gateway snapshot and issues ban/unban commands. The ban list shown
/// is always the one the gateway returned; mutations are followed by a
/// refresh instead of a local edit. Every fetch, whoever starts it, passes
/// through one gate, so at most one is in flight per dashboard.
use crate::{
    api::models::{ActiveRoom, BanEntry, StatusSnapshot},
    monitor::{
        gateway::GatewayApi,
        session::{normalize_key, SessionStore},
    },
};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{futures::Notified, watch, Mutex, Notify, RwLock};
use tracing::{debug, info, warn};

/// What the dashboard currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardStatus {
    /// No admin key; nothing is fetched
    Unbound,
    /// Key bound, first snapshot not in yet
    Pending,
    /// Last fetch succeeded
    Ready(StatusSnapshot),
    /// Last fetch failed or the key was rejected
    Forbidden,
}

/// Published state; `revision` is the sequence number of the request that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    pub revision: u64,
    pub status: DashboardStatus,
}

/// Result of a ban or unban command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Gateway accepted the command and a refresh followed
    Applied,
    /// Gateway rejected the command or was unreachable; no refresh
    Failed,
    /// Another command is still in flight
    Busy,
    /// Nothing to send (blank address or no key bound)
    Ignored,
}

/// Ban form inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BanForm {
    pub ip: String,
    pub reason: String,
}

impl BanForm {
    pub fn new(ip: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            reason: reason.into(),
        }
    }

    pub fn clear(&mut self) {
        self.ip.clear();
        self.reason.clear();
    }
}

/// Holds the busy flag for the lifetime of one command
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Admin monitoring client state
pub struct Dashboard {
    gateway: Arc<dyn GatewayApi>,
    session: RwLock<Box<dyn SessionStore>>,
    state: watch::Sender<DashboardState>,
    auto_refresh: AtomicBool,
    busy: AtomicBool,
    next_revision: AtomicU64,
    fetch_gate: Mutex<()>,
    fetch_started: Notify,
}

impl Dashboard {
    /// Load the dashboard from a session. Auto-refresh starts enabled.
    pub fn new(gateway: Arc<dyn GatewayApi>, session: impl SessionStore + 'static) -> Self {
        let status = if session.get_key().is_some() {
            DashboardStatus::Pending
        } else {
            DashboardStatus::Unbound
        };
        let (state, _) = watch::channel(DashboardState {
            revision: 0,
            status,
        });

        Self {
            gateway,
            session: RwLock::new(Box::new(session)),
            state,
            auto_refresh: AtomicBool::new(true),
            busy: AtomicBool::new(false),
            next_revision: AtomicU64::new(0),
            fetch_gate: Mutex::new(()),
            fetch_started: Notify::new(),
        }
    }

    /// Currently bound key
    pub async fn key(&self) -> Option<String> {
        self.session.read().await.get_key()
    }

    /// Where the session currently lives (the dashboard URL)
    pub async fn location(&self) -> String {
        self.session.read().await.location()
    }

    pub fn status(&self) -> DashboardStatus {
        self.state.borrow().status.clone()
    }

    /// Watch every reconciliation
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub fn view(&self) -> DashboardView {
        DashboardView::from_status(&self.state.borrow().status)
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh.load(Ordering::Acquire)
    }

    /// Takes effect at the next poll tick; a fetch already in flight completes
    pub fn set_auto_refresh(&self, enabled: bool) {
        self.auto_refresh.store(enabled, Ordering::Release);
        info!("Auto refresh {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Whether the poll loop should fetch on this tick
    pub async fn should_poll(&self) -> bool {
        self.auto_refresh() && self.key().await.is_some()
    }

    /// Bind to `key`, persist it into the session and fetch immediately.
    /// A blank key removes it from the session and unbinds.
    pub async fn connect(&self, key: &str) {
        let key = normalize_key(key);

        {
            let mut session = self.session.write().await;
            match &key {
                Some(key) => session.set_key(key),
                None => session.clear_key(),
            }
        }

        match key {
            Some(_) => {
                self.refresh().await;
            }
            None => {
                let revision = self.take_revision();
                self.publish(revision, DashboardStatus::Unbound);
            }
        }
    }

    /// Fetch the current snapshot with the bound key. Returns whether the
    /// fetch succeeded; an unbound dashboard makes no request.
    ///
    /// Waits for any fetch already in flight before sending its own.
    pub async fn refresh(&self) -> bool {
        let _gate = self.fetch_gate.lock().await;

        let Some(key) = self.key().await else {
            debug!("No admin key bound, skipping refresh");
            return false;
        };

        let revision = self.take_revision();
        self.fetch_started.notify_one();

        match self.gateway.fetch_status(&key).await {
            Ok(snapshot) => {
                self.publish(revision, DashboardStatus::Ready(snapshot));
                true
            }
            Err(e) => {
                warn!("Status fetch failed: {}", e);
                self.publish(revision, DashboardStatus::Forbidden);
                false
            }
        }
    }

    /// Ban the address in `form`. On success the form is cleared and the
    /// dashboard refreshed; on failure the previous status stays visible.
    pub async fn submit_ban(&self, form: &mut BanForm) -> MutationOutcome {
        let ip = form.ip.trim().to_string();
        if ip.is_empty() {
            return MutationOutcome::Ignored;
        }
        let Some(key) = self.key().await else {
            return MutationOutcome::Ignored;
        };
        let reason = form.reason.trim().to_string();
        let reason = (!reason.is_empty()).then_some(reason);

        let result = {
            let Some(_busy) = BusyGuard::acquire(&self.busy) else {
                return MutationOutcome::Busy;
            };
            self.gateway.ban(&key, &ip, reason.as_deref()).await
        };

        match result {
            Ok(()) => {
                info!("Banned {}", ip);
                form.clear();
                self.refresh().await;
                MutationOutcome::Applied
            }
            Err(e) => {
                warn!("Ban of {} failed: {}", ip, e);
                MutationOutcome::Failed
            }
        }
    }

    /// Lift a ban and refresh on success
    pub async fn unban(&self, ip: &str) -> MutationOutcome {
        let ip = ip.trim();
        if ip.is_empty() {
            return MutationOutcome::Ignored;
        }
        let Some(key) = self.key().await else {
            return MutationOutcome::Ignored;
        };

        let result = {
            let Some(_busy) = BusyGuard::acquire(&self.busy) else {
                return MutationOutcome::Busy;
            };
            self.gateway.unban(&key, ip).await
        };

        match result {
            Ok(()) => {
                info!("Unbanned {}", ip);
                self.refresh().await;
                MutationOutcome::Applied
            }
            Err(e) => {
                warn!("Unban of {} failed: {}", ip, e);
                MutationOutcome::Failed
            }
        }
    }

    /// Resolves when a fetch starts; a start with nobody waiting is kept
    /// for the next caller
    pub(crate) fn fetch_started(&self) -> Notified<'_> {
        self.fetch_started.notified()
    }

    fn take_revision(&self) -> u64 {
        self.next_revision.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Replace the displayed state unless a newer request already did
    fn publish(&self, revision: u64, status: DashboardStatus) {
        self.state.send_if_modified(|current| {
            if revision <= current.revision {
                debug!(
                    "Discarding response {} older than displayed {}",
                    revision, current.revision
                );
                return false;
            }
            current.revision = revision;
            current.status = status;
            true
        });
    }
}

/// Render-ready summary of a dashboard status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardView {
    pub bound: bool,
    pub forbidden: bool,
    pub active_rooms: Vec<ActiveRoom>,
    pub waiting_count: u64,
    pub banned_ips: Vec<BanEntry>,
}

impl DashboardView {
    pub fn from_status(status: &DashboardStatus) -> Self {
        match status {
            DashboardStatus::Unbound => Self::default(),
            DashboardStatus::Pending => Self {
                bound: true,
                ..Self::default()
            },
            DashboardStatus::Forbidden => Self {
                bound: true,
                forbidden: true,
                ..Self::default()
            },
            DashboardStatus::Ready(snapshot) => Self {
                bound: true,
                forbidden: false,
                active_rooms: snapshot.active_rooms.clone(),
                waiting_count: snapshot.waiting_count,
                banned_ips: snapshot.banned_ips.clone(),
            },
        }
    }

    pub fn active_count(&self) -> usize {
        self.active_rooms.len()
    }

    pub fn banned_count(&self) -> usize {
        self.banned_ips.len()
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.bound {
            return writeln!(f, "Not connected. Enter an admin key.");
        }
        if self.forbidden {
            return writeln!(f, "Forbidden or server error");
        }

        writeln!(
            f,
            "Active Rooms: {}   Waiting Queue: {}   Banned IPs: {}",
            self.active_count(),
            self.waiting_count,
            self.banned_count()
        )?;

        writeln!(f, "\nActive Rooms")?;
        if self.active_rooms.is_empty() {
            writeln!(f, "  No active rooms")?;
        }
        for room in &self.active_rooms {
            writeln!(f, "  {:<24} {}", room.room_id, room.ips.join(" , "))?;
        }

        writeln!(f, "\nBanned IPs")?;
        if self.banned_ips.is_empty() {
            writeln!(f, "  No bans")?;
        }
        for ban in &self.banned_ips {
            writeln!(
                f,
                "  {:<40} {:<24} {}",
                ban.ip_address,
                ban.reason.as_deref().unwrap_or("-"),
                ban.timestamp
            )?;
        }

        Ok(())
    }
}
