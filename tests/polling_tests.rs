/// Auto-refresh behaviour of the monitoring client under a paused clock
use anonychat_admin::{
    api::models::{BanEntry, StatusSnapshot},
    error::ModResult,
    moderation::ModerationStore,
    monitor::{BanForm, Dashboard, DashboardStatus, GatewayApi, MutationOutcome, Poller, UrlSession},
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, Instant};

const INTERVAL: Duration = Duration::from_secs(3);
const LATENCY: Duration = Duration::from_millis(500);

/// Gateway backed by an in-memory store with a fixed response latency
struct SlowGateway {
    store: ModerationStore,
    fetch_starts: Mutex<Vec<Instant>>,
    completed: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl SlowGateway {
    fn new() -> Self {
        Self {
            store: ModerationStore::memory(),
            fetch_starts: Mutex::new(Vec::new()),
            completed: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn fetches(&self) -> usize {
        self.fetch_starts.lock().unwrap().len()
    }

    fn starts(&self) -> Vec<Instant> {
        self.fetch_starts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GatewayApi for SlowGateway {
    async fn fetch_status(&self, _key: &str) -> ModResult<StatusSnapshot> {
        self.fetch_starts.lock().unwrap().push(Instant::now());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        sleep(LATENCY).await;
        let bans = self.store.get_banned_ips().await?;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);

        Ok(StatusSnapshot {
            banned_ips: bans.into_iter().map(BanEntry::from).collect(),
            ..StatusSnapshot::default()
        })
    }

    async fn ban(&self, _key: &str, ip: &str, reason: Option<&str>) -> ModResult<()> {
        self.store.ban_ip(ip, reason).await
    }

    async fn unban(&self, _key: &str, ip: &str) -> ModResult<()> {
        self.store.unban_ip(ip).await
    }
}

fn dashboard(url: &str) -> (Arc<SlowGateway>, Arc<Dashboard>) {
    let gateway = Arc::new(SlowGateway::new());
    let session = UrlSession::parse(url).unwrap();
    let dashboard = Arc::new(Dashboard::new(gateway.clone(), session));
    (gateway, dashboard)
}

#[tokio::test(start_paused = true)]
async fn test_polls_on_interval_one_at_a_time() {
    let (gateway, dashboard) = dashboard("http://localhost/admin?key=k");
    let started = Instant::now();

    let poller = Poller::start(dashboard.clone(), INTERVAL).await;
    sleep(Duration::from_secs(7) - started.elapsed()).await;

    let starts = gateway.starts();
    assert!(starts.len() >= 2, "expected at least 2 fetches, got {}", starts.len());
    for pair in starts.windows(2) {
        assert!(pair[1] - pair[0] >= INTERVAL);
    }
    assert_eq!(gateway.max_in_flight.load(Ordering::SeqCst), 1);
    assert!(matches!(dashboard.status(), DashboardStatus::Ready(_)));

    poller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_disabling_mid_flight_lets_fetch_finish() {
    let (gateway, dashboard) = dashboard("http://localhost/admin?key=k");
    let poller = Poller::spawn(dashboard.clone(), INTERVAL);

    // First tick at 3s, response due at 3.5s
    sleep(Duration::from_millis(3200)).await;
    assert_eq!(gateway.fetches(), 1);
    assert_eq!(gateway.completed.load(Ordering::SeqCst), 0);

    dashboard.set_auto_refresh(false);
    sleep(Duration::from_secs(10)).await;

    assert_eq!(gateway.fetches(), 1);
    assert_eq!(gateway.completed.load(Ordering::SeqCst), 1);
    assert!(matches!(dashboard.status(), DashboardStatus::Ready(_)));

    dashboard.set_auto_refresh(true);
    sleep(Duration::from_secs(4)).await;
    assert!(gateway.fetches() >= 2);

    drop(poller);
}

#[tokio::test(start_paused = true)]
async fn test_unbound_dashboard_never_polls_until_connected() {
    let (gateway, dashboard) = dashboard("http://localhost/admin");
    let _poller = Poller::start(dashboard.clone(), INTERVAL).await;

    sleep(Duration::from_secs(10)).await;
    assert_eq!(gateway.fetches(), 0);
    assert_eq!(dashboard.status(), DashboardStatus::Unbound);

    dashboard.connect("k").await;
    assert_eq!(gateway.fetches(), 1);

    sleep(Duration::from_secs(4)).await;
    assert!(gateway.fetches() >= 2);
}

#[tokio::test(start_paused = true)]
async fn test_stop_prevents_further_ticks() {
    let (gateway, dashboard) = dashboard("http://localhost/admin?key=k");
    let poller = Poller::spawn(dashboard, INTERVAL);

    sleep(Duration::from_millis(3200)).await;
    assert_eq!(gateway.fetches(), 1);

    poller.stop();
    assert!(poller.is_stopped());
    sleep(Duration::from_secs(30)).await;

    assert_eq!(gateway.fetches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_poller_stops_polling() {
    let (gateway, dashboard) = dashboard("http://localhost/admin?key=k");
    let poller = Poller::start(dashboard, INTERVAL).await;
    assert_eq!(gateway.fetches(), 1);

    drop(poller);
    sleep(Duration::from_secs(30)).await;

    assert_eq!(gateway.fetches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_ban_refreshes_immediately_without_waiting_for_tick() {
    let (gateway, dashboard) = dashboard("http://localhost/admin?key=k");
    let _poller = Poller::spawn(dashboard.clone(), INTERVAL);

    let mut form = BanForm::new("203.0.113.5", "spam");
    assert_eq!(dashboard.submit_ban(&mut form).await, MutationOutcome::Applied);
    assert_eq!(gateway.fetches(), 1);

    let view = dashboard.view();
    assert_eq!(view.banned_ips.len(), 1);
    assert_eq!(view.banned_ips[0].ip_address, "203.0.113.5");
}

#[tokio::test(start_paused = true)]
async fn test_connect_mid_interval_restarts_schedule() {
    let (gateway, dashboard) = dashboard("http://localhost/admin");
    let _poller = Poller::spawn(dashboard.clone(), INTERVAL);

    // The loop's first tick is due at 3s; binding just before it must push it back
    sleep(Duration::from_millis(2800)).await;
    dashboard.connect("k").await;
    sleep(Duration::from_secs(10)).await;

    let starts = gateway.starts();
    assert!(starts.len() >= 3, "expected at least 3 fetches, got {}", starts.len());
    for pair in starts.windows(2) {
        assert!(pair[1] - pair[0] >= INTERVAL, "fetches {:?} apart", pair[1] - pair[0]);
    }
    assert_eq!(gateway.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_ban_during_poll_fetch_waits_for_it() {
    let (gateway, dashboard) = dashboard("http://localhost/admin?key=k");
    let _poller = Poller::spawn(dashboard.clone(), INTERVAL);

    // Poll fetch runs from 3s to 3.5s
    sleep(Duration::from_millis(3100)).await;
    assert_eq!(gateway.fetches(), 1);

    let mut form = BanForm::new("203.0.113.5", "spam");
    assert_eq!(dashboard.submit_ban(&mut form).await, MutationOutcome::Applied);

    assert_eq!(gateway.fetches(), 2);
    assert_eq!(gateway.max_in_flight.load(Ordering::SeqCst), 1);
    let starts = gateway.starts();
    assert!(starts[1] - starts[0] >= LATENCY);

    // The refresh after the ban is the one displayed
    let view = dashboard.view();
    assert_eq!(view.banned_ips.len(), 1);
    assert_eq!(view.banned_ips[0].ip_address, "203.0.113.5");

    sleep(Duration::from_secs(2)).await;
    assert_eq!(gateway.fetches(), 2);
}
