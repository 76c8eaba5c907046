/// Terminal front-end for the admin dashboard
///
/// Renders every reconciled snapshot and reads operator commands from stdin.
use crate::{
    config::MonitorConfig,
    error::ModResult,
    monitor::{
        dashboard::{BanForm, Dashboard, DashboardView, MutationOutcome},
        gateway::HttpGateway,
        poller::Poller,
        session::UrlSession,
    },
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "commands: ban <ip> [reason] | unban <ip> | refresh | auto on|off | key <admin-key> | status | help | quit";

/// One line of operator input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ban { ip: String, reason: String },
    Unban(String),
    Refresh,
    Auto(bool),
    Key(String),
    Status,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "ban" if !rest.is_empty() => {
                let (ip, reason) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                Command::Ban {
                    ip: ip.to_string(),
                    reason: reason.trim().to_string(),
                }
            }
            "unban" if !rest.is_empty() => Command::Unban(rest.to_string()),
            "refresh" => Command::Refresh,
            "auto" => match rest {
                "on" => Command::Auto(true),
                "off" => Command::Auto(false),
                _ => Command::Unknown(line.to_string()),
            },
            "key" | "connect" => Command::Key(rest.to_string()),
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        };

        Some(command)
    }
}

fn describe(outcome: MutationOutcome) -> &'static str {
    match outcome {
        MutationOutcome::Applied => "done",
        MutationOutcome::Failed => "request failed, nothing changed",
        MutationOutcome::Busy => "another command is still running",
        MutationOutcome::Ignored => "nothing to do",
    }
}

/// Run the monitor until the operator quits or stdin closes
pub async fn run(config: &MonitorConfig, dashboard_url: &str) -> ModResult<()> {
    let session = UrlSession::parse(dashboard_url)?;
    let gateway = HttpGateway::new(&config.backend_url, Some(config.request_timeout()))?;
    let dashboard = Arc::new(Dashboard::new(Arc::new(gateway), session));

    if dashboard.key().await.is_none() {
        println!("No admin key in {}. Use `key <admin-key>` to connect.", dashboard_url);
    }

    let mut updates = dashboard.subscribe();
    let renderer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let view = DashboardView::from_status(&updates.borrow_and_update().status);
            println!("\n{}", view);
        }
    });

    let poller = Poller::start(Arc::clone(&dashboard), config.refresh_interval()).await;
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = Command::parse(&line) else {
            continue;
        };

        match command {
            Command::Ban { ip, reason } => {
                let mut form = BanForm::new(ip, reason);
                println!("ban: {}", describe(dashboard.submit_ban(&mut form).await));
            }
            Command::Unban(ip) => {
                println!("unban: {}", describe(dashboard.unban(&ip).await));
            }
            Command::Refresh => {
                dashboard.refresh().await;
            }
            Command::Auto(enabled) => dashboard.set_auto_refresh(enabled),
            Command::Key(key) => {
                dashboard.connect(&key).await;
                println!("session: {}", dashboard.location().await);
            }
            Command::Status => println!("{}", dashboard.view()),
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Unknown(line) => println!("unknown command: {}\n{}", line, HELP),
        }
    }

    poller.shutdown().await;
    renderer.abort();

    Ok(())
}
