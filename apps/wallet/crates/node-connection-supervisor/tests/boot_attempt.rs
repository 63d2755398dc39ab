//! End-to-end behavior of one boot attempt: status ticks, settlement,
//! failure classification, and the diagnostic trail left in the sink.

use async_trait::async_trait;
use node_connection_supervisor::{
    BootScreen, ConnectionFailure, ConnectionState, ConnectionSupervisor, NodeConnector,
    StatusReporter,
};
use observability::{LogKind, LogPayload, LogSink};
use serde_json::json;
use std::time::Duration;

/// Connector whose progress and outcome are fixed up front.
struct Script {
    ticks: Vec<&'static str>,
    rejection: Option<Option<&'static str>>,
}

impl Script {
    fn resolves(ticks: Vec<&'static str>) -> Self {
        Self {
            ticks,
            rejection: None,
        }
    }

    fn rejects(ticks: Vec<&'static str>, reason: Option<&'static str>) -> Self {
        Self {
            ticks,
            rejection: Some(reason),
        }
    }
}

#[async_trait]
impl NodeConnector for Script {
    async fn connect(&self, _server: &str, status: StatusReporter) -> Result<(), ConnectionFailure> {
        for tick in &self.ticks {
            status.report(*tick);
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        match self.rejection {
            None => Ok(()),
            Some(reason) => Err(ConnectionFailure::from_rejection(reason)),
        }
    }
}

async fn run(server: &str, script: Script) -> (ConnectionSupervisor, LogSink, Vec<String>) {
    let sink = LogSink::default();
    let supervisor = ConnectionSupervisor::new("en", sink.clone());
    let mut ticks = Vec::new();
    let _ = supervisor
        .begin_attempt(server, &script, |s| ticks.push(s.to_string()))
        .await;
    (supervisor, sink, ticks)
}

fn assert_terminal_invariants(state: &ConnectionState) {
    assert!(state.is_terminal());
    assert!(!(state.connected && state.api_error));
    if state.sync_error.is_some() {
        assert!(state.api_error);
    }
}

#[tokio::test]
async fn successful_boot_keeps_last_status() {
    let (supervisor, _, ticks) =
        run("node1.example.com", Script::resolves(vec!["fetching state"])).await;

    let state = supervisor.state();
    assert_terminal_invariants(&state);
    assert!(state.connected);
    assert!(!state.api_error);
    assert_eq!(state.sync_error, None);
    assert_eq!(state.status, "fetching state");
    assert_eq!(ticks, vec!["fetching state"]);
}

#[tokio::test]
async fn chain_sync_rejection_with_empty_server() {
    let (supervisor, sink, _) = run(
        "",
        Script::rejects(vec![], Some("ChainStore sync error: bad block")),
    )
    .await;

    let state = supervisor.state();
    assert_terminal_invariants(&state);
    assert!(!state.connected);
    assert!(state.api_error);
    assert_eq!(state.sync_error, Some(true));
    assert_eq!(supervisor.screen(), BootScreen::SyncError);

    let errors: Vec<_> = sink
        .snapshot()
        .entries
        .into_iter()
        .filter(|e| e.kind == LogKind::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].payload,
        LogPayload::Args(vec![
            json!("node connection attempt failed:"),
            json!({
                "server": "",
                "failure": "chain-sync-mismatch",
                "reason": "ChainStore sync error: bad block",
                "syncError": true,
            }),
        ])
    );
}

#[tokio::test]
async fn refused_connection_is_not_a_sync_error() {
    let (supervisor, _, _) = run("node2", Script::rejects(vec![], Some("ECONNREFUSED"))).await;

    let state = supervisor.state();
    assert_terminal_invariants(&state);
    assert!(!state.connected);
    assert!(state.api_error);
    assert_eq!(state.sync_error, Some(false));
    assert_eq!(supervisor.screen(), BootScreen::InitError);
}

#[tokio::test]
async fn rejection_without_reason_is_unknown() {
    for reason in [None, Some("")] {
        let (supervisor, sink, _) = run("node3", Script::rejects(vec![], reason)).await;

        let state = supervisor.state();
        assert_terminal_invariants(&state);
        assert!(state.api_error);
        assert_eq!(state.sync_error, None);
        assert!(sink.snapshot().to_json().contains("\"unknown\""));
    }
}

#[tokio::test]
async fn sink_exports_records_in_call_order() {
    let sink = LogSink::default();
    sink.record(LogKind::Log, LogPayload::Args(vec![json!("a")]));
    sink.record(LogKind::Error, LogPayload::Args(vec![json!("b")]));
    sink.record(LogKind::Warn, LogPayload::Args(vec![json!("c")]));

    let entries = sink.export().await.entries;
    let kinds: Vec<LogKind> = entries.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![LogKind::Log, LogKind::Error, LogKind::Warn]);
    assert!(entries.windows(2).all(|w| w[0].sequence < w[1].sequence));
}

#[tokio::test]
async fn watchers_never_see_status_go_backwards() {
    let sink = LogSink::default();
    let supervisor = ConnectionSupervisor::new("en", sink);
    let mut rx = supervisor.subscribe();

    let observer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            if seen.last() != Some(&state.status) {
                seen.push(state.status.clone());
            }
            if state.is_terminal() {
                break;
            }
        }
        seen
    });

    let script = Script::rejects(vec!["s1", "s2", "s3"], Some("ECONNREFUSED"));
    let _ = supervisor.begin_attempt("node", &script, |_| {}).await;

    let seen = observer.await.unwrap();
    let order: Vec<usize> = ["s1", "s2", "s3"]
        .iter()
        .filter_map(|s| seen.iter().position(|x| x == s))
        .collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(seen.last().map(String::as_str), Some("s3"));
    assert_eq!(supervisor.state().status, "s3");
}

#[tokio::test]
async fn terminal_state_survives_reports_from_a_lingering_connector() {
    /// Hands a clone of its reporter back to the test, then fails.
    struct Lingering {
        reporter: std::sync::Mutex<Option<StatusReporter>>,
    }

    #[async_trait]
    impl NodeConnector for Lingering {
        async fn connect(
            &self,
            _server: &str,
            status: StatusReporter,
        ) -> Result<(), ConnectionFailure> {
            *self.reporter.lock().unwrap() = Some(status.clone());
            Err(ConnectionFailure::from_message("ECONNRESET"))
        }
    }

    let connector = Lingering {
        reporter: std::sync::Mutex::new(None),
    };
    let supervisor = ConnectionSupervisor::new("en", LogSink::default());
    let mut ticks = Vec::new();
    let _ = supervisor
        .begin_attempt("node", &connector, |s| ticks.push(s.to_string()))
        .await;
    let settled = supervisor.state();

    let late = connector.reporter.lock().unwrap().take().unwrap();
    let reported = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let closed = late.is_closed();
        late.report("after settlement");
        closed
    });
    assert!(reported.await.unwrap());

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(supervisor.state(), settled);
    assert!(ticks.is_empty());
    assert_terminal_invariants(&settled);
}
