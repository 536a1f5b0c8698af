use chrono::{Datelike, Duration as ChronoDuration, Local};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Goal {
    id: String,
    title: String,
    #[serde(rename = "type")]
    kind: String,
    target: u64,
}

#[derive(Debug, Deserialize)]
struct GoalCard {
    goal: Goal,
    value: serde_json::Value,
    done: bool,
}

#[derive(Debug, Deserialize)]
struct DayView {
    date: String,
    locked: bool,
    next_date: Option<String>,
    cards: Vec<GoalCard>,
    completed: usize,
    total: usize,
}

impl DayView {
    fn card(&self, id: &str) -> &GoalCard {
        self.cards
            .iter()
            .find(|card| card.goal.id == id)
            .expect("missing goal card")
    }
}

#[derive(Debug, Deserialize)]
struct ReportRow {
    goal_id: String,
    success_count: u32,
    percent: u64,
}

#[derive(Debug, Deserialize)]
struct MonthlyReport {
    month: String,
    days_considered: u32,
    rows: Vec<ReportRow>,
}

struct TestServer {
    base_url: String,
    data_path: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("orbit_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/today")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_orbit"))
        .env("PORT", port.to_string())
        .env("ORBIT_DATA_PATH", &data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        data_path,
        child,
    }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn create_goal(client: &Client, base_url: &str, body: serde_json::Value) -> Goal {
    let response = client
        .post(format!("{base_url}/api/goals"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

async fn day(client: &Client, base_url: &str, date: &str) -> DayView {
    client
        .get(format!("{base_url}/api/days/{date}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_number_goal_never_drops_below_zero() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let goal = create_goal(
        &client,
        &server.base_url,
        serde_json::json!({ "title": "Glasses of water", "type": "number", "target": 3 }),
    )
    .await;
    assert_eq!(goal.kind, "number");
    assert_eq!(goal.target, 3);

    let today: DayView = client
        .get(format!("{}/api/today", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!today.locked);
    assert!(today.next_date.is_none());

    let mut last = None;
    for delta in [2, 1, -5, -1, 3] {
        let view: DayView = client
            .post(format!("{}/api/days/{}/adjust", server.base_url, today.date))
            .json(&serde_json::json!({ "goal_id": goal.id, "delta": delta }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        last = Some(view);
    }

    let view = last.unwrap();
    let card = view.card(&goal.id);
    assert_eq!(card.value, serde_json::json!(3));
    assert!(card.done);
    assert!(view.completed <= view.total);
}

#[tokio::test]
async fn http_writes_to_other_days_are_ignored() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let goal = create_goal(
        &client,
        &server.base_url,
        serde_json::json!({ "title": "Meditate", "type": "boolean" }),
    )
    .await;

    let yesterday = (Local::now().date_naive() - ChronoDuration::days(1))
        .format("%Y-%m-%d")
        .to_string();
    let response = client
        .post(format!("{}/api/days/{yesterday}/record", server.base_url))
        .json(&serde_json::json!({ "goal_id": goal.id, "value": true }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let view: DayView = response.json().await.unwrap();
    assert!(view.locked);
    assert!(!view.card(&goal.id).done);

    let reloaded = day(&client, &server.base_url, &yesterday).await;
    assert_eq!(reloaded.card(&goal.id).value, serde_json::json!(0));
}

#[tokio::test]
async fn http_delete_requires_confirmation_and_keeps_history() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let goal = create_goal(
        &client,
        &server.base_url,
        serde_json::json!({ "title": "Journal", "type": "boolean", "icon": "fa-book" }),
    )
    .await;
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    client
        .post(format!("{}/api/days/{today}/record", server.base_url))
        .json(&serde_json::json!({ "goal_id": goal.id, "value": true }))
        .send()
        .await
        .unwrap();

    let cancelled = client
        .delete(format!("{}/api/goals/{}", server.base_url, goal.id))
        .send()
        .await
        .unwrap();
    assert_eq!(cancelled.status(), StatusCode::BAD_REQUEST);

    let goals: Vec<Goal> = client
        .get(format!("{}/api/goals", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(goals.iter().any(|g| g.id == goal.id && g.title == "Journal"));

    let deleted = client
        .delete(format!("{}/api/goals/{}?confirm=true", server.base_url, goal.id))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let again = client
        .delete(format!("{}/api/goals/{}?confirm=true", server.base_url, goal.id))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);

    let saved: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&server.data_path).unwrap()).unwrap();
    assert_eq!(saved["orbit_history"][&today][&goal.id], serde_json::json!(true));
    assert!(saved["orbit_goals"]
        .as_array()
        .unwrap()
        .iter()
        .all(|g| g["id"] != serde_json::json!(goal.id)));

    let view = day(&client, &server.base_url, &today).await;
    assert!(view.cards.iter().all(|card| card.goal.id != goal.id));

    let month = Local::now().date_naive().format("%Y-%m").to_string();
    let report: MonthlyReport = client
        .get(format!("{}/api/reports/{month}", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(report.rows.iter().all(|row| row.goal_id != goal.id));
}

#[tokio::test]
async fn http_report_for_past_month_uses_full_month() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let report: MonthlyReport = client
        .get(format!("{}/api/reports/2020-02", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report.month, "2020-02");
    assert_eq!(report.days_considered, 29);
    assert!(report.rows.iter().all(|row| row.success_count == 0 && row.percent == 0));

    let current: MonthlyReport = client
        .get(format!(
            "{}/api/reports/{}",
            server.base_url,
            Local::now().date_naive().format("%Y-%m")
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(current.days_considered, Local::now().date_naive().day());

    let export = client
        .get(format!("{}/api/reports/2020-02/export", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(export.status().is_success());
    let disposition = export
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("crypt_progress_tracker_2020-2.txt"));
    let body = export.text().await.unwrap();
    assert!(body.contains("February 2020 Report"));
}

#[tokio::test]
async fn http_rejects_malformed_dates_and_months() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let bad_day = client
        .get(format!("{}/api/days/2026-02-30", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_day.status(), StatusCode::BAD_REQUEST);

    let bad_month = client
        .get(format!("{}/api/reports/2026-13", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_month.status(), StatusCode::BAD_REQUEST);

    let bad_goal = client
        .post(format!("{}/api/goals", server.base_url))
        .json(&serde_json::json!({ "title": "Pushups", "type": "number" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_goal.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_html_forms_create_and_toggle() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let page = client
        .post(format!("{}/goals", server.base_url))
        .form(&[("title", "Evening walk"), ("icon", ""), ("type", "boolean"), ("target", "")])
        .send()
        .await
        .unwrap();
    assert!(page.status().is_success());
    assert!(page.text().await.unwrap().contains("Evening walk"));

    let goals: Vec<Goal> = client
        .get(format!("{}/api/goals", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let walk = goals.iter().find(|g| g.title == "Evening walk").unwrap();

    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    let toggled = client
        .post(format!(
            "{}/days/{today}/goals/{}/toggle",
            server.base_url, walk.id
        ))
        .form(&[("checked", "on")])
        .send()
        .await
        .unwrap();
    assert!(toggled.status().is_success());

    let view = day(&client, &server.base_url, &today).await;
    assert!(view.card(&walk.id).done);

    let confirm = client
        .get(format!("{}/goals/{}/delete", server.base_url, walk.id))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(confirm.contains("Data will be preserved but goal removed."));

    client
        .post(format!("{}/goals/{}/delete", server.base_url, walk.id))
        .form(&[("confirm", "no")])
        .send()
        .await
        .unwrap();
    let view = day(&client, &server.base_url, &today).await;
    assert!(view.cards.iter().any(|card| card.goal.id == walk.id));
}
