use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const PLACEHOLDER_PERCENT: u8 = 75;

#[derive(Debug, Deserialize)]
struct Medication {
    id: u32,
    name: String,
    dosage: String,
    time: String,
    taken: bool,
}

#[derive(Debug, Deserialize)]
struct Notification {
    title: String,
    detail: String,
}

#[derive(Debug, Deserialize)]
struct TodayResponse {
    date: String,
    taken_count: usize,
    total_count: usize,
    completion_rate: u8,
    medications: Vec<Medication>,
}

#[derive(Debug, Deserialize)]
struct ToggleResponse {
    toggled: bool,
    notification: Option<Notification>,
    today: TodayResponse,
}

#[derive(Debug, Deserialize)]
struct AddMedicationResponse {
    medication: Option<Medication>,
    notification: Notification,
}

#[derive(Debug, Deserialize)]
struct CalendarDay {
    is_today: bool,
    completion: u8,
    placeholder: bool,
}

#[derive(Debug, Deserialize)]
struct CalendarResponse {
    days: Vec<CalendarDay>,
}

#[derive(Debug, Deserialize)]
struct Totals {
    taken: usize,
    missed: usize,
    skipped: usize,
}

#[derive(Debug, Deserialize)]
struct HistoryEntry {
    date: String,
}

#[derive(Debug, Deserialize)]
struct HistoryGroup {
    label: String,
    entries: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    groups: Vec<HistoryGroup>,
    totals: Totals,
}

struct TestServer {
    base_url: String,
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

async fn spawn_server(extra_env: &[(&str, &str)]) -> TestServer {
    let port = pick_free_port();
    let mut command = Command::new(env!("CARGO_BIN_EXE_dose_tracker"));
    command
        .env("PORT", port.to_string())
        .env("DOSE_PLACEHOLDER_PERCENT", PLACEHOLDER_PERCENT.to_string())
        .env("RUST_LOG", "info")
        .env_remove("DOSE_SEED_PATH")
        .env_remove("DOSE_TRACKING")
        .env_remove("DOSE_ADD_POLICY")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    for (key, value) in extra_env {
        command.env(key, value);
    }
    let child = command.spawn().expect("failed to spawn server");

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = spawn_server(&[]).await;

    #[cfg(unix)]
    cleanup::register(server.child.id());

    let server = Arc::new(server);
    *guard = Some(Arc::clone(&server));
    server
}

async fn get_today(client: &Client, base_url: &str) -> TodayResponse {
    client
        .get(format!("{base_url}/api/today"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn get_history(client: &Client, base_url: &str) -> HistoryResponse {
    client
        .get(format!("{base_url}/api/history"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn post_toggle(client: &Client, base_url: &str, id: u32) -> ToggleResponse {
    let response = client
        .post(format!("{base_url}/api/medications/{id}/toggle"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

async fn post_form_toggle(client: &Client, base_url: &str, id: u32) -> reqwest::Response {
    client
        .post(format!("{base_url}/medications/{id}/toggle"))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_toggle_round_trip_notifies_once() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = get_today(&client, &server.base_url).await;
    let target = before
        .medications
        .iter()
        .find(|med| !med.taken)
        .expect("an untaken medication");
    let id = target.id;

    let first = post_toggle(&client, &server.base_url, id).await;
    assert!(first.toggled);
    let note = first.notification.expect("notification when marking taken");
    assert_eq!(note.title, format!("{} marked as taken", target.name));
    assert_eq!(note.detail, format!("{} at {}", target.dosage, target.time));
    assert_eq!(first.today.taken_count, before.taken_count + 1);

    let second = post_toggle(&client, &server.base_url, id).await;
    assert!(second.toggled);
    assert!(second.notification.is_none());
    assert_eq!(second.today.taken_count, before.taken_count);
    assert_eq!(second.today.completion_rate, before.completion_rate);
}

#[tokio::test]
async fn http_toggle_unknown_id_changes_nothing() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = get_today(&client, &server.base_url).await;
    let result = post_toggle(&client, &server.base_url, 9_999).await;

    assert!(!result.toggled);
    assert!(result.notification.is_none());
    assert_eq!(result.today.total_count, before.total_count);
    assert_eq!(result.today.taken_count, before.taken_count);
    let flags: Vec<_> = result.today.medications.iter().map(|m| (m.id, m.taken)).collect();
    let expected: Vec<_> = before.medications.iter().map(|m| (m.id, m.taken)).collect();
    assert_eq!(flags, expected);
}

#[tokio::test]
async fn http_today_rate_is_consistent() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let today = get_today(&client, &server.base_url).await;
    assert!(!today.date.is_empty());
    assert_eq!(today.total_count, today.medications.len());
    assert_eq!(
        today.taken_count,
        today.medications.iter().filter(|m| m.taken).count()
    );
    assert!(today.completion_rate <= 100);
}

#[tokio::test]
async fn http_calendar_uses_real_rate_for_today() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let today = get_today(&client, &server.base_url).await;
    let calendar: CalendarResponse = client
        .get(format!("{}/api/calendar", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(calendar.days.len(), 7);
    assert!(calendar.days[3].is_today);
    assert!(!calendar.days[3].placeholder);
    assert_eq!(calendar.days[3].completion, today.completion_rate);
    for (index, day) in calendar.days.iter().enumerate() {
        if index != 3 {
            assert!(day.placeholder);
            assert_eq!(day.completion, PLACEHOLDER_PERCENT);
        }
    }
}

#[tokio::test]
async fn http_history_groups_partition_log() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let history = get_history(&client, &server.base_url).await;

    assert!(!history.groups.is_empty());
    let entries: usize = history.groups.iter().map(|g| g.entries.len()).sum();
    assert_eq!(
        history.totals.taken + history.totals.missed + history.totals.skipped,
        entries
    );
    for group in &history.groups {
        assert!(!group.label.is_empty());
        assert!(group.entries.iter().all(|e| e.date == group.entries[0].date));
    }
    // ISO dates compare lexicographically.
    let firsts: Vec<_> = history.groups.iter().map(|g| g.entries[0].date.as_str()).collect();
    assert!(firsts.windows(2).all(|pair| pair[0] > pair[1]));
}

#[tokio::test]
async fn http_add_medication_appends() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = get_today(&client, &server.base_url).await;
    let response = client
        .post(format!("{}/api/medications", server.base_url))
        .json(&serde_json::json!({
            "name": "Zinc",
            "dosage": "25 mg",
            "time": "20:30",
            "frequency": "weekly",
            "notes": "With dinner"
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let added: AddMedicationResponse = response.json().await.unwrap();

    let medication = added.medication.expect("medication appended");
    assert_eq!(medication.name, "Zinc");
    assert!(!medication.taken);
    assert_eq!(added.notification.title, "Medication added!");

    let after = get_today(&client, &server.base_url).await;
    assert_eq!(after.total_count, before.total_count + 1);
    assert!(after.medications.iter().any(|m| m.id == medication.id));
}

#[tokio::test]
async fn http_add_medication_rejects_bad_input() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let blank = client
        .post(format!("{}/api/medications", server.base_url))
        .json(&serde_json::json!({ "name": "  ", "time": "08:00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let bad_time = client
        .post(format!("{}/api/medications", server.base_url))
        .json(&serde_json::json!({ "name": "Iron", "time": "late" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_time.status(), StatusCode::BAD_REQUEST);

    let bad_frequency = client
        .post(format!("{}/api/medications", server.base_url))
        .json(&serde_json::json!({ "name": "Iron", "time": "08:00", "frequency": "hourly" }))
        .send()
        .await
        .unwrap();
    assert!(bad_frequency.status().is_client_error());
}

#[tokio::test]
async fn http_add_medication_pads_short_time() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/medications", server.base_url))
        .json(&serde_json::json!({ "name": "Iron", "dosage": "65 mg", "time": "9:5" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let added: AddMedicationResponse = response.json().await.unwrap();

    let medication = added.medication.expect("medication appended");
    assert_eq!(medication.time, "09:05");
    assert_eq!(added.notification.detail, "Iron 65 mg at 09:05");

    let today = get_today(&client, &server.base_url).await;
    let stored = today
        .medications
        .iter()
        .find(|m| m.id == medication.id)
        .expect("stored medication");
    assert_eq!(stored.time, "09:05");
}

#[tokio::test]
async fn http_index_prerenders_progress() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let today = get_today(&client, &server.base_url).await;
    let html = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains(&format!(r#"<span id="date">{}</span>"#, today.date)));
    assert!(html.contains(&format!(r#"<span id="total">{}</span>"#, today.total_count)));
    for med in &today.medications {
        assert!(html.contains(&format!(
            r#"<form method="post" action="/medications/{}/toggle">"#,
            med.id
        )));
    }
}

#[tokio::test]
async fn http_form_toggle_redirects_home() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let before = get_today(&client, &server.base_url).await;
    let target = before.medications.first().expect("a medication");
    let id = target.id;
    let was_taken = target.taken;

    let response = post_form_toggle(&client, &server.base_url, id).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/");

    let after = get_today(&client, &server.base_url).await;
    let flipped = after.medications.iter().find(|m| m.id == id).unwrap();
    assert_eq!(flipped.taken, !was_taken);

    let response = post_form_toggle(&client, &server.base_url, id).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let restored = get_today(&client, &server.base_url).await;
    assert_eq!(restored.taken_count, before.taken_count);
}

#[tokio::test]
async fn http_discard_policy_keeps_catalog() {
    let server = spawn_server(&[("DOSE_ADD_POLICY", "discard")]).await;
    let client = Client::new();

    let before = get_today(&client, &server.base_url).await;
    let added: AddMedicationResponse = client
        .post(format!("{}/api/medications", server.base_url))
        .json(&serde_json::json!({ "name": "Zinc", "dosage": "25 mg", "time": "20:30" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(added.medication.is_none());
    assert_eq!(added.notification.title, "Medication added!");
    assert!(added.notification.detail.is_empty());
    let after = get_today(&client, &server.base_url).await;
    assert_eq!(after.total_count, before.total_count);
}

#[tokio::test]
async fn http_dated_tracking_records_history() {
    let server = spawn_server(&[("DOSE_TRACKING", "dated")]).await;
    let client = Client::new();

    let history_len = |history: &HistoryResponse| -> usize {
        history.groups.iter().map(|g| g.entries.len()).sum()
    };
    let before = get_history(&client, &server.base_url).await;
    let today = get_today(&client, &server.base_url).await;
    let id = today
        .medications
        .iter()
        .find(|m| !m.taken)
        .expect("an untaken medication")
        .id;

    let toggled = post_toggle(&client, &server.base_url, id).await;
    assert!(toggled.notification.is_some());

    let after = get_history(&client, &server.base_url).await;
    assert_eq!(history_len(&after), history_len(&before) + 1);
    assert_eq!(after.totals.taken, before.totals.taken + 1);
    assert_eq!(after.groups[0].entries[0].date, today.date);
}
