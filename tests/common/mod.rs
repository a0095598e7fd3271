#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

// ──────────────────── CLI runner ────────────────────

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_ayur") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) { "ayur.exe" } else { "ayur" };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve ayur binary path for integration test"),
    }
}

pub fn run_cli_case(case_name: &str, args: &[&str]) -> CmdResult {
    run_cli_case_with_env(case_name, args, &[])
}

/// Run the binary with request logging off and a scratch HOME, plus `envs`.
pub fn run_cli_case_with_env(case_name: &str, args: &[&str], envs: &[(&str, &str)]) -> CmdResult {
    run_cli(case_name, args, envs, None)
}

/// Like [`run_cli_case`], feeding `stdin` to the process and closing it.
pub fn run_cli_case_with_stdin(case_name: &str, args: &[&str], stdin: &str) -> CmdResult {
    run_cli(case_name, args, &[], Some(stdin))
}

fn run_cli(
    case_name: &str,
    args: &[&str],
    envs: &[(&str, &str)],
    stdin: Option<&str>,
) -> CmdResult {
    let root = std::env::temp_dir().join("ayur-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let home = root.join(format!("home-{}-{}", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command
        .args(args)
        .env("HOME", &home)
        .env("AYUR_LOGGING_ENABLED", "false")
        .env_remove("AYUR_API_BASE_URL")
        .env_remove("AYUR_OUTPUT_FORMAT")
        .env("RUST_BACKTRACE", "1");
    for (key, value) in envs {
        command.env(key, value);
    }
    let output = match stdin {
        None => command.output().expect("execute ayur command"),
        Some(input) => {
            let mut child = command
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .expect("spawn ayur command");
            if let Some(mut pipe) = child.stdin.take() {
                pipe.write_all(input.as_bytes()).expect("write ayur stdin");
            }
            child.wait_with_output().expect("wait for ayur command")
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    if let Some(input) = stdin {
        log_content.push_str(&format!("stdin={input:?}\n"));
    }
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

// ──────────────────── stub analysis service ────────────────────

/// Canned reply for one route.
#[derive(Debug, Clone)]
pub struct StubReply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

/// One request as the stub saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Default)]
pub struct StubServerBuilder {
    routes: HashMap<(String, String), StubReply>,
}

impl StubServerBuilder {
    pub fn route(mut self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            (method.to_string(), path.to_string()),
            StubReply {
                status,
                body: body.to_string(),
                delay: Duration::ZERO,
            },
        );
        self
    }

    /// Hold the reply for `delay` before writing it.
    pub fn delayed(mut self, method: &str, path: &str, delay: Duration) -> Self {
        if let Some(reply) = self
            .routes
            .get_mut(&(method.to_string(), path.to_string()))
        {
            reply.delay = delay;
        }
        self
    }

    pub fn start(self) -> StubServer {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("stub server addr");
        let routes = Arc::new(self.routes);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let accept_requests = Arc::clone(&requests);
        let accept_shutdown = Arc::clone(&shutdown);
        thread::spawn(move || {
            for stream in listener.incoming() {
                if accept_shutdown.load(Ordering::SeqCst) {
                    break;
                }
                let Ok(stream) = stream else { continue };
                let routes = Arc::clone(&routes);
                let requests = Arc::clone(&accept_requests);
                thread::spawn(move || handle_connection(stream, &routes, &requests));
            }
        });

        StubServer {
            addr,
            requests,
            shutdown,
        }
    }
}

/// Minimal HTTP/1.1 server standing in for the analysis service.
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Arc<AtomicBool>,
}

impl StubServer {
    pub fn builder() -> StubServerBuilder {
        StubServerBuilder::default()
    }

    /// Healthy service with a small vocabulary and the cold analysis.
    pub fn healthy() -> Self {
        Self::builder()
            .route("GET", "/api/health", 200, HEALTHY_BODY)
            .route("GET", "/api/symptoms-suggestions", 200, VOCABULARY_BODY)
            .route("POST", "/api/analyze-symptoms", 200, COLD_ANALYSIS_BODY)
            .start()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Wake the accept loop so it observes the flag.
        let _ = TcpStream::connect(self.addr);
    }
}

pub const HEALTHY_BODY: &str = r#"{"status":"healthy"}"#;

pub const VOCABULARY_BODY: &str =
    r#"{"suggestions":["headache","head cold","stomach pain","fever","chills","nausea"]}"#;

pub const COLD_ANALYSIS_BODY: &str = r#"{
    "recommendations": [{
        "disease": "Common Cold",
        "dosha": "Kapha",
        "confidence": 0.82,
        "matched_symptoms": "fever, chills, runny nose",
        "remedies": "Ginger tea with honey; Rest; Warm fluids"
    }],
    "extracted_symptoms": ["fever", "chills"]
}"#;

fn handle_connection(
    stream: TcpStream,
    routes: &HashMap<(String, String), StubReply>,
    requests: &Mutex<Vec<RecordedRequest>>,
) {
    let Ok(write_half) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).unwrap_or(0) == 0 {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    let mut content_type = None;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).unwrap_or(0) == 0 {
            break;
        }
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse().unwrap_or(0);
            } else if name.eq_ignore_ascii_case("content-type") {
                content_type = Some(value.to_string());
            }
        }
    }

    let mut body = vec![0u8; content_length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }

    requests.lock().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        content_type,
        body: String::from_utf8_lossy(&body).to_string(),
    });

    let reply = routes.get(&(method, path)).cloned().unwrap_or(StubReply {
        status: 404,
        body: r#"{"error":"not found"}"#.to_string(),
        delay: Duration::ZERO,
    });
    if !reply.delay.is_zero() {
        thread::sleep(reply.delay);
    }

    let mut out = write_half;
    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    );
    let _ = out.write_all(response.as_bytes());
    let _ = out.flush();
}
