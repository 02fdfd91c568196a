//! Runs the compiled `beacon` binary the way a container runtime does:
//! configuration through the real environment, exit codes as the contract.

mod common;

use std::net::TcpListener;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use reqwest::header::CACHE_CONTROL;

use common::closed_port;

const BEACON: &str = env!("CARGO_BIN_EXE_beacon");
const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// A `beacon` command with a clean environment, run from `dir` so no stray
/// `.env` file is picked up.
fn beacon(dir: &Path, port: &str) -> Command {
    let mut cmd = Command::new(BEACON);
    cmd.current_dir(dir)
        .env("PORT", port)
        .env("HOST", "127.0.0.1")
        .env_remove("RUST_LOG")
        .env_remove("LOG_LEVEL")
        .env_remove("LOG_FORMAT")
        .env_remove("SERVICE_NAME")
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd
}

/// Kills the child on drop if it is still running.
struct ServiceProcess {
    child: Child,
}

impl ServiceProcess {
    fn spawn(cmd: &mut Command) -> Self {
        let child = cmd.spawn().expect("Failed to start beacon");
        Self { child }
    }

    fn wait_timeout(&mut self, timeout: Duration) -> Option<ExitStatus> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(status) = self.child.try_wait().unwrap() {
                return Some(status);
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        None
    }

    async fn wait_for_health(&mut self, port: u16) -> reqwest::Response {
        let url = format!("http://127.0.0.1:{port}/health");
        let deadline = Instant::now() + STARTUP_TIMEOUT;
        loop {
            if let Some(status) = self.child.try_wait().unwrap() {
                panic!("beacon exited before answering /health: {status}");
            }
            if let Ok(response) = reqwest::get(&url).await {
                if response.status().is_success() {
                    return response;
                }
            }
            assert!(
                Instant::now() < deadline,
                "beacon did not answer /health within {STARTUP_TIMEOUT:?}"
            );
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

impl Drop for ServiceProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn run_health_command(dir: &Path, port: u16) -> ExitStatus {
    beacon(dir, &port.to_string())
        .args(["probe", "--timeout", "2"])
        .status()
        .expect("Failed to run beacon probe")
}

#[test]
fn malformed_port_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = ServiceProcess::spawn(&mut beacon(dir.path(), "abc"));

    let status = service
        .wait_timeout(STARTUP_TIMEOUT)
        .expect("beacon kept running with PORT=abc");
    assert_eq!(status.code(), Some(1));
}

#[test]
fn occupied_port_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    let holder = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = holder.local_addr().unwrap().port();

    let mut service = ServiceProcess::spawn(&mut beacon(dir.path(), &port.to_string()));

    let status = service
        .wait_timeout(STARTUP_TIMEOUT)
        .expect("beacon kept running on an occupied port");
    assert_eq!(status.code(), Some(1));

    // The port holder never speaks HTTP, so no health answer exists there.
    assert!(!run_health_command(dir.path(), port).success());
    drop(holder);
}

#[tokio::test]
async fn configured_port_answers_health_and_health_command_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let port = closed_port();
    let mut service = ServiceProcess::spawn(&mut beacon(dir.path(), &port.to_string()));

    let response = service.wait_for_health(port).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.headers().get(CACHE_CONTROL).unwrap(), "no-store");

    assert!(run_health_command(dir.path(), port).success());
}

#[tokio::test]
async fn other_ports_are_refused_while_serving() {
    let dir = tempfile::tempdir().unwrap();
    let port = closed_port();
    let mut service = ServiceProcess::spawn(&mut beacon(dir.path(), &port.to_string()));
    service.wait_for_health(port).await;

    let other = closed_port();
    let result = reqwest::get(format!("http://127.0.0.1:{other}/health")).await;
    assert!(result.unwrap_err().is_connect());
    assert!(!run_health_command(dir.path(), other).success());
}

#[cfg(unix)]
#[tokio::test]
async fn sigterm_exits_0_and_health_command_then_fails() {
    let dir = tempfile::tempdir().unwrap();
    let port = closed_port();
    let mut service = ServiceProcess::spawn(&mut beacon(dir.path(), &port.to_string()));
    service.wait_for_health(port).await;

    let sent = Command::new("kill")
        .args(["-TERM", &service.child.id().to_string()])
        .status()
        .expect("Failed to run kill");
    assert!(sent.success());

    let status = service
        .wait_timeout(STARTUP_TIMEOUT)
        .expect("beacon did not stop after SIGTERM");
    assert_eq!(status.code(), Some(0));

    assert!(!run_health_command(dir.path(), port).success());
}
