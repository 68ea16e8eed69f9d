use std::path::Path;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::process::Command;

use flagkeeper::checker::{Action, Target, run_checker};
use flagkeeper::config::{RunnerConfig, ServiceConfig};
use flagkeeper::protocol::FaultCommand;
use flagkeeper::service::send_fault_command;
use flagkeeper::status::Verdict;
use flagkeeper::{Server, Status};

const CHECKER: &str = env!("CARGO_BIN_EXE_checker");

async fn start_service() -> Target {
    let server = Server::bind(ServiceConfig {
        bind_address: "127.0.0.1".into(),
        port: 0,
        get_delay_ms: 0,
        ..ServiceConfig::default()
    })
    .await
    .unwrap();
    let port = server.local_addr().unwrap().port();
    tokio::spawn(server.run());
    Target::new("127.0.0.1", port)
}

async fn exit_code(args: &[&str]) -> Option<i32> {
    Command::new(CHECKER)
        .args(args)
        .output()
        .await
        .unwrap()
        .status
        .code()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_put_get_chk_exit_codes() {
    let target = start_service().await;
    let checker = Path::new(CHECKER);

    let put = Action::Put {
        flag: "FLAG{abc}".into(),
    };
    let output = run_checker(checker, &target, &put, &RunnerConfig::default()).await.unwrap();
    assert_eq!(output.verdict, Verdict::Service(Status::Ok), "logs: {}", output.logs);
    assert!(output.stdout.contains(':'));

    let get = Action::Get {
        state: output.stdout.clone(),
    };
    let output = run_checker(checker, &target, &get, &RunnerConfig::default()).await.unwrap();
    assert_eq!(output.status(), Some(Status::Ok), "logs: {}", output.logs);
    assert_eq!(output.stdout, "FLAG{abc}");

    let output = run_checker(checker, &target, &Action::Chk, &RunnerConfig::default())
        .await
        .unwrap();
    assert_eq!(output.status(), Some(Status::Ok), "logs: {}", output.logs);
    assert_eq!(output.stdout, "");

    send_fault_command(target.socket_addr(), FaultCommand::Clear)
        .await
        .unwrap();
    let output = run_checker(checker, &target, &get, &RunnerConfig::default()).await.unwrap();
    assert_eq!(output.status(), Some(Status::Corrupt), "logs: {}", output.logs);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_refused_exits_down() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let target = Target::new("127.0.0.1", port);
    let output = run_checker(Path::new(CHECKER), &target, &Action::Chk, &RunnerConfig::default())
        .await
        .unwrap();
    assert_eq!(output.status(), Some(Status::Down));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_misuse_exits_one() {
    assert_eq!(exit_code(&["put", "127.0.0.1", "4242"]).await, Some(1));
    assert_eq!(exit_code(&["frobnicate", "127.0.0.1", "4242"]).await, Some(1));
    assert_eq!(exit_code(&["chk", "127.0.0.1", "not-a-port"]).await, Some(1));
    assert_eq!(exit_code(&[]).await, Some(1));
    assert_eq!(exit_code(&["get", "127.0.0.1", "4242", "no-separator"]).await, Some(1));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_runner_kills_hung_checker() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let stall = tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let target = Target::new("127.0.0.1", port);
    let output = run_checker(
        Path::new(CHECKER),
        &target,
        &Action::Chk,
        &RunnerConfig { timeout_secs: 1 },
    )
    .await
    .unwrap();
    assert_eq!(output.verdict, Verdict::Service(Status::Down));

    stall.abort();
}
