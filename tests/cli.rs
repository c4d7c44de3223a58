//! Runs the built binary and checks how it exits on startup failures and on Ctrl+C.

use std::io::{BufRead, BufReader};
use std::net::TcpListener;
use std::process::{Command, Output, Stdio};

fn reserved(args: &[&str]) -> Output {
    let dir = tempfile::tempdir().unwrap();
    Command::new(env!("CARGO_BIN_EXE_reserved"))
        .args(args)
        .arg("--directory")
        .arg(dir.path())
        .output()
        .expect("failed to run binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn all_output(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn non_numeric_port_exits_with_1() {
    let output = reserved(&["abc"]);
    assert_eq!(output.status.code(), Some(1), "{}", all_output(&output));
    let text = stdout(&output);
    assert!(text.contains("Invalid port number"), "{}", all_output(&output));
    assert!(!text.contains("Server running"), "{}", text);
}

#[test]
fn out_of_range_port_exits_with_1() {
    let output = reserved(&["70000"]);
    assert_eq!(output.status.code(), Some(1), "{}", all_output(&output));
}

#[test]
fn port_in_use_exits_with_1_and_suggests_next_port() {
    let taken = TcpListener::bind(("0.0.0.0", 0)).unwrap();
    let port = taken.local_addr().unwrap().port();

    let output = reserved(&[&port.to_string()]);
    let text = stdout(&output);
    assert_eq!(output.status.code(), Some(1), "{}", text);
    assert!(
        text.contains(&format!("Port {} is already in use", port)),
        "{}",
        text
    );
    if let Some(next) = port.checked_add(1) {
        assert!(text.contains(&format!("reserved {}", next)), "{}", text);
    }
}

#[test]
fn missing_directory_exits_with_1() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_reserved"))
        .arg("0")
        .arg("--directory")
        .arg(dir.path().join("missing"))
        .output()
        .expect("failed to run binary");
    assert_eq!(output.status.code(), Some(1), "{}", all_output(&output));
}

#[test]
fn help_exits_with_0() {
    let output = Command::new(env!("CARGO_BIN_EXE_reserved"))
        .arg("--help")
        .output()
        .expect("failed to run binary");
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("[PORT]"));
}

#[cfg(unix)]
#[test]
fn interrupt_exits_with_0_and_releases_port() {
    let port = TcpListener::bind(("127.0.0.1", 0))
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_reserved"))
        .arg(port.to_string())
        .args(["--bind", "127.0.0.1", "--directory"])
        .arg(dir.path())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to run binary");

    let mut lines = BufReader::new(child.stdout.take().unwrap()).lines();
    let mut seen = Vec::new();
    loop {
        match lines.next() {
            Some(line) => {
                let line = line.unwrap();
                let started = line.contains("Server running");
                seen.push(line);
                if started {
                    break;
                }
            }
            None => {
                let _ = child.kill();
                panic!("exited before serving: {:?}", seen);
            }
        }
    }

    let killed = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(killed.success());

    let rest = lines.map(Result::unwrap).collect::<Vec<_>>();
    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(0), "{:?}", rest);
    assert!(rest.iter().any(|l| l.contains("Server stopped")), "{:?}", rest);

    TcpListener::bind(("127.0.0.1", port)).unwrap();
}
