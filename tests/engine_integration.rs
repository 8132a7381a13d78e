/// End-to-end engine tests against the host toolchains.
///
/// Tests that need a compiler or interpreter skip themselves when the binary
/// is not on PATH.
use codebox::utils::output::TRUNCATION_MARKER;
use codebox::{Engine, EngineConfig, ExecutionOutcome, ExecutionRequest, FailureKind, Language};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

fn available(binary: &str) -> bool {
    let flag = if binary.starts_with("java") { "-version" } else { "--version" };
    Command::new(binary)
        .arg(flag)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

macro_rules! require {
    ($($binary:expr),+) => {
        $(
            if !available($binary) {
                eprintln!("skipping: {} not available", $binary);
                return;
            }
        )+
    };
}

fn engine_with(tweak: impl FnOnce(&mut EngineConfig)) -> (tempfile::TempDir, Engine) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = EngineConfig {
        temp_root: dir.path().join("workspaces"),
        ..EngineConfig::default()
    };
    tweak(&mut config);
    (dir, Engine::new(config).unwrap())
}

fn engine() -> (tempfile::TempDir, Engine) {
    engine_with(|_| {})
}

fn execute(engine: &Engine, language: Language, code: &str, stdin: Option<&str>) -> ExecutionOutcome {
    let request = ExecutionRequest::new(language, code, stdin.map(str::to_string)).unwrap();
    engine.execute(&request)
}

fn assert_no_workspaces(engine: &Engine) {
    let left: Vec<_> = std::fs::read_dir(engine.workspaces().root())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert!(left.is_empty(), "workspaces left behind: {:?}", left);
}

#[test]
fn python_hello_returns_exact_output() {
    require!("python3");
    let (_dir, engine) = engine();

    let outcome = execute(&engine, Language::Python, "print(\"hello\")", None);
    assert_eq!(
        outcome,
        ExecutionOutcome::Success {
            output: "hello\n".to_string()
        }
    );
    assert_no_workspaces(&engine);
}

#[test]
fn python_reads_stdin() {
    require!("python3");
    let (_dir, engine) = engine();

    let outcome = execute(&engine, Language::Python, "print(input()[::-1])", Some("abc"));
    assert_eq!(outcome.into_output(), "cba\n");
}

#[test]
fn python_runtime_error_keeps_traceback() {
    require!("python3");
    let (_dir, engine) = engine();

    let outcome = execute(&engine, Language::Python, "print('before')\nraise ValueError('bad')", None);
    assert_eq!(outcome.failure_kind(), Some(FailureKind::Runtime));
    let text = outcome.into_output();
    assert!(text.contains("before"));
    assert!(text.contains("ValueError: bad"));
    assert_no_workspaces(&engine);
}

#[test]
fn stderr_is_returned_when_stdout_is_empty() {
    require!("python3");
    let (_dir, engine) = engine();

    let outcome = execute(
        &engine,
        Language::Python,
        "import sys\nsys.stderr.write('diagnostic')",
        None,
    );
    assert!(outcome.is_success());
    assert_eq!(outcome.into_output(), "diagnostic");
}

#[test]
fn javascript_hello() {
    require!("node");
    let (_dir, engine) = engine();

    let outcome = execute(
        &engine,
        Language::JavaScript,
        "const os = require('os');\nconsole.log('hi ' + typeof os.platform);",
        None,
    );
    assert_eq!(outcome.into_output(), "hi function\n");
}

#[test]
fn c_hello_and_math() {
    require!("gcc");
    let (_dir, engine) = engine();

    let code = "#include <stdio.h>\n#include <math.h>\n\
                int main(void) { printf(\"%.0f\\n\", sqrt(81.0)); return 0; }\n";
    let outcome = execute(&engine, Language::C, code, None);
    assert_eq!(outcome.into_output(), "9\n");
    assert_no_workspaces(&engine);
}

#[test]
fn cpp_reads_stdin() {
    require!("g++");
    let (_dir, engine) = engine();

    let code = "#include <iostream>\nint main() { int a, b; std::cin >> a >> b; \
                std::cout << a + b << std::endl; }\n";
    let outcome = execute(&engine, Language::Cpp, code, Some("2 40\n"));
    assert_eq!(outcome.into_output(), "42\n");
}

#[test]
fn c_syntax_error_is_compile_error_without_running() {
    require!("gcc");
    let (dir, engine) = engine();
    let marker = dir.path().join("ran");

    let code = format!(
        "#include <stdio.h>\nint main(void) {{\n  FILE *f = fopen(\"{}\", \"w\");\n  \
         int x = 1\n  return x;\n}}\n",
        marker.display()
    );
    let outcome = execute(&engine, Language::C, &code, None);

    assert_eq!(outcome.failure_kind(), Some(FailureKind::Compile));
    assert!(outcome.into_output().contains("error"));
    assert!(!marker.exists());
    assert_no_workspaces(&engine);
}

#[test]
fn forbidden_headers_are_rejected_before_compiling() {
    let (_dir, engine) = engine();

    let outcome = execute(
        &engine,
        Language::C,
        "#include <stdio.h>\n#include <unistd.h>\nint main(void){return 0;}",
        None,
    );
    assert_eq!(outcome.failure_kind(), Some(FailureKind::Dependency));
    let text = outcome.into_output();
    assert!(text.contains("<unistd.h>"));
    assert!(!text.contains("stdio.h"));

    let outcome = execute(
        &engine,
        Language::Cpp,
        "#include <boost/asio.hpp>\nint main(){}",
        None,
    );
    assert!(outcome.into_output().contains("<boost/asio.hpp>"));
    assert_no_workspaces(&engine);
}

#[test]
fn infinite_loop_is_killed_near_the_deadline() {
    require!("python3");
    let (_dir, engine) = engine_with(|c| c.run_timeout_ms = 1_000);

    let started = Instant::now();
    let outcome = execute(&engine, Language::Python, "while True:\n    pass\n", None);
    let elapsed = started.elapsed();

    assert_eq!(outcome.failure_kind(), Some(FailureKind::Runtime));
    assert!(outcome.into_output().contains("Time limit exceeded"));
    assert!(elapsed < Duration::from_secs(4), "took {:?}", elapsed);
    assert_no_workspaces(&engine);
}

#[test]
fn oversized_output_is_truncated_consistently() {
    require!("python3");
    let (_dir, engine) = engine();
    let code = "import sys\nfor _ in range(20000):\n    sys.stdout.write('0123456789')\n";

    let first = execute(&engine, Language::Python, code, None).into_output();
    let second = execute(&engine, Language::Python, code, None).into_output();

    assert!(first.ends_with(TRUNCATION_MARKER));
    assert!(second.ends_with(TRUNCATION_MARKER));
    assert_eq!(first.len(), 5000 + TRUNCATION_MARKER.len());
    assert_eq!(first, second);
}

#[test]
fn java_without_class_falls_back_to_main() {
    let (_dir, engine) = engine();
    let request =
        ExecutionRequest::new(Language::Java, "// nothing to see here\n", None).unwrap();

    let execution = engine.begin(&request).unwrap();
    assert_eq!(execution.source_file(), "Main.java");
    drop(execution);

    if available("javac") && available("java") {
        let outcome = engine.execute(&request);
        assert!(!outcome.is_success());
    }
    assert_no_workspaces(&engine);
}

#[test]
fn java_class_mentioned_in_comment_does_not_rename_source() {
    let (_dir, engine) = engine();
    let code = "// Entry class for the demo\nclass Main {\n  public static void main(String[] a) {\n    \
                System.out.println(\"hi\");\n  }\n}\n";
    let request = ExecutionRequest::new(Language::Java, code, None).unwrap();

    let execution = engine.begin(&request).unwrap();
    assert_eq!(execution.source_file(), "Main.java");
    drop(execution);

    if available("javac") && available("java") {
        assert_eq!(engine.execute(&request).into_output(), "hi\n");
    }
    assert_no_workspaces(&engine);
}

#[test]
fn java_hello_uses_declared_class() {
    require!("javac", "java");
    let (_dir, engine) = engine();

    let code = "public class Greeter {\n  public static void main(String[] args) {\n    \
                System.out.println(\"hello from java\");\n  }\n}\n";
    let outcome = execute(&engine, Language::Java, code, None);
    assert_eq!(outcome.into_output(), "hello from java\n");
}

#[test]
fn concurrent_requests_do_not_interfere() {
    require!("python3");
    let (_dir, engine) = engine();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let engine = &engine;
                scope.spawn(move || {
                    let code = format!("print({} * 10)", i);
                    (i, execute(engine, Language::Python, &code, None))
                })
            })
            .collect();

        for handle in handles {
            let (i, outcome) = handle.join().unwrap();
            assert_eq!(outcome.into_output(), format!("{}\n", i * 10));
        }
    });
    assert_no_workspaces(&engine);
}
