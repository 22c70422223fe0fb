//! Integration tests for the compiler, using `sh` as a stand-in engine
#![cfg(unix)]

use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use typeset::{
    Compiled, Compiler, CompilerConfig, SkipReason, TypesetError, SOURCE_FILE, STAGING_PREFIX,
    STDERR_LOG,
};

/// A compiler running `sh -c <script> document.tex`, so `$0` is the source name
fn fake_engine(root: &Path, script: &str) -> Compiler {
    Compiler::new(
        CompilerConfig::default()
            .with_program("sh", &["-c", script])
            .with_staging_root(root),
    )
}

fn staging_dirs(root: &Path) -> Vec<PathBuf> {
    fs::read_dir(root)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with(STAGING_PREFIX)
        })
        .collect()
}

#[test]
fn test_success_returns_output_and_removes_staging() {
    let root = tempfile::tempdir().unwrap();
    let compiler = fake_engine(root.path(), r#"cp "$0" document.pdf"#);

    let outcome = compiler
        .compile::<&Path>("\\starttext Grüße \\stoptext", &[])
        .unwrap();

    assert_eq!(
        outcome,
        Compiled::Produced("\\starttext Grüße \\stoptext".as_bytes().to_vec())
    );
    assert!(staging_dirs(root.path()).is_empty());
}

#[test]
fn test_auxiliaries_are_visible_by_base_name() {
    let root = tempfile::tempdir().unwrap();
    let assets = tempfile::tempdir().unwrap();
    let logo = assets.path().join("logo.png");
    fs::write(&logo, "PNGDATA").unwrap();

    let compiler = fake_engine(root.path(), "cat logo.png > document.pdf");
    let pdf = compiler.compile_required("x", &[&logo]).unwrap();

    assert_eq!(pdf, b"PNGDATA");
}

#[test]
fn test_empty_source_is_skipped() {
    let root = tempfile::tempdir().unwrap();
    let compiler = fake_engine(root.path(), "touch ran; exit 1");

    let outcome = compiler.compile::<&Path>("", &[]).unwrap();

    assert_eq!(outcome, Compiled::Skipped(SkipReason::EmptySource));
    assert!(staging_dirs(root.path()).is_empty());
}

#[test]
fn test_duplicate_base_names_collide_before_invocation() {
    let root = tempfile::tempdir().unwrap();
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    fs::write(a.path().join("x.png"), "a").unwrap();
    fs::write(b.path().join("x.png"), "b").unwrap();

    let compiler = Compiler::new(
        CompilerConfig::default()
            .with_program("/nonexistent/texpdf/context", &[])
            .with_staging_root(root.path()),
    );
    let result = compiler.compile("x", &[a.path().join("x.png"), b.path().join("x.png")]);

    assert!(matches!(result, Err(TypesetError::AuxiliaryCollision { name, .. }) if name == "x.png"));
    assert!(staging_dirs(root.path()).is_empty());
}

#[test]
fn test_missing_auxiliary() {
    let root = tempfile::tempdir().unwrap();
    let compiler = fake_engine(root.path(), r#"cp "$0" document.pdf"#);

    let result = compiler.compile("x", &["/nonexistent/texpdf/logo.pdf"]);

    assert!(matches!(result, Err(TypesetError::AuxiliaryMissing(_))));
    assert!(staging_dirs(root.path()).is_empty());
}

#[test]
fn test_non_zero_exit_keeps_staging() {
    let root = tempfile::tempdir().unwrap();
    let compiler = fake_engine(root.path(), "echo 'undefined control sequence' >&2; exit 3");

    let err = compiler.compile::<&Path>("\\broken", &[]).unwrap_err();

    let staging = match &err {
        TypesetError::Failed { code, staging } => {
            assert_eq!(*code, Some(3));
            staging.clone()
        }
        other => panic!("expected Failed, got {:?}", other),
    };
    assert_eq!(err.staging_dir(), Some(&staging));
    assert_eq!(fs::read_to_string(staging.join(SOURCE_FILE)).unwrap(), "\\broken");
    assert_eq!(
        fs::read_to_string(staging.join(STDERR_LOG)).unwrap(),
        "undefined control sequence\n"
    );
}

#[test]
fn test_missing_output_keeps_staging() {
    let root = tempfile::tempdir().unwrap();
    let compiler = fake_engine(root.path(), "exit 0");

    let err = compiler.compile::<&Path>("x", &[]).unwrap_err();

    assert!(matches!(err, TypesetError::MissingOutput { .. }));
    assert!(err.staging_dir().unwrap().join(SOURCE_FILE).is_file());
}

#[test]
fn test_timeout_kills_engine_and_keeps_staging() {
    let root = tempfile::tempdir().unwrap();
    let compiler = Compiler::new(
        CompilerConfig::default()
            .with_program("sh", &["-c", "sleep 10"])
            .with_staging_root(root.path())
            .with_timeout(Some(Duration::from_millis(200))),
    );

    let started = Instant::now();
    let err = compiler.compile::<&Path>("x", &[]).unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(5));
    match &err {
        TypesetError::TimedOut { timeout, staging } => {
            assert_eq!(*timeout, Duration::from_millis(200));
            assert!(staging.is_dir());
        }
        other => panic!("expected TimedOut, got {:?}", other),
    }
}

#[test]
fn test_timeout_also_kills_processes_started_by_engine() {
    let root = tempfile::tempdir().unwrap();
    let compiler = Compiler::new(
        CompilerConfig::default()
            .with_program("sh", &["-c", "sh -c 'sleep 1; touch still-running'; true"])
            .with_staging_root(root.path())
            .with_timeout(Some(Duration::from_millis(200))),
    );

    let err = compiler.compile::<&Path>("x", &[]).unwrap_err();
    assert!(matches!(err, TypesetError::TimedOut { .. }));
    let staging = err.staging_dir().unwrap().clone();

    std::thread::sleep(Duration::from_secs(2));
    assert!(!staging.join("still-running").exists());
}

#[test]
fn test_concurrent_compiles_use_separate_directories() {
    let root = tempfile::tempdir().unwrap();
    let compiler = fake_engine(root.path(), r#"cp "$0" document.pdf"#);

    let outputs: Vec<Vec<u8>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let compiler = &compiler;
                scope.spawn(move || {
                    compiler
                        .compile_required::<&Path>(&format!("document {}", i), &[])
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (i, output) in outputs.iter().enumerate() {
        assert_eq!(output, format!("document {}", i).as_bytes());
    }
    assert!(staging_dirs(root.path()).is_empty());
}
