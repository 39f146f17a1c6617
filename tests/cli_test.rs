use std::fs;
use std::process::Command;

#[test]
fn test_print_table_leaves_log_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("tocnum.log");
    fs::write(&log, "previous run\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_tocnum"))
        .current_dir(dir.path())
        .arg("--print-table")
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 17);
    assert_eq!(stdout.lines().nth(5), Some("  6  4½"));
    assert_eq!(fs::read_to_string(&log).unwrap(), "previous run\n");
}

#[test]
fn test_missing_path_fails_after_processing_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("topic.html");
    fs::write(
        &page,
        r#"<html><body><h1><span class="section-number">5. </span>Arrays</h1></body></html>"#,
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_tocnum"))
        .current_dir(dir.path())
        .args(["missing.html", "topic.html"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1), "{output:?}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.html"), "{stderr}");
    assert!(fs::read_to_string(&page).unwrap().contains("4. </span>Arrays"));
}
