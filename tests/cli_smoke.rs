use std::process::Command;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_skocko-anim"))
}

#[test]
fn list_prints_the_scene_catalog() {
    let out = bin().arg("list").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 7);
    assert!(lines.iter().any(|l| l.starts_with("register-packing ")));
    assert!(lines.iter().any(|l| l.starts_with("benchmark-chart ")));
    for line in &lines {
        assert!(
            line.split_whitespace().count() > 1,
            "each entry should carry a summary: {line:?}"
        );
    }
}

#[test]
fn unknown_scene_fails_with_message() {
    let out = bin()
        .args(["frame", "no-such-scene", "--frame", "0", "--out", "target/x.png"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("unknown scene"), "{stderr}");
}

#[test]
fn unknown_quality_fails_with_message() {
    let out = bin()
        .args([
            "frame",
            "exact-match",
            "--frame",
            "0",
            "--out",
            "target/x.png",
            "--quality",
            "ultra",
        ])
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("quality"), "{stderr}");
}

#[test]
fn render_without_scene_or_all_is_an_error() {
    let out = bin().arg("render").output().unwrap();
    assert!(!out.status.success());
}
