//! Tests for profile load, bootstrap and resolution (non-interactive paths only)
use std::fs;

use assert_cmd::Command;
use fpmtop::errors::ProfileError;
use fpmtop::profiles::{load_profiles, parse_profiles, select_profile, DEFAULT_CONFIG};

fn fpmtop() -> Command {
    Command::cargo_bin("fpmtop").expect("fpmtop binary")
}

fn output_text(out: &std::process::Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    )
}

#[test]
fn missing_file_is_bootstrapped_with_defaults() {
    let td = tempfile::tempdir().unwrap();
    let path = td.path().join("nested").join("fpmtop.toml");

    let err = load_profiles(&path).unwrap_err();
    assert!(matches!(err, ProfileError::Bootstrapped { .. }), "{err}");
    assert!(err.to_string().contains("Please verify, and restart fpmtop."));
    assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);

    // second run reads what was written
    let pf = load_profiles(&path).unwrap();
    let entry = select_profile(&pf, "default").unwrap();
    assert_eq!(entry.listen, "/var/run/php-fpm.sock");
    assert_eq!(entry.status, "/status");
}

#[test]
fn named_profiles_resolve() {
    let td = tempfile::tempdir().unwrap();
    let path = td.path().join("fpmtop.toml");
    fs::write(
        &path,
        "[default]\nlisten = \"/run/php/www.sock\"\nstatus = \"/status\"\n\n\
         [shop]\nlisten = \"127.0.0.1:9001\"\nstatus = \"/fpm-status\"\n",
    )
    .unwrap();

    let pf = load_profiles(&path).unwrap();
    assert_eq!(pf.len(), 2);
    let shop = select_profile(&pf, "shop").unwrap();
    assert_eq!(shop.listen, "127.0.0.1:9001");
    assert_eq!(shop.status, "/fpm-status");
}

#[test]
fn missing_profile_is_named_in_the_error() {
    let pf = parse_profiles(
        "inline.toml".as_ref(),
        "[default]\nlisten = \"/x.sock\"\nstatus = \"/status\"\n",
    )
    .unwrap();
    let err = select_profile(&pf, "staging").unwrap_err();
    assert!(matches!(&err, ProfileError::MissingProfile(n) if n == "staging"));
    assert_eq!(err.to_string(), "staging not found in config file. Please fix.");
}

#[test]
fn malformed_toml_is_reported_with_its_path() {
    let td = tempfile::tempdir().unwrap();
    let path = td.path().join("fpmtop.toml");
    fs::write(&path, "[default]\nlisten = \n").unwrap();
    let err = load_profiles(&path).unwrap_err();
    assert!(matches!(err, ProfileError::Toml { .. }));
    assert!(err.to_string().contains("fpmtop.toml"));
}

#[test]
fn entry_missing_a_key_is_rejected() {
    let err = parse_profiles("p.toml".as_ref(), "[default]\nlisten = \"/x.sock\"\n").unwrap_err();
    assert!(matches!(err, ProfileError::Toml { .. }));
}

#[test]
fn first_run_writes_config_under_xdg_dir_and_exits_nonzero() {
    let td = tempfile::tempdir().unwrap();
    let out = fpmtop()
        .env("XDG_CONFIG_HOME", td.path())
        .env_remove("FPMTOP_LOG_FILE")
        .output()
        .unwrap();
    assert!(!out.status.success());
    let text = output_text(&out);
    assert!(text.contains("new configuration file written to"), "{text}");
    assert!(text.contains("[default]"), "defaults echoed: {text}");

    let written = td.path().join("fpmtop").join("fpmtop.toml");
    assert_eq!(fs::read_to_string(written).unwrap(), DEFAULT_CONFIG);
}

#[test]
fn unknown_profile_on_the_command_line_exits_nonzero() {
    let td = tempfile::tempdir().unwrap();
    let path = td.path().join("fpmtop.toml");
    fs::write(&path, DEFAULT_CONFIG).unwrap();

    let out = fpmtop()
        .args(["-c", path.to_str().unwrap(), "nope"])
        .env_remove("FPMTOP_LOG_FILE")
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(output_text(&out).contains("nope not found in config file. Please fix."));
}
