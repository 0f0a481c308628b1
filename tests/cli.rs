//! Integration tests for top-level CLI behavior.

use std::path::Path;
use std::process::Command;

const ROUTER: &str = r"import { createRouter, createWebHistory } from 'vue-router'

const routes = [
  {
    path: '/',
    name: 'Home',
    component: () => import('@/pages/Home.vue'),
  },
  {
    path: '/billing/invoices',
    name: 'Invoices',
    component: () => import('@/pages/fiannce/Invoices.vue'),
  },
]

export default createRouter({ history: createWebHistory(), routes })
";

fn run_routesync(cwd: &Path, args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_routesync");
    Command::new(bin)
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .env_remove("ROUTESYNC_CONFIG")
        .env_remove("ROUTESYNC_ROUTER_SOURCE")
        .env_remove("ROUTESYNC_PAGES_ROOT")
        .env_remove("ROUTESYNC_FUZZY_THRESHOLD")
        .env_remove("ROUTESYNC_BACKUP_DIR")
        .output()
        .expect("failed to run routesync binary")
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let write = |rel: &str, contents: &str| {
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    };
    write("src/router/index.js", ROUTER);
    write("src/pages/Home.vue", "<template><h1>Home</h1></template>\n");
    write("src/pages/finance/Invoices.vue", "<template><h1>Invoices</h1></template>\n");
    write("src/pages/reports/QuarterlySummary.vue", "<template><h1>Summary</h1></template>\n");
    dir
}

fn with_roots<'a>(args: &[&'a str]) -> Vec<&'a str> {
    let mut all = args.to_vec();
    all.extend(["--router-source", "src/router/index.js", "--pages-root", "src/pages"]);
    all
}

#[test]
fn reconcile_prints_json_report() {
    let dir = project();
    let output = run_routesync(dir.path(), &with_roots(&["reconcile", "--format", "json"]));
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["summary"]["exact"], 1);
    assert_eq!(report["summary"]["fuzzy"], 1);
    assert_eq!(report["summary"]["file_needs_route"], 1);
    assert_eq!(report["actions"].as_array().map(Vec::len), Some(2));
    assert!(report.get("apply").is_none());
}

#[test]
fn reconcile_text_report_lists_actions() {
    let dir = project();
    let output = run_routesync(dir.path(), &with_roots(&["reconcile"]));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    let rewrite = "Rewrite component of route /billing/invoices to '@/pages/finance/Invoices.vue'";
    assert!(stdout.contains(rewrite));
    assert!(stdout.contains("Insert route /reports/quarterly-summary (name 'QuarterlySummary')"));
}

#[test]
fn reconcile_apply_fixes_router_and_backs_it_up() {
    let dir = project();
    let output = run_routesync(dir.path(), &with_roots(&["reconcile", "--apply"]));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Apply complete"));

    let router = std::fs::read_to_string(dir.path().join("src/router/index.js")).unwrap();
    assert!(router.contains("import('@/pages/finance/Invoices.vue')"));
    assert!(router.contains("path: '/reports/quarterly-summary'"));

    let backups: Vec<_> = std::fs::read_dir(dir.path().join("src/router/.routesync-backups"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(std::fs::read_to_string(&backups[0]).unwrap(), ROUTER);

    let again = run_routesync(dir.path(), &with_roots(&["reconcile", "--format", "json"]));
    let report: serde_json::Value = serde_json::from_slice(&again.stdout).unwrap();
    assert_eq!(report["summary"]["actions"], 0);
}

#[test]
fn backup_failure_exits_nonzero_but_prints_report() {
    let dir = project();
    std::fs::write(dir.path().join("blocker"), "not a directory").unwrap();
    let output = run_routesync(
        dir.path(),
        &with_roots(&["reconcile", "--apply", "--backup-dir", "blocker/backups"]),
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Actions (2)"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Apply aborted"));
    assert_eq!(std::fs::read_to_string(dir.path().join("src/router/index.js")).unwrap(), ROUTER);
}

#[test]
fn out_of_range_threshold_is_rejected() {
    let dir = project();
    let output = run_routesync(dir.path(), &with_roots(&["reconcile", "--fuzzy-threshold", "1.5"]));
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("within [0, 1]"));
}

#[test]
fn missing_roots_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_routesync(dir.path(), &["reconcile"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("router source is required"));
}

#[test]
fn config_file_in_working_directory_is_used() {
    let dir = project();
    std::fs::write(
        dir.path().join("routesync.yaml"),
        "router_source: src/router/index.js\npages_root: src/pages\nfuzzy_threshold: 0.9\n",
    )
    .unwrap();
    let output = run_routesync(dir.path(), &["reconcile", "--format", "json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["summary"]["fuzzy"], 0);
    assert_eq!(report["fuzzy_threshold"], 0.9);
}

#[test]
fn routes_subcommand_lists_routes() {
    let dir = project();
    let output = run_routesync(dir.path(), &with_roots(&["routes"]));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("/billing/invoices"));
    assert!(stdout.contains("2 route(s) total."));
}

#[test]
fn pages_subcommand_lists_inventory() {
    let dir = project();
    let output = run_routesync(dir.path(), &with_roots(&["pages", "--format", "json"]));
    assert!(output.status.success());
    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listing["files"].as_array().map(Vec::len), Some(3));
    assert_eq!(listing["files"][0]["relative_path"], "finance/Invoices.vue");
}

#[test]
fn help_shows_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_routesync(dir.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("reconcile"));
    assert!(stdout.contains("routes"));
    assert!(stdout.contains("pages"));
}

#[test]
fn unknown_subcommand_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_routesync(dir.path(), &["frobnicate"]);
    assert!(!output.status.success());
}
