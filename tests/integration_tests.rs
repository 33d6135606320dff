//! Integration tests for the bomtree CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const HEADER: &str = "Product no,Component no,Product name,Qty,Unit,Pos,Name,Description";

/// Helper to get a bomtree command isolated from the user's config
fn bomtree(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bomtree").unwrap();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join("xdg"))
        .env("HOME", tmp.path())
        .env_remove("BOMTREE_LINK_TEMPLATE")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to write a BOM export with the default column layout
fn write_bom(tmp: &TempDir, name: &str, rows: &[&str]) {
    let mut content = String::from(HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(tmp.path().join(name), content).unwrap();
}

/// Plant BOM: A -> B -> D, A -> C
fn setup_plant_bom() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_bom(
        &tmp,
        "plant.csv",
        &[
            "A,B,Fan assembly,1,pc,10,Housing,Cast housing",
            "B,D,Housing,4,pc,10,Screw,M4 screw",
            "A,C,Fan assembly,1,pc,20,Motor,12V motor",
        ],
    );
    tmp
}

fn analyze_json(tmp: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = bomtree(tmp)
        .args(["analyze", "--format", "json"])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "analyze failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn node_parts(sheet: &serde_json::Value) -> Vec<(String, u64)> {
    sheet["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| {
            (
                n["part"].as_str().unwrap().to_string(),
                n["depth"].as_u64().unwrap(),
            )
        })
        .collect()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    bomtree(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("BOM"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    bomtree(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bomtree"));
}

#[test]
fn test_unknown_command_fails() {
    let tmp = TempDir::new().unwrap();
    bomtree(&tmp)
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    bomtree(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bomtree"));
}

#[test]
fn test_completions_fish_lists_report_flags() {
    let tmp = TempDir::new().unwrap();
    bomtree(&tmp)
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("select"))
        .stdout(predicate::str::contains("html"));
}

// ============================================================================
// Analyze Command Tests
// ============================================================================

#[test]
fn test_analyze_markdown_to_stdout() {
    let tmp = setup_plant_bom();

    bomtree(&tmp)
        .args(["analyze", "A", "D", "Z", "--bom", "plant.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# BOM Analysis Report"))
        .stdout(predicate::str::contains("BOM Found"))
        .stdout(predicate::str::contains("Component Only"))
        .stdout(predicate::str::contains("No BOM Found"))
        .stderr(predicate::str::contains("Total parts"));
}

#[test]
fn test_analyze_json_tree_and_statuses() {
    let tmp = setup_plant_bom();
    let report = analyze_json(&tmp, &["A", "D", "Z", "--bom", "plant.csv", "-q"]);

    let rows = report["index_rows"].as_array().unwrap();
    let parts: Vec<&str> = rows.iter().map(|r| r["part"].as_str().unwrap()).collect();
    assert_eq!(parts, vec!["A", "D", "Z"]);
    assert_eq!(rows[0]["status"], "BOM Found");
    assert_eq!(rows[0]["display_name"], "Fan assembly");
    assert_eq!(rows[0]["sources"][0], "plant.csv");
    assert_eq!(rows[1]["status"], "Component Only");
    assert_eq!(rows[2]["status"], "No BOM Found");
    assert_eq!(rows[2]["searched_sources"][0], "plant.csv");

    let sheets = report["part_sheets"].as_array().unwrap();
    assert_eq!(sheets.len(), 2);
    assert_eq!(
        node_parts(&sheets[0]),
        vec![("B".into(), 0), ("D".into(), 1), ("C".into(), 0)]
    );
    assert_eq!(sheets[1]["kind"], "component");
    assert_eq!(sheets[1]["name"], "Screw");

    assert_eq!(report["summary"]["bom_found"], 1);
    assert_eq!(report["summary"]["not_found"], 1);
}

#[test]
fn test_analyze_cycle_terminates() {
    let tmp = TempDir::new().unwrap();
    write_bom(
        &tmp,
        "loop.csv",
        &["P,Q,Panel,1,pc,10,Q part,", "Q,P,Q part,1,pc,10,Panel,"],
    );

    let report = analyze_json(&tmp, &["P", "--bom", "loop.csv", "-q"]);
    assert_eq!(node_parts(&report["part_sheets"][0]), vec![("Q".into(), 0)]);
}

#[test]
fn test_analyze_trees_merge_in_selection_order() {
    let tmp = TempDir::new().unwrap();
    write_bom(&tmp, "s1.csv", &["A,B,Fan,1,pc,10,Housing,"]);
    write_bom(&tmp, "s2.csv", &["A,C,Fan,1,pc,10,Motor,", "B,X,Housing,1,pc,10,Bolt,"]);

    let report = analyze_json(
        &tmp,
        &["A", "--bom", "s1.csv", "--bom", "s2.csv", "--select", "s2.csv", "--select", "s1.csv", "-q"],
    );
    assert_eq!(
        node_parts(&report["part_sheets"][0]),
        vec![("C".into(), 0), ("B".into(), 0)]
    );
    assert_eq!(report["index_rows"][0]["sources"][0], "s1.csv");
    assert_eq!(report["index_rows"][0]["sources"][1], "s2.csv");
}

#[test]
fn test_analyze_select_restricts_search() {
    let tmp = TempDir::new().unwrap();
    write_bom(&tmp, "s1.csv", &["A,B,Fan,1,pc,10,Housing,"]);
    write_bom(&tmp, "s2.csv", &["K,L,Kit,1,pc,10,Lid,"]);

    let report = analyze_json(
        &tmp,
        &["A", "--bom", "s1.csv", "--bom", "s2.csv", "--select", "s2.csv", "-q"],
    );
    assert_eq!(report["index_rows"][0]["status"], "No BOM Found");
    // Display names come from every loaded source
    assert_eq!(report["index_rows"][0]["display_name"], "Fan");
}

#[test]
fn test_analyze_unknown_source_fails() {
    let tmp = setup_plant_bom();

    bomtree(&tmp)
        .args(["analyze", "A", "--bom", "plant.csv", "--select", "other.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown source"));
}

#[test]
fn test_analyze_continues_past_bad_file() {
    let tmp = setup_plant_bom();

    bomtree(&tmp)
        .args(["analyze", "A", "--bom", "missing.csv", "--bom", "plant.csv"])
        .assert()
        .success()
        .stderr(predicate::str::contains("missing.csv"))
        .stdout(predicate::str::contains("BOM Found"));
}

#[test]
fn test_analyze_workbook_and_text_sources_together() {
    let tmp = setup_plant_bom();

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, value) in HEADER.split(',').enumerate() {
        sheet.write_string(0, col as u16, value).unwrap();
    }
    for (col, value) in ["C", "E", "Motor", "", "", "", "Rotor", "Rotor pack"].iter().enumerate() {
        sheet.write_string(1, col as u16, *value).unwrap();
    }
    workbook.save(tmp.path().join("motor.xlsx")).unwrap();

    // C is only a component in plant.csv; its BOM lives in the workbook
    let report = analyze_json(&tmp, &["C", "--bom", "plant.csv", "--bom", "motor.xlsx", "-q"]);
    let rows = report["index_rows"].as_array().unwrap();
    assert_eq!(rows[0]["status"], "BOM Found");
    assert_eq!(rows[0]["sources"], serde_json::json!(["motor.xlsx"]));

    let sheets = report["part_sheets"].as_array().unwrap();
    assert_eq!(node_parts(&sheets[0]), vec![("E".into(), 0)]);
}

#[test]
fn test_analyze_without_sources_fails() {
    let tmp = TempDir::new().unwrap();

    bomtree(&tmp)
        .args(["analyze", "A"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no usable BOM sources"));
}

#[test]
fn test_analyze_missing_columns_fails() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("odd.csv"), "Parent,Child\nA,B\n").unwrap();

    bomtree(&tmp)
        .args(["analyze", "A", "--bom", "odd.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required column"));
}

#[test]
fn test_analyze_without_parts_fails() {
    let tmp = setup_plant_bom();

    bomtree(&tmp)
        .args(["analyze", "--bom", "plant.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no part numbers"));
}

#[test]
fn test_analyze_parts_file() {
    let tmp = setup_plant_bom();
    fs::write(
        tmp.path().join("parts.csv"),
        "line,qty,part\n1,2,A\n2,1,nan\n3,1,\n4,1,Z\n5,1,A\n",
    )
    .unwrap();

    let report = analyze_json(
        &tmp,
        &["--parts-file", "parts.csv", "--parts-header", "--bom", "plant.csv", "-q"],
    );
    let parts: Vec<&str> = report["index_rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["part"].as_str().unwrap())
        .collect();
    assert_eq!(parts, vec!["A", "Z"]);
}

#[test]
fn test_analyze_output_file_infers_format() {
    let tmp = setup_plant_bom();

    bomtree(&tmp)
        .args(["analyze", "A", "--bom", "plant.csv", "-o", "report.html"])
        .assert()
        .success()
        .stderr(predicate::str::contains("report.html"));

    let html = fs::read_to_string(tmp.path().join("report.html")).unwrap();
    assert!(html.contains("<html"));
    assert!(html.contains("Housing"));
}

#[test]
fn test_analyze_save_writes_timestamped_report() {
    let tmp = setup_plant_bom();

    bomtree(&tmp)
        .args(["analyze", "A", "--bom", "plant.csv", "--save", "--format", "csv", "-q"])
        .assert()
        .success();

    let saved: Vec<String> = fs::read_dir(tmp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("bom_analysis_report_") && name.ends_with(".csv"))
        .collect();
    assert_eq!(saved.len(), 1);
}

#[test]
fn test_analyze_parallel_matches_sequential() {
    let tmp = setup_plant_bom();
    let sequential = analyze_json(&tmp, &["A", "B", "D", "Z", "--bom", "plant.csv", "-q"]);
    let parallel = analyze_json(
        &tmp,
        &["A", "B", "D", "Z", "--bom", "plant.csv", "--parallel", "-q"],
    );
    assert_eq!(sequential, parallel);
}

#[test]
fn test_analyze_directory_and_preset() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("boms")).unwrap();
    write_bom(&tmp, "boms/b.csv", &["B,D,Housing,1,pc,10,Screw,"]);
    write_bom(&tmp, "boms/a.csv", &["A,B,Fan,1,pc,10,Housing,"]);
    write_bom(&tmp, "legacy.csv", &["L,M,Legacy,1,pc,10,Mount,"]);
    fs::write(
        tmp.path().join(".bomtree.yaml"),
        "sources:\n  - label: legacy\n    path: legacy.csv\n",
    )
    .unwrap();

    let report = analyze_json(
        &tmp,
        &["A", "L", "--preset", "legacy", "--dir", "boms", "-q"],
    );
    let rows = report["index_rows"].as_array().unwrap();
    assert_eq!(rows[0]["searched_sources"][0], "legacy.csv");
    assert_eq!(rows[0]["searched_sources"][1], "a.csv");
    assert_eq!(rows[0]["searched_sources"][2], "b.csv");
    assert_eq!(rows[1]["status"], "BOM Found");
}

#[test]
fn test_analyze_link_template_from_env() {
    let tmp = setup_plant_bom();

    bomtree(&tmp)
        .env("BOMTREE_LINK_TEMPLATE", "https://drawings.example/{part}")
        .args(["analyze", "A", "--bom", "plant.csv", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://drawings.example/B"));
}

// ============================================================================
// Tree Command Tests
// ============================================================================

#[test]
fn test_tree_prints_branches() {
    let tmp = setup_plant_bom();

    bomtree(&tmp)
        .args(["tree", "A", "--bom", "plant.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("├─ B"))
        .stdout(predicate::str::contains("│  └─ D"))
        .stdout(predicate::str::contains("└─ C"));
}

#[test]
fn test_tree_component_only_and_missing() {
    let tmp = setup_plant_bom();

    bomtree(&tmp)
        .args(["tree", "D", "--bom", "plant.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Component Only"));

    bomtree(&tmp)
        .args(["tree", "Z", "--bom", "plant.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No BOM Found"));
}

// ============================================================================
// Sources Command Tests
// ============================================================================

#[test]
fn test_sources_table() {
    let tmp = setup_plant_bom();

    bomtree(&tmp)
        .args(["sources", "--bom", "plant.csv", "--bom", "gone.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("plant.csv"))
        .stdout(predicate::str::contains("3 unique relationships"))
        .stderr(predicate::str::contains("gone.csv"));
}

#[test]
fn test_sources_json() {
    let tmp = setup_plant_bom();

    let output = bomtree(&tmp)
        .args(["sources", "--bom", "plant.csv", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["sources"][0]["label"], "plant.csv");
    assert_eq!(value["sources"][0]["assemblies"], 2);
    assert_eq!(value["combined_relationships"], 3);
}

// ============================================================================
// Config Command Tests
// ============================================================================

#[test]
fn test_config_init_refuses_overwrite() {
    let tmp = TempDir::new().unwrap();

    bomtree(&tmp)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".bomtree.yaml"));
    assert!(tmp.path().join(".bomtree.yaml").exists());

    bomtree(&tmp)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_show_merges_project_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".bomtree.yaml"), "default_format: json\n").unwrap();

    bomtree(&tmp)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_format: json"))
        .stdout(predicate::str::contains("product_no"));
}

#[test]
fn test_config_default_format_used() {
    let tmp = setup_plant_bom();
    fs::write(tmp.path().join(".bomtree.yaml"), "default_format: yaml\n").unwrap();

    bomtree(&tmp)
        .args(["analyze", "A", "--bom", "plant.csv", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("status: BOM Found"));
}
