#![cfg(not(target_os = "windows"))]

use rescalc_test_utils::sandbox::Sandbox;
use serde_json::Value;

fn members(combo: &Value) -> Vec<f64> {
    combo["members"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m.as_f64().unwrap())
        .collect()
}

fn find_json<I, S>(sb: &Sandbox, args: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut full = vec!["find".to_string(), "--format".into(), "json".into()];
    full.extend(args.into_iter().map(|a| a.as_ref().to_string()));
    let stdout = sb.run("rescalc", full, None).expect("rescalc find");
    serde_json::from_str(&stdout).expect("valid JSON")
}

#[test]
fn test_find_series_exact_match() {
    let sb = Sandbox::new();
    let json = find_json(
        &sb,
        ["-r", "100, 220, 330", "-t", "320", "-e", "1", "-n", "2", "-m", "series"],
    );

    let series = json["series"].as_array().unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(members(&series[0]), vec![100.0, 220.0]);
    assert_eq!(series[0]["total"].as_f64(), Some(320.0));
    assert_eq!(series[0]["error_percent"].as_f64(), Some(0.0));
    assert!(json["parallel"].as_array().unwrap().is_empty());
}

#[test]
fn test_find_parallel_pair() {
    let sb = Sandbox::new();
    let json = find_json(
        &sb,
        ["-r", "100,100", "-t", "50", "-e", "1", "-n", "2", "-m", "parallel"],
    );

    let parallel = json["parallel"].as_array().unwrap();
    assert_eq!(parallel.len(), 1);
    assert_eq!(members(&parallel[0]), vec![100.0, 100.0]);
    assert!(json["series"].as_array().unwrap().is_empty());
}

#[test]
fn test_find_allow_repeats() {
    let sb = Sandbox::new();
    let args = ["-r", "100", "-t", "50", "-e", "1", "-n", "2", "-m", "parallel"];

    let json = find_json(&sb, args);
    assert!(json["parallel"].as_array().unwrap().is_empty());

    let json = find_json(&sb, args.iter().chain(&["--allow-repeats"]));
    let parallel = json["parallel"].as_array().unwrap();
    assert_eq!(members(&parallel[0]), vec![100.0, 100.0]);
}

#[test]
fn test_find_accepts_resistor_notation() {
    let sb = Sandbox::new();
    let json = find_json(
        &sb,
        ["-r", "1k, 4k7, bogus, 470R", "-t", "1k47", "-e", "0.5", "-m", "series"],
    );

    let series = json["series"].as_array().unwrap();
    assert_eq!(members(&series[0]), vec![1000.0, 470.0]);
}

#[test]
fn test_find_limits_json_unless_all() {
    let sb = Sandbox::new();
    let args = ["-t", "1500", "-e", "20", "-m", "series"];

    let limited = find_json(&sb, args);
    assert_eq!(limited["series"].as_array().unwrap().len(), 5);

    let one = find_json(&sb, args.iter().chain(&["--limit", "1"]));
    assert_eq!(one["series"].as_array().unwrap().len(), 1);

    let all = find_json(&sb, args.iter().chain(&["--all"]));
    let all_series = all["series"].as_array().unwrap();
    assert!(all_series.len() > 5);

    let errors: Vec<f64> = all_series
        .iter()
        .map(|c| c["error_percent"].as_f64().unwrap())
        .collect();
    assert!(errors.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_find_default_table() {
    let sb = Sandbox::new();
    let stdout = sb.run("rescalc", ["find"], None).unwrap();

    assert!(stdout.contains("Series combinations"));
    assert!(stdout.contains("Parallel combinations"));
    // Best matches for 1.5k from the default shelf, members in input order
    assert!(stdout.contains("470 + 1k"));
    assert!(stdout.contains("2.2k || 4.7k"));
    assert!(!stdout.contains("Showing"));
}

#[test]
fn test_find_table_limit() {
    let sb = Sandbox::new();
    let stdout = sb
        .run("rescalc", ["find", "-m", "series", "--limit", "1"], None)
        .unwrap();

    // 470+1k, 220+330+1k, 100+330+1k and 100+470+1k are within 5% of 1.5k
    assert!(stdout.contains("Showing 1 of 4 combinations"));
    assert!(stdout.contains("470 + 1k"));
    assert!(!stdout.contains("220 + 330 + 1k"));
}

#[test]
fn test_find_reports_empty_results() {
    let sb = Sandbox::new();
    let stdout = sb
        .run("rescalc", ["find", "-r", "10", "-t", "1M", "-m", "series"], None)
        .unwrap();
    assert!(stdout.contains("No series combination found within tolerance"));
    assert!(!stdout.contains("Parallel combinations"));
}

#[test]
fn test_find_rejects_zero_target() {
    let sb = Sandbox::new();
    let output = sb.output("rescalc", ["find", "-t", "0"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Invalid search parameters"));
    assert!(stderr.contains("Target must be a positive finite resistance"));
}

#[test]
fn test_find_rejects_zero_max_size() {
    let sb = Sandbox::new();
    let output = sb.output("rescalc", ["find", "-n", "0"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Maximum combination size must be at least 1"));
}

#[test]
fn test_find_rejects_bad_target_notation() {
    let sb = Sandbox::new();
    let output = sb.output("rescalc", ["find", "-t", "lots"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("'lots'"));
}

#[test]
fn test_find_skips_out_of_range_resistor() {
    let sb = Sandbox::new();
    let json = find_json(
        &sb,
        ["-r", "100, 10000000000000000000000000000k", "-t", "100", "-m", "series"],
    );

    let series = json["series"].as_array().unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(members(&series[0]), vec![100.0]);
}

#[test]
fn test_find_writes_profile() {
    let sb = Sandbox::new();
    let output = sb.output("rescalc", ["-d", "--profile", "trace/find.json", "find"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success(), "{stderr}");
    assert!(!stderr.contains("Profile may be empty"));

    let trace = std::fs::read_to_string(sb.default_cwd().join("trace/find.json")).unwrap();
    assert!(trace.contains("\"search\""));
}
