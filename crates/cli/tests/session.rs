mod common;

use common::{cli, setup_data};
use pretty_assertions::assert_eq;
use serde_json::Value;

fn run_session(input: &str) -> Vec<Value> {
    let temp = setup_data();
    let output = cli(temp.path())
        .arg("session")
        .write_stdin(input)
        .output()
        .expect("session run");
    assert!(output.status.success());
    String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect()
}

fn events(lines: &[Value]) -> Vec<&str> {
    lines.iter().filter_map(|line| line["event"].as_str()).collect()
}

#[test]
fn navigation_streams_events_in_order() {
    let lines = run_session(concat!(
        r#"{"op":"set_dimension","dimension":"Enabling Infrastructure"}"#,
        "\n",
        r#"{"op":"set_phase","phase":"Design"}"#,
        "\n",
        r#"{"op":"focus_policy","id":"P1"}"#,
        "\n",
        r#"{"op":"add_to_plan","key":"Enabling Infrastructure|Design|P1"}"#,
        "\n",
        r#"{"op":"add_to_plan","key":"Enabling Infrastructure|Design|P1"}"#,
        "\n",
        r#"{"op":"clear_phase"}"#,
        "\n",
    ));

    assert_eq!(
        events(&lines),
        vec![
            "dimensionChanged",
            "phaseChanged",
            "loadingChanged",
            "policyChanged",
            "relatedPoliciesChanged",
            "loadingChanged",
            "policyAdded",
            "phaseCleared",
        ]
    );
    let focused = lines
        .iter()
        .find(|line| line["event"] == "policyChanged")
        .expect("policyChanged");
    assert_eq!(focused["policyId"], "P1");
    let loading = lines
        .iter()
        .find(|line| line["event"] == "loadingChanged")
        .expect("loadingChanged");
    assert_eq!(loading["isLoading"], true);
}

#[test]
fn debounced_search_is_flushed_at_end_of_input() {
    let lines = run_session(concat!(
        r#"{"op":"search","term":"p"}"#,
        "\n",
        r#"{"op":"search","term":"pro"}"#,
        "\n",
        r#"{"op":"search","term":"protection"}"#,
        "\n",
    ));

    assert_eq!(events(&lines), vec!["searchChanged"]);
    assert_eq!(lines[0]["term"], "protection");
}

#[test]
fn views_and_snapshots_reflect_state() {
    let lines = run_session(concat!(
        r#"{"op":"add_keyword","keyword":"privacy"}"#,
        "\n",
        r#"{"op":"view"}"#,
        "\n",
        r#"{"op":"snapshot"}"#,
        "\n",
        r#"{"op":"clear_filters"}"#,
        "\n",
        r#"{"op":"view"}"#,
        "\n",
    ));

    assert_eq!(lines[0]["event"], "keywordAdded");
    assert_eq!(lines[1]["view"], "listing");
    assert_eq!(lines[1]["data"]["policies"].as_array().unwrap().len(), 3);
    assert_eq!(lines[2]["snapshot"]["activeKeywords"][0], "privacy");
    assert_eq!(lines[3]["event"], "allFiltersCleared");
    assert_eq!(lines[4]["data"]["mode"], "empty");
}

#[test]
fn bad_lines_do_not_end_the_session() {
    let lines = run_session(concat!(
        "garbage\n",
        r#"{"op":"teleport"}"#,
        "\n",
        r#"{"op":"reset"}"#,
        "\n",
    ));

    assert_eq!(lines[0]["error"]["code"], "invalid_request");
    assert_eq!(lines[1]["error"]["code"], "invalid_request");
    assert_eq!(lines[2]["event"], "stateReset");
}
