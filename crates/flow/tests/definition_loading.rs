use flow::{bundled_flow, load_flow_from_path, load_flow_from_str, FlowError, PassCondition, Payload};
use serde_json::json;
use std::io::Write;

fn payload(v: serde_json::Value) -> Payload {
  v.as_object().cloned().unwrap_or_default()
}

#[test]
fn bundled_flow_has_expected_shape() -> Result<(), FlowError> {
  let flow = bundled_flow()?;
  assert_eq!(flow.id(), "admissions_flow");
  let step_names: Vec<_> = flow.steps().iter().map(|s| s.name()).collect();
  assert_eq!(step_names,
             vec!["Personal Details Form",
                  "IQ Test",
                  "Interview",
                  "Upload Identification Document",
                  "Sign Contract",
                  "Payment",
                  "Join Slack"]);

  let interview: Vec<_> = flow.steps()[2].tasks().iter().map(|t| t.id()).collect();
  assert_eq!(interview, vec!["schedule_interview", "perform_interview"]);

  let iq = flow.task("iq_test").expect("iq_test");
  assert!(!iq.is_redoable());
  assert!(iq.evaluate_passed(&payload(json!({"score": 85}))));
  assert!(!iq.evaluate_passed(&payload(json!({"score": 70}))));

  let personal = flow.task("personal_details").expect("personal_details");
  assert!(personal.is_redoable());
  assert!(personal.required_fields().contains("timestamp"));
  Ok(())
}

#[test]
fn absent_conditions_and_flags_take_defaults() -> Result<(), FlowError> {
  let flow = load_flow_from_str(r#"{
      "id": "f", "name": "F",
      "steps": [ { "id": "s", "name": "S", "tasks": [ { "id": "t", "name": "T" } ] } ]
    }"#)?;
  let task = flow.task("t").expect("t");
  assert_eq!(task.pass_condition(), &PassCondition::Always);
  assert!(task.is_redoable());
  assert!(task.required_fields().is_empty());
  assert!(task.evaluate_passed(&Payload::new()));
  Ok(())
}

#[test]
fn step_without_tasks_is_kept() -> Result<(), FlowError> {
  let flow = load_flow_from_str(r#"{ "id": "f", "name": "F", "steps": [ { "id": "s", "name": "S" } ] }"#)?;
  assert_eq!(flow.steps().len(), 1);
  assert!(flow.steps()[0].has_implicit_task());
  Ok(())
}

#[test]
fn unknown_pass_condition_fails_to_load() {
  let res = load_flow_from_str(r#"{
      "id": "f", "name": "F",
      "steps": [ { "id": "s", "name": "S", "tasks": [
        { "id": "t", "name": "T", "passCondition": { "type": "scoreLessThan", "field": "score", "threshold": 1 } }
      ] } ]
    }"#);
  match res {
    Err(FlowError::Configuration(msg)) => assert!(msg.contains("scoreLessThan")),
    other => panic!("se esperaba Configuration, se obtuvo {:?}", other),
  }
}

#[test]
fn previous_task_score_between_is_not_a_compiled_kind() {
  let res = load_flow_from_str(r#"{
      "id": "f", "name": "F",
      "steps": [ { "id": "s", "name": "S", "tasks": [
        { "id": "t", "name": "T",
          "visibilityCondition": { "type": "previousTaskScoreBetween", "taskId": "iq_test", "min": 60.0, "max": 75.0 } }
      ] } ]
    }"#);
  assert!(matches!(res, Err(FlowError::Configuration(_))));
}

#[test]
fn repeated_task_id_across_steps_fails_to_load() {
  let res = load_flow_from_str(r#"{
      "id": "f", "name": "F",
      "steps": [
        { "id": "s1", "name": "S1", "tasks": [ { "id": "t", "name": "T" } ] },
        { "id": "s2", "name": "S2", "tasks": [ { "id": "t", "name": "Otra T" } ] }
      ]
    }"#);
  match res {
    Err(FlowError::Configuration(msg)) => assert!(msg.contains("duplicado")),
    other => panic!("se esperaba Configuration, se obtuvo {:?}", other),
  }
}

#[test]
fn malformed_document_is_a_parse_error() {
  assert!(matches!(load_flow_from_str("{ \"id\": \"f\" "), Err(FlowError::Parse(_))));
  assert!(matches!(load_flow_from_str(r#"{ "id": "f", "name": "F" }"#), Err(FlowError::Parse(_))));
}

#[test]
fn load_from_path_reads_file_and_reports_missing_file() -> Result<(), Box<dyn std::error::Error>> {
  let dir = std::env::temp_dir().join(format!("flow-def-{}", std::process::id()));
  std::fs::create_dir_all(&dir)?;
  let path = dir.join("flow.json");
  let mut f = std::fs::File::create(&path)?;
  f.write_all(flow::BUNDLED_FLOW_JSON.as_bytes())?;
  drop(f);

  let flow = load_flow_from_path(&path)?;
  assert_eq!(flow.task_count(), 8);

  let missing = load_flow_from_path(dir.join("no-existe.json"));
  assert!(matches!(missing, Err(FlowError::Io(_))));
  std::fs::remove_dir_all(&dir)?;
  Ok(())
}
