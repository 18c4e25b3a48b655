use admissions_workflow::{AdmissionsService, ErrorKind, ProgressSummary, UserStatus, WorkflowError};
use flow::{Flow, Payload, PassCondition, Step, Task, VisibilityCondition};
use serde_json::json;
use std::collections::BTreeSet;

fn payload(value: serde_json::Value) -> Payload {
  value.as_object().cloned().unwrap_or_default()
}

fn scored(id: &str, redoable: bool) -> Result<Task, flow::FlowError> {
  Task::new(id,
            id.to_uppercase(),
            BTreeSet::new(),
            PassCondition::ScoreGreaterThan { field: "score".into(),
                                              threshold: 50.0 },
            VisibilityCondition::Always,
            redoable)
}

/// s1: [a, b], s2: [] (implícita), s3: [c]
fn three_step_flow(redoable: bool) -> Result<Flow, flow::FlowError> {
  Flow::new("f",
            "F",
            vec![Step::new("s1", "S1", vec![scored("a", redoable)?, scored("b", redoable)?])?,
                 Step::new("s2", "S2", vec![])?,
                 Step::new("s3", "S3", vec![scored("c", redoable)?])?])
}

#[test]
fn fresh_user_starts_at_first_task_of_first_step() -> Result<(), WorkflowError> {
  let service = AdmissionsService::in_memory(flow::bundled_flow()?);
  let user = service.create_user("fresh@example.com")?;
  let position = service.current_position(user.id())?.expect("posición");
  assert_eq!(position.step_index, 0);
  assert_eq!(position.step.id(), "personal_details");
  assert_eq!(position.task.id(), "personal_details");
  assert_eq!(service.user_status(user.id())?, UserStatus::InProgress);
  Ok(())
}

#[test]
fn failed_task_takes_priority_over_untried_ones() -> Result<(), WorkflowError> {
  let service = AdmissionsService::in_memory(three_step_flow(true)?);
  let user = service.create_user("retry@example.com")?;

  service.complete_task(user.id(), "a", payload(json!({"score": 10})))?;
  let position = service.current_position(user.id())?.expect("posición");
  assert_eq!(position.task.id(), "a");

  service.complete_task(user.id(), "a", payload(json!({"score": 90})))?;
  service.complete_task(user.id(), "b", payload(json!({"score": 90})))?;
  service.complete_task(user.id(), "c", payload(json!({"score": 10})))?;
  // c falló en el último paso; sigue siendo la posición actual
  let position = service.current_position(user.id())?.expect("posición");
  assert_eq!(position.step_index, 2);
  assert_eq!(position.task.id(), "c");
  Ok(())
}

#[test]
fn failure_in_later_step_outranks_untried_earlier_step() -> Result<(), WorkflowError> {
  let service = AdmissionsService::in_memory(three_step_flow(true)?);
  let user = service.create_user("cross@example.com")?;

  // el orden sólo se exige dentro de un paso: c se puede enviar antes que a
  let outcome = service.complete_task(user.id(), "c", payload(json!({"score": 1})))?;
  assert!(!outcome.passed);
  assert!(!service.snapshot(user.id())?.has_result("a"));

  let position = service.current_position(user.id())?.expect("posición");
  assert_eq!(position.step_index, 2);
  assert_eq!(position.step.id(), "s3");
  assert_eq!(position.task.id(), "c");
  Ok(())
}

#[test]
fn empty_step_is_skipped_by_position_and_status() -> Result<(), WorkflowError> {
  let service = AdmissionsService::in_memory(three_step_flow(true)?);
  let user = service.create_user("empty@example.com")?;
  for id in ["a", "b"] {
    service.complete_task(user.id(), id, payload(json!({"score": 60})))?;
  }
  let position = service.current_position(user.id())?.expect("posición");
  assert_eq!(position.step.id(), "s3");

  service.complete_task(user.id(), "c", payload(json!({"score": 60})))?;
  assert!(service.current_position(user.id())?.is_none());
  assert_eq!(service.user_status(user.id())?, UserStatus::Accepted);

  let steps = service.visible_steps(user.id())?;
  assert_eq!(steps.len(), 3);
  assert!(steps[1].step.has_implicit_task());
  Ok(())
}

#[test]
fn redoable_failure_can_be_lifted() -> Result<(), WorkflowError> {
  let service = AdmissionsService::in_memory(three_step_flow(true)?);
  let user = service.create_user("lift@example.com")?;

  let outcome = service.complete_task(user.id(), "a", payload(json!({"score": 5})))?;
  assert_eq!(outcome.user_status, UserStatus::Rejected);
  let outcome = service.complete_task(user.id(), "a", payload(json!({"score": 55})))?;
  assert_eq!(outcome.user_status, UserStatus::InProgress);
  service.complete_task(user.id(), "b", payload(json!({"score": 55})))?;
  let outcome = service.complete_task(user.id(), "c", payload(json!({"score": 55})))?;
  assert_eq!(outcome.user_status, UserStatus::Accepted);
  Ok(())
}

#[test]
fn non_redoable_failure_stays_current_but_cannot_be_resubmitted() -> Result<(), WorkflowError> {
  let service = AdmissionsService::in_memory(three_step_flow(false)?);
  let user = service.create_user("stuck@example.com")?;

  service.complete_task(user.id(), "a", payload(json!({"score": 5})))?;
  let position = service.current_position(user.id())?.expect("posición");
  assert_eq!(position.task.id(), "a");

  let err = service.complete_task(user.id(), "a", payload(json!({"score": 99}))).unwrap_err();
  assert_eq!(err.kind(), ErrorKind::TaskAlreadyCompleted);
  assert_eq!(service.user_status(user.id())?, UserStatus::Rejected);
  Ok(())
}

#[test]
fn progress_reports_position_and_counts() -> Result<(), WorkflowError> {
  let service = AdmissionsService::in_memory(three_step_flow(true)?);
  let user = service.create_user("progress@example.com")?;
  service.complete_task(user.id(), "a", payload(json!({"score": 60})))?;

  assert_eq!(service.progress(user.id())?,
             ProgressSummary::InProgress { step_index: 0,
                                           step_id: "s1".into(),
                                           step_name: "S1".into(),
                                           task_id: "b".into(),
                                           task_name: "B".into(),
                                           completed_tasks: 1,
                                           total_visible_tasks: 3 });

  for id in ["b", "c"] {
    service.complete_task(user.id(), id, payload(json!({"score": 60})))?;
  }
  let summary = service.progress(user.id())?;
  assert!(summary.is_completed());
  let rendered = serde_json::to_value(&summary).map_err(|e| WorkflowError::Internal(e.to_string()))?;
  assert_eq!(rendered, json!({"status": "completed", "completed_tasks": 3, "total_visible_tasks": 3}));
  Ok(())
}

#[test]
fn queries_on_unknown_user_fail_but_snapshot_is_empty() -> Result<(), WorkflowError> {
  let service = AdmissionsService::in_memory(flow::bundled_flow()?);
  assert_eq!(service.current_position("42").unwrap_err().kind(), ErrorKind::UserNotFound);
  assert_eq!(service.progress("42").unwrap_err().kind(), ErrorKind::UserNotFound);
  assert_eq!(service.user_status("42").unwrap_err().kind(), ErrorKind::UserNotFound);
  assert!(service.snapshot("42")?.is_empty());
  assert!(service.get_user("42")?.is_none());
  Ok(())
}
