use admissions_workflow::{AdmissionsService, ErrorKind, WorkflowError};
use flow::Payload;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

fn payload(value: serde_json::Value) -> Payload {
  value.as_object().cloned().unwrap_or_default()
}

#[test]
fn concurrent_creations_get_distinct_ids_and_one_wins_per_email() -> Result<(), WorkflowError> {
  let service = Arc::new(AdmissionsService::in_memory(flow::bundled_flow()?));

  let handles: Vec<_> = (0..16).map(|i| {
                                 let service = Arc::clone(&service);
                                 // dos hilos por email, con distinta capitalización
                                 let email = if i % 2 == 0 { format!("user{}@example.com", i / 2) } else { format!("USER{}@example.com ", i / 2) };
                                 thread::spawn(move || service.create_user(&email).map(|u| u.id().to_string()))
                               })
                               .collect();

  let mut ids = HashSet::new();
  let mut duplicates = 0;
  for handle in handles {
    match handle.join().expect("hilo") {
      Ok(id) => assert!(ids.insert(id)),
      Err(e) => {
        assert_eq!(e.kind(), ErrorKind::DuplicateUser);
        duplicates += 1;
      }
    }
  }
  assert_eq!(ids.len(), 8);
  assert_eq!(duplicates, 8);
  assert_eq!(service.list_users()?.len(), 8);
  Ok(())
}

#[test]
fn concurrent_completions_of_a_non_redoable_task_commit_once() -> Result<(), WorkflowError> {
  let service = Arc::new(AdmissionsService::in_memory(flow::bundled_flow()?));
  let user = service.create_user("race@example.com")?;
  service.complete_task(user.id(),
                        "personal_details",
                        payload(json!({"first_name": "R", "last_name": "C", "email": "race@example.com", "timestamp": "now"})))?;

  let handles: Vec<_> = (0..8).map(|i| {
                                let service = Arc::clone(&service);
                                let user_id = user.id().to_string();
                                thread::spawn(move || {
                                  service.complete_task(&user_id,
                                                        "iq_test",
                                                        payload(json!({"test_id": format!("t{}", i), "score": 80 + i, "timestamp": "now"})))
                                })
                              })
                              .collect();

  let mut committed = 0;
  for handle in handles {
    match handle.join().expect("hilo") {
      Ok(_) => committed += 1,
      Err(e) => assert_eq!(e.kind(), ErrorKind::TaskAlreadyCompleted),
    }
  }
  assert_eq!(committed, 1);
  Ok(())
}

#[test]
fn concurrent_users_progress_independently() -> Result<(), WorkflowError> {
  let service = Arc::new(AdmissionsService::in_memory(flow::bundled_flow()?));

  let handles: Vec<_> = (0..8).map(|i| {
                                let service = Arc::clone(&service);
                                thread::spawn(move || -> Result<String, WorkflowError> {
                                  let email = format!("p{}@example.com", i);
                                  let user = service.create_user(&email)?;
                                  for _ in 0..5 {
                                    service.complete_task(user.id(),
                                                          "personal_details",
                                                          payload(json!({"first_name": "F", "last_name": "L", "email": email.as_str(), "timestamp": "now"})))?;
                                  }
                                  Ok(user.id().to_string())
                                })
                              })
                              .collect();

  for handle in handles {
    let user_id = handle.join().expect("hilo")?;
    let snap = service.snapshot(&user_id)?;
    assert_eq!(snap.len(), 1);
    assert_eq!(service.current_position(&user_id)?.map(|p| p.task.id().to_string()), Some("iq_test".to_string()));
  }
  Ok(())
}
