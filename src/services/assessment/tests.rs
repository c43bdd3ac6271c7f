use serde_json::json;

use super::{AssessmentError, NewTest, ProfileChanges};
use crate::repositories;
use crate::test_support;

fn midterm(teacher_id: &str) -> NewTest {
    NewTest {
        teacher_id: teacher_id.to_string(),
        test_name: "Midterm".to_string(),
        category: "Math".to_string(),
        class_name: "10A".to_string(),
        minutes: 60,
        rules: "Answer every question".to_string(),
        out_of_marks: 100.0,
        questions: vec![json!({"question": "q1", "options": ["a", "b"], "answer": "a"})],
    }
}

#[tokio::test]
async fn midterm_lifecycle_scenario() {
    let ctx = test_support::setup_test_context().await;
    let service = ctx.state.assessment();
    let (_, teacher) = test_support::insert_teacher(ctx.state.db(), "teacher@school.test").await;

    let created = service.create_test(midterm(&teacher.id)).await.expect("create");
    assert!(created.assigned_to.is_empty());
    assert!(!created.attempted);
    assert!(created.answers.0.is_empty());
    assert!(created.submit_by.0.is_empty());

    let duplicate = service.create_test(midterm(&teacher.id)).await;
    assert!(matches!(duplicate, Err(AssessmentError::AlreadyExists(_))));

    let assigned = service
        .assign_test_to_classes(&created.id, &["10A".to_string(), "10B".to_string()])
        .await
        .expect("assign");
    assert_eq!(assigned, vec!["10A", "10B"]);

    let assigned =
        service.assign_test_to_classes(&created.id, &["10A".to_string()]).await.expect("assign");
    assert_eq!(assigned, vec!["10A", "10B"]);

    service.delete_test(&created.id).await.expect("delete");

    let update = service.update_test_questions(&created.id, vec![json!({"question": "q2"})]).await;
    assert!(matches!(update, Err(AssessmentError::NotFound("Test"))));
}

#[tokio::test]
async fn concurrent_duplicate_creates_store_exactly_one_test() {
    let ctx = test_support::setup_test_context().await;
    let (_, teacher) = test_support::insert_teacher(ctx.state.db(), "race@school.test").await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = ctx.state.assessment().clone();
        let new_test = midterm(&teacher.id);
        handles.push(tokio::spawn(async move { service.create_test(new_test).await }));
    }

    let mut created = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.expect("join") {
            Ok(_) => created += 1,
            Err(AssessmentError::AlreadyExists(_)) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(rejected, 7);

    let listed = ctx.state.assessment().list_tests_for_teacher(&teacher.id).await.expect("list");
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn concurrent_overlapping_assigns_converge_to_union() {
    let ctx = test_support::setup_test_context().await;
    let (_, teacher) = test_support::insert_teacher(ctx.state.db(), "assign@school.test").await;
    let test = ctx.state.assessment().create_test(midterm(&teacher.id)).await.expect("create");

    let batches: Vec<Vec<String>> = vec![
        vec!["10A".into(), "10B".into()],
        vec!["10B".into(), "10C".into()],
        vec!["10A".into()],
        vec!["10D".into(), "10A".into(), "10D".into()],
        vec!["10C".into()],
        vec!["10B".into(), "10E".into()],
    ];

    let mut handles = Vec::new();
    for _ in 0..3 {
        for batch in batches.clone() {
            let service = ctx.state.assessment().clone();
            let test_id = test.id.clone();
            handles.push(tokio::spawn(async move {
                service.assign_test_to_classes(&test_id, &batch).await
            }));
        }
    }
    for handle in handles {
        handle.await.expect("join").expect("assign");
    }

    let stored = ctx.state.assessment().get_test(&test.id).await.expect("get");
    assert_eq!(stored.assigned_to, vec!["10A", "10B", "10C", "10D", "10E"]);
}

#[tokio::test]
async fn invalid_batches_apply_nothing() {
    let ctx = test_support::setup_test_context().await;
    let (_, teacher) = test_support::insert_teacher(ctx.state.db(), "batch@school.test").await;
    let test = ctx.state.assessment().create_test(midterm(&teacher.id)).await.expect("create");

    let result = ctx
        .state
        .assessment()
        .assign_test_to_classes(&test.id, &["10A".to_string(), " ".to_string()])
        .await;
    assert!(matches!(result, Err(AssessmentError::InvalidInput(_))));

    let result = ctx.state.assessment().assign_test_to_classes(&test.id, &[]).await;
    assert!(matches!(result, Err(AssessmentError::InvalidInput(_))));

    let stored = ctx.state.assessment().get_test(&test.id).await.expect("get");
    assert!(stored.assigned_to.is_empty());
}

#[tokio::test]
async fn missing_targets_report_not_found() {
    let ctx = test_support::setup_test_context().await;
    let service = ctx.state.assessment();
    let missing = "00000000-0000-0000-0000-000000000000";

    assert!(matches!(
        service.list_tests_for_teacher(missing).await,
        Err(AssessmentError::NotFound("Teacher"))
    ));
    assert!(matches!(
        service.get_teacher_profile(missing).await,
        Err(AssessmentError::NotFound("Teacher"))
    ));
    assert!(matches!(
        service.create_test(midterm(missing)).await,
        Err(AssessmentError::NotFound("Teacher"))
    ));
    assert!(matches!(
        service.update_test_questions(missing, vec![json!({"q": 1})]).await,
        Err(AssessmentError::NotFound("Test"))
    ));
    assert!(matches!(
        service
            .update_teacher_profile(
                missing,
                ProfileChanges { first_name: Some("Grace".into()), ..ProfileChanges::default() }
            )
            .await,
        Err(AssessmentError::NotFound("Teacher"))
    ));
    assert!(matches!(
        service.assign_test_to_classes(missing, &["10A".to_string()]).await,
        Err(AssessmentError::NotFound("Test"))
    ));
    assert!(matches!(service.delete_test(missing).await, Err(AssessmentError::NotFound("Test"))));
    assert!(matches!(service.get_test(missing).await, Err(AssessmentError::NotFound("Test"))));
    assert!(matches!(
        service.record_attempt(missing, missing).await,
        Err(AssessmentError::NotFound("Test"))
    ));
}

#[tokio::test]
async fn teacher_without_tests_lists_empty() {
    let ctx = test_support::setup_test_context().await;
    let (_, teacher) = test_support::insert_teacher(ctx.state.db(), "empty@school.test").await;

    let listed = ctx.state.assessment().list_tests_for_teacher(&teacher.id).await.expect("list");
    assert!(listed.is_empty());
}

#[tokio::test]
async fn class_names_are_distinct_across_users() {
    let ctx = test_support::setup_test_context().await;
    let service = ctx.state.assessment();

    assert!(service.list_distinct_class_names().await.expect("empty store").is_empty());

    test_support::insert_user(ctx.state.db(), "a@school.test", "10B").await;
    test_support::insert_user(ctx.state.db(), "b@school.test", "10A").await;
    test_support::insert_user(ctx.state.db(), "c@school.test", "10B").await;

    assert_eq!(service.list_distinct_class_names().await.expect("classes"), vec!["10A", "10B"]);
}

#[tokio::test]
async fn teacher_profile_embeds_current_user_fields() {
    let ctx = test_support::setup_test_context().await;
    let service = ctx.state.assessment();
    let (user, teacher) = test_support::insert_teacher(ctx.state.db(), "profile@school.test").await;

    service
        .update_teacher_profile(
            &teacher.id,
            ProfileChanges {
                first_name: Some(" Grace ".into()),
                email: Some("grace@school.test".into()),
                ..ProfileChanges::default()
            },
        )
        .await
        .expect("update profile");

    let profile = service.get_teacher_profile(&teacher.id).await.expect("profile");
    let stored = repositories::users::find_by_id(ctx.state.db(), &user.id)
        .await
        .expect("user query")
        .expect("user");

    assert_eq!(profile.id, teacher.id);
    assert_eq!(profile.user.id, stored.id);
    assert_eq!(profile.user.first_name, "Grace");
    assert_eq!(profile.user.first_name, stored.first_name);
    assert_eq!(profile.user.last_name, stored.last_name);
    assert_eq!(profile.user.email, "grace@school.test");
    assert_eq!(profile.user.phone, stored.phone);
    assert_eq!(profile.user.class_name, stored.class_name);
}

#[tokio::test]
async fn profile_update_rejects_email_taken_case_insensitively() {
    let ctx = test_support::setup_test_context().await;
    let (_, teacher) = test_support::insert_teacher(ctx.state.db(), "first@school.test").await;
    test_support::insert_user(ctx.state.db(), "taken@school.test", "10A").await;

    let result = ctx
        .state
        .assessment()
        .update_teacher_profile(
            &teacher.id,
            ProfileChanges { email: Some("TAKEN@school.test".into()), ..ProfileChanges::default() },
        )
        .await;
    assert!(matches!(result, Err(AssessmentError::AlreadyExists(_))));

    let profile = ctx.state.assessment().get_teacher_profile(&teacher.id).await.expect("profile");
    assert_eq!(profile.user.email, "first@school.test");
}

#[tokio::test]
async fn attempt_and_submission_update_both_sides() {
    let ctx = test_support::setup_test_context().await;
    let service = ctx.state.assessment();
    let (_, teacher) = test_support::insert_teacher(ctx.state.db(), "owner@school.test").await;
    let (_, student) =
        test_support::insert_student(ctx.state.db(), "pupil@school.test", "10A").await;
    let test = service.create_test(midterm(&teacher.id)).await.expect("create");

    service.record_attempt(&test.id, &student.id).await.expect("attempt");
    service.record_attempt(&test.id, &student.id).await.expect("second attempt");
    service
        .record_submission(&test.id, &student.id, vec![json!({"question": 0, "answer": "a"})])
        .await
        .expect("submit");

    let again = service.record_submission(&test.id, &student.id, vec![]).await;
    assert!(matches!(again, Err(AssessmentError::AlreadyExists(_))));

    let stored = service.get_test(&test.id).await.expect("get");
    assert!(stored.attempted);
    assert_eq!(stored.submit_by.0, vec![student.id.clone()]);
    assert_eq!(stored.answers.0.len(), 1);
    assert_eq!(stored.answers.0[0]["student_id"], student.id.as_str());

    let student_row = repositories::students::find_by_id(ctx.state.db(), &student.id)
        .await
        .expect("student query")
        .expect("student");
    assert_eq!(student_row.attempted_tests.0, vec![test.id.clone()]);
    let statuses: Vec<&str> = student_row
        .test_status
        .0
        .iter()
        .map(|status| status["status"].as_str().expect("status"))
        .collect();
    assert_eq!(statuses, vec!["attempted", "attempted", "submitted"]);

    let listed = service.list_tests_for_teacher(&teacher.id).await.expect("list");
    assert_eq!(listed[0].submit_by, vec![student.id.clone()]);

    // Question edits stay possible after submissions.
    let updated = service
        .update_test_questions(&test.id, vec![json!({"question": "revised"})])
        .await
        .expect("update after submit");
    assert_eq!(updated.questions.0.len(), 1);

    service.delete_test(&test.id).await.expect("delete");
    assert!(matches!(
        service.record_submission(&test.id, &student.id, vec![]).await,
        Err(AssessmentError::NotFound("Test"))
    ));
    assert!(matches!(service.delete_test(&test.id).await, Err(AssessmentError::NotFound("Test"))));
}

#[tokio::test]
async fn attempt_by_unknown_student_leaves_test_untouched() {
    let ctx = test_support::setup_test_context().await;
    let service = ctx.state.assessment();
    let (_, teacher) = test_support::insert_teacher(ctx.state.db(), "untouched@school.test").await;
    let test = service.create_test(midterm(&teacher.id)).await.expect("create");

    let result = service.record_attempt(&test.id, "missing-student").await;
    assert!(matches!(result, Err(AssessmentError::NotFound("Student"))));

    let stored = service.get_test(&test.id).await.expect("get");
    assert!(!stored.attempted);
}

#[tokio::test]
async fn submission_without_attempt_counts_as_attempt() {
    let ctx = test_support::setup_test_context().await;
    let service = ctx.state.assessment();
    let (_, teacher) = test_support::insert_teacher(ctx.state.db(), "direct@school.test").await;
    let (_, student) =
        test_support::insert_student(ctx.state.db(), "direct-pupil@school.test", "10A").await;
    let test = service.create_test(midterm(&teacher.id)).await.expect("create");

    service
        .record_submission(&test.id, &student.id, vec![json!({"question": 0, "answer": "a"})])
        .await
        .expect("submit");

    let stored = service.get_test(&test.id).await.expect("get");
    assert!(stored.attempted);
    assert_eq!(stored.submit_by.0, vec![student.id.clone()]);

    let student_row = repositories::students::find_by_id(ctx.state.db(), &student.id)
        .await
        .expect("student query")
        .expect("student");
    assert_eq!(student_row.attempted_tests.0, vec![test.id.clone()]);
    assert_eq!(student_row.test_status.0.len(), 1);
    assert_eq!(student_row.test_status.0[0]["status"], "submitted");
}

#[tokio::test]
async fn attempt_after_submission_is_rejected() {
    let ctx = test_support::setup_test_context().await;
    let service = ctx.state.assessment();
    let (_, teacher) = test_support::insert_teacher(ctx.state.db(), "final@school.test").await;
    let (_, student) =
        test_support::insert_student(ctx.state.db(), "final-pupil@school.test", "10A").await;
    let test = service.create_test(midterm(&teacher.id)).await.expect("create");

    service.record_attempt(&test.id, &student.id).await.expect("attempt");
    service.record_submission(&test.id, &student.id, vec![]).await.expect("submit");

    let again = service.record_attempt(&test.id, &student.id).await;
    assert!(matches!(again, Err(AssessmentError::AlreadyExists(_))));

    let student_row = repositories::students::find_by_id(ctx.state.db(), &student.id)
        .await
        .expect("student query")
        .expect("student");
    let statuses: Vec<&str> = student_row
        .test_status
        .0
        .iter()
        .map(|status| status["status"].as_str().expect("status"))
        .collect();
    assert_eq!(statuses, vec!["attempted", "submitted"]);
}

#[tokio::test]
async fn padded_email_is_stored_trimmed() {
    let ctx = test_support::setup_test_context().await;
    let (_, teacher) = test_support::insert_teacher(ctx.state.db(), "padded@school.test").await;

    ctx.state
        .assessment()
        .update_teacher_profile(
            &teacher.id,
            ProfileChanges {
                email: Some(" grace@school.test ".into()),
                ..ProfileChanges::default()
            },
        )
        .await
        .expect("update profile");

    let profile = ctx.state.assessment().get_teacher_profile(&teacher.id).await.expect("profile");
    assert_eq!(profile.user.email, "grace@school.test");
}
