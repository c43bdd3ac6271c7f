//! Read/write path for tests and the teacher/student profiles they touch.
//!
//! Each operation is one statement, or one short transaction when a student
//! profile and a test change together. Uniqueness and set semantics are enforced
//! by the database (unique constraint on `(test_name, class_name, category)`,
//! a single-statement union on `assigned_to`) so concurrent callers converge
//! without any coordination in this process. Nothing is retried here.

mod error;
mod types;

#[cfg(test)]
mod tests;

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::core::metrics;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::db::models::{Student, Test};
use crate::repositories;

pub(crate) use error::AssessmentError;
pub(crate) use types::{normalize_class_names, NewTest, ProfileChanges, TeacherProfile, TestListing};

pub(crate) type AssessmentResult<T> = Result<T, AssessmentError>;

#[derive(Clone)]
pub(crate) struct AssessmentService {
    db: PgPool,
}

impl AssessmentService {
    pub(crate) fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub(crate) async fn list_tests_for_teacher(
        &self,
        teacher_id: &str,
    ) -> AssessmentResult<Vec<TestListing>> {
        let result: AssessmentResult<Vec<TestListing>> = async {
            if !repositories::teachers::exists(&self.db, teacher_id).await? {
                return Err(AssessmentError::NotFound("Teacher"));
            }

            let rows = repositories::tests::list_summaries_by_teacher(&self.db, teacher_id).await?;
            Ok(rows.into_iter().map(TestListing::from).collect())
        }
        .await;

        observe("list_tests_for_teacher", result)
    }

    pub(crate) async fn list_distinct_class_names(&self) -> AssessmentResult<Vec<String>> {
        let result = repositories::users::list_distinct_class_names(&self.db)
            .await
            .map_err(AssessmentError::from);

        observe("list_distinct_class_names", result)
    }

    pub(crate) async fn get_teacher_profile(
        &self,
        profile_id: &str,
    ) -> AssessmentResult<TeacherProfile> {
        let result = repositories::teachers::find_with_user(&self.db, profile_id)
            .await
            .map_err(AssessmentError::from)
            .and_then(|profile| profile.ok_or(AssessmentError::NotFound("Teacher")));

        observe("get_teacher_profile", result)
    }

    pub(crate) async fn get_test(&self, test_id: &str) -> AssessmentResult<Test> {
        let result = repositories::tests::find_by_id(&self.db, test_id)
            .await
            .map_err(AssessmentError::from)
            .and_then(|test| test.ok_or(AssessmentError::NotFound("Test")));

        observe("get_test", result)
    }

    pub(crate) async fn create_test(&self, new_test: NewTest) -> AssessmentResult<Test> {
        let result = self.insert_test(new_test).await;
        observe("create_test", result)
    }

    async fn insert_test(&self, new_test: NewTest) -> AssessmentResult<Test> {
        new_test.validate()?;

        if !repositories::teachers::exists(&self.db, &new_test.teacher_id).await? {
            return Err(AssessmentError::NotFound("Teacher"));
        }

        let NewTest {
            teacher_id,
            test_name,
            category,
            class_name,
            minutes,
            rules,
            out_of_marks,
            questions,
        } = new_test;

        let test_id = Uuid::new_v4().to_string();
        let conflict = format!(
            "Test '{test_name}' already exists for class '{class_name}' in category '{category}'"
        );

        let created = repositories::tests::insert_if_absent(
            &self.db,
            repositories::tests::CreateTest {
                id: &test_id,
                teacher_id: &teacher_id,
                test_name: &test_name,
                category: &category,
                class_name: &class_name,
                minutes,
                rules: &rules,
                out_of_marks,
                questions,
                created_at: primitive_now_utc(),
            },
        )
        .await
        .map_err(|err| AssessmentError::from_write(err, &conflict, "Teacher"))?;

        let Some(test) = created else {
            return Err(AssessmentError::AlreadyExists(conflict));
        };

        tracing::info!(
            teacher_id = %test.teacher_id,
            test_id = %test.id,
            action = "test_create",
            "Test created"
        );

        Ok(test)
    }

    /// Replaces the question list. Deliberately allowed on tests that are already
    /// attempted or submitted.
    pub(crate) async fn update_test_questions(
        &self,
        test_id: &str,
        questions: Vec<serde_json::Value>,
    ) -> AssessmentResult<Test> {
        let result: AssessmentResult<Test> = async {
            if questions.is_empty() {
                return Err(AssessmentError::InvalidInput(
                    "questions must not be empty".to_string(),
                ));
            }

            let updated = repositories::tests::replace_questions(
                &self.db,
                test_id,
                questions,
                primitive_now_utc(),
            )
            .await?
            .ok_or(AssessmentError::NotFound("Test"))?;

            if updated.attempted {
                tracing::warn!(
                    test_id = %updated.id,
                    action = "test_update_questions",
                    "Questions replaced on a test that students have already attempted"
                );
            } else {
                tracing::info!(
                    test_id = %updated.id,
                    action = "test_update_questions",
                    "Test questions updated"
                );
            }

            Ok(updated)
        }
        .await;

        observe("update_test_questions", result)
    }

    pub(crate) async fn update_teacher_profile(
        &self,
        profile_id: &str,
        changes: ProfileChanges,
    ) -> AssessmentResult<()> {
        let result: AssessmentResult<()> = async {
            let changes = changes.trimmed();
            changes.validate()?;

            let ProfileChanges { first_name, last_name, email, phone, password_hash } = changes;
            let params = repositories::users::UpdateProfile {
                first_name,
                last_name,
                email,
                phone,
                password: password_hash,
            };

            let touched = repositories::users::update_for_teacher(&self.db, profile_id, params)
                .await
                .map_err(|err| {
                    AssessmentError::from_write(
                        err,
                        "Email or phone is already used by another account",
                        "Teacher",
                    )
                })?;

            if touched == 0 {
                return Err(AssessmentError::NotFound("Teacher"));
            }

            tracing::info!(
                teacher_id = %profile_id,
                action = "teacher_profile_update",
                "Teacher profile updated"
            );
            Ok(())
        }
        .await;

        observe("update_teacher_profile", result)
    }

    /// Unions the whole batch into `assigned_to` or changes nothing. Returns the
    /// resulting set in sorted order.
    pub(crate) async fn assign_test_to_classes(
        &self,
        test_id: &str,
        class_names: &[String],
    ) -> AssessmentResult<Vec<String>> {
        let result: AssessmentResult<Vec<String>> = async {
            let names = normalize_class_names(class_names).map_err(AssessmentError::InvalidInput)?;

            let assigned =
                repositories::tests::union_assigned_to(&self.db, test_id, &names, primitive_now_utc())
                    .await?
                    .ok_or(AssessmentError::NotFound("Test"))?;

            tracing::info!(
                test_id = %test_id,
                requested = names.len(),
                assigned = assigned.len(),
                action = "test_assign",
                "Test assigned to classes"
            );
            Ok(assigned)
        }
        .await;

        observe("assign_test_to_classes", result)
    }

    pub(crate) async fn delete_test(&self, test_id: &str) -> AssessmentResult<()> {
        let result: AssessmentResult<()> = async {
            let deleted = repositories::tests::delete_by_id(&self.db, test_id).await?;
            if deleted == 0 {
                return Err(AssessmentError::NotFound("Test"));
            }

            tracing::info!(test_id = %test_id, action = "test_delete", "Test deleted");
            Ok(())
        }
        .await;

        observe("delete_test", result)
    }

    pub(crate) async fn student_for_user(&self, user_id: &str) -> AssessmentResult<Student> {
        repositories::students::find_by_user_id(&self.db, user_id)
            .await?
            .ok_or(AssessmentError::NotFound("Student profile"))
    }

    /// Marks the test as attempted and records the attempt on the student profile.
    pub(crate) async fn record_attempt(
        &self,
        test_id: &str,
        student_id: &str,
    ) -> AssessmentResult<()> {
        let result: AssessmentResult<()> = async {
            let mut tx = self.db.begin().await?;

            // Test before student, same as record_submission, so the two never deadlock.
            if repositories::tests::lock_by_id(&mut *tx, test_id).await?.is_none() {
                return Err(AssessmentError::NotFound("Test"));
            }
            // Submitted is terminal for a student.
            if repositories::tests::is_submitted_by(&mut *tx, test_id, student_id).await? {
                return Err(AssessmentError::AlreadyExists(
                    "Test already submitted by this student".to_string(),
                ));
            }

            let now = primitive_now_utc();
            let status = json!({
                "test_id": test_id,
                "status": "attempted",
                "at": format_primitive(now),
            });

            let touched =
                repositories::students::record_progress(&mut *tx, student_id, test_id, status)
                    .await?;
            if touched == 0 {
                return Err(AssessmentError::NotFound("Student"));
            }

            repositories::tests::mark_attempted(&mut *tx, test_id, now).await?;
            tx.commit().await?;

            tracing::info!(
                test_id = %test_id,
                student_id = %student_id,
                action = "test_attempt",
                "Test attempt recorded"
            );
            Ok(())
        }
        .await;

        observe("record_attempt", result)
    }

    /// Appends the student's answers and adds them to `submit_by`. A submission
    /// without an earlier attempt counts as the attempt. A second submission by the
    /// same student is rejected.
    pub(crate) async fn record_submission(
        &self,
        test_id: &str,
        student_id: &str,
        answers: Vec<serde_json::Value>,
    ) -> AssessmentResult<()> {
        let result: AssessmentResult<()> = async {
            let mut tx = self.db.begin().await?;

            if repositories::tests::lock_by_id(&mut *tx, test_id).await?.is_none() {
                return Err(AssessmentError::NotFound("Test"));
            }
            if repositories::students::lock_by_id(&mut *tx, student_id).await?.is_none() {
                return Err(AssessmentError::NotFound("Student"));
            }

            let now = primitive_now_utc();
            let submitted_at = format_primitive(now);
            let answer = json!({
                "student_id": student_id,
                "answers": answers,
                "submitted_at": submitted_at,
            });

            let appended =
                repositories::tests::append_submission(&mut *tx, test_id, student_id, answer, now)
                    .await?;
            if !appended {
                return Err(AssessmentError::AlreadyExists(
                    "Test already submitted by this student".to_string(),
                ));
            }

            let status = json!({
                "test_id": test_id,
                "status": "submitted",
                "at": submitted_at,
            });
            repositories::students::record_progress(&mut *tx, student_id, test_id, status).await?;
            tx.commit().await?;

            tracing::info!(
                test_id = %test_id,
                student_id = %student_id,
                action = "test_submit",
                "Test submission recorded"
            );
            Ok(())
        }
        .await;

        observe("record_submission", result)
    }
}

fn observe<T>(operation: &'static str, result: AssessmentResult<T>) -> AssessmentResult<T> {
    match &result {
        Ok(_) => metrics::record_operation(operation, "ok"),
        Err(err) => {
            metrics::record_operation(operation, err.kind());
            if let AssessmentError::StoreUnavailable(source) = err {
                tracing::error!(error = %source, operation, "Assessment store unavailable");
            }
        }
    }
    result
}
