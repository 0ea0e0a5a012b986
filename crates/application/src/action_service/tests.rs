use std::sync::Arc;

use async_trait::async_trait;
use capatrack_core::{AppError, AppResult, OperationContext, UserIdentity};
use capatrack_domain::{Action, ActionPatch, Attachment, Record};
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Mutex;

use super::ActionService;
use crate::attachment_service::{AttachmentService, AttachmentUpload};
use crate::ports::{AttachmentFiles, RecordStore};

struct FakeStore<T> {
    items: Mutex<Vec<T>>,
}

impl<T> FakeStore<T> {
    fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for FakeStore<T> {
    async fn load(&self) -> Vec<T> {
        self.items.lock().await.clone()
    }

    async fn save(&self, items: &[T]) -> AppResult<()> {
        *self.items.lock().await = items.to_vec();
        Ok(())
    }
}

#[derive(Default)]
struct FakeFiles {
    removed: Mutex<Vec<String>>,
}

#[async_trait]
impl AttachmentFiles for FakeFiles {
    async fn store(&self, _action_id: u64, _stored_name: &str, _bytes: &[u8]) -> AppResult<()> {
        Ok(())
    }

    async fn read(&self, _action_id: u64, stored_name: &str) -> AppResult<Vec<u8>> {
        Err(AppError::NotFound(format!(
            "blob '{stored_name}' does not exist"
        )))
    }

    async fn remove(&self, _action_id: u64, stored_name: &str) -> AppResult<()> {
        self.removed.lock().await.push(stored_name.to_owned());
        Ok(())
    }
}

fn context_on(year: i32, month: u32, day: u32) -> OperationContext {
    let now = Utc
        .with_ymd_and_hms(year, month, day, 10, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH);
    OperationContext::new(UserIdentity::new("jnovak", "Jana Nováková"), now)
}

fn service() -> ActionService {
    let attachments = AttachmentService::new(
        Arc::new(FakeStore::<Attachment>::new()),
        Arc::new(FakeFiles::default()),
    );
    ActionService::new(Arc::new(FakeStore::<Action>::new()), attachments)
}

fn valid_patch() -> ActionPatch {
    ActionPatch {
        rating: Some("Neshoda".to_owned()),
        finding: Some("Chybí záznam o kalibraci".to_owned()),
        chapter: Some("7.1.5".to_owned()),
        process_owner: Some("Výroba".to_owned()),
        finding_date: Some("2024-01-10".to_owned()),
        ..ActionPatch::default()
    }
}

fn all_gates_set() -> ActionPatch {
    ActionPatch {
        status_plan: Some(true),
        status_do: Some(true),
        status_check: Some(true),
        status_act: Some(true),
        ..ActionPatch::default()
    }
}

#[tokio::test]
async fn create_assigns_id_number_and_audit_stamps() {
    let service = service();
    let context = context_on(2024, 1, 10);

    let first = service.create(&context, &valid_patch()).await;
    let second = service.create(&context, &valid_patch()).await;

    let first = first.unwrap_or_default();
    let second = second.unwrap_or_default();
    assert_eq!(first.id, 1);
    assert_eq!(first.number, 1);
    assert_eq!(second.id, 2);
    assert_eq!(second.number, 2);
    assert_eq!(first.created_by, "jnovak");
    assert_eq!(first.updated_by, "jnovak");
    assert!(!first.status_plan);
    assert!(!first.archived);
    assert!(first.completed_at.is_none());
}

#[tokio::test]
async fn create_ignores_archived_flag_from_input() {
    let service = service();
    let patch = ActionPatch {
        archived: Some(true),
        ..valid_patch()
    };

    let created = service.create(&context_on(2024, 1, 10), &patch).await;
    assert!(!created.unwrap_or_default().archived);
}

#[tokio::test]
async fn create_with_blank_required_field_persists_nothing() {
    let service = service();
    let patch = ActionPatch {
        process_owner: Some("   ".to_owned()),
        ..valid_patch()
    };

    let result = service.create(&context_on(2024, 1, 10), &patch).await;

    match result {
        Err(AppError::Validation(errors)) => {
            assert!(errors.get("process_owner").is_some());
        }
        _ => panic!("expected validation failure"),
    }
    assert!(service.get_all(true).await.is_empty());
}

#[tokio::test]
async fn update_keeps_fields_absent_from_the_patch() {
    let service = service();
    let context = context_on(2024, 1, 10);
    let created = service
        .create(&context, &valid_patch())
        .await
        .unwrap_or_default();

    let patch = ActionPatch {
        measure: Some("Doplnit kalibrační plán".to_owned()),
        ..ActionPatch::default()
    };
    let updated = service.update(&context, created.id, &patch).await;

    let updated = updated.unwrap_or_default();
    assert_eq!(updated.measure.as_deref(), Some("Doplnit kalibrační plán"));
    assert_eq!(updated.rating, "Neshoda");
    assert_eq!(updated.finding, "Chybí záznam o kalibraci");
    assert_eq!(updated.number, created.number);
}

#[tokio::test]
async fn update_of_unknown_id_is_not_found() {
    let service = service();
    let result = service
        .update(&context_on(2024, 1, 10), 99, &ActionPatch::default())
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn failed_update_validation_leaves_stored_state_alone() {
    let service = service();
    let context = context_on(2024, 1, 10);
    let created = service
        .create(&context, &valid_patch())
        .await
        .unwrap_or_default();

    let patch = ActionPatch {
        deadline: Some("brzy".to_owned()),
        measure: Some("změna".to_owned()),
        ..ActionPatch::default()
    };
    let result = service.update(&context, created.id, &patch).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let stored = service.find(created.id).await.unwrap_or_default();
    assert!(stored.deadline.is_none());
    assert!(stored.measure.is_none());
}

#[tokio::test]
async fn completing_all_gates_on_the_deadline_is_on_time() {
    let service = service();
    let context = context_on(2024, 1, 10);
    let patch = ActionPatch {
        deadline: Some("2024-01-10".to_owned()),
        ..valid_patch()
    };
    let created = service.create(&context, &patch).await.unwrap_or_default();

    let completed = service
        .update(&context, created.id, &all_gates_set())
        .await
        .unwrap_or_default();

    assert_eq!(completed.completed_at, Some(context.now()));
    assert_eq!(completed.on_time, Some(true));
    assert_eq!(completed.timeliness.as_deref(), Some("V termínu"));
}

#[tokio::test]
async fn one_day_overdue_uses_the_singular_form() {
    let service = service();
    let patch = ActionPatch {
        deadline: Some("2024-01-10".to_owned()),
        ..valid_patch()
    };
    let created = service
        .create(&context_on(2024, 1, 10), &patch)
        .await
        .unwrap_or_default();

    let completed = service
        .update(&context_on(2024, 1, 11), created.id, &all_gates_set())
        .await
        .unwrap_or_default();

    assert_eq!(completed.on_time, Some(false));
    assert_eq!(completed.timeliness.as_deref(), Some("Po termínu o 1 den"));
}

#[tokio::test]
async fn several_days_overdue_uses_the_plural_form() {
    let service = service();
    let patch = ActionPatch {
        deadline: Some("2024-01-10".to_owned()),
        ..valid_patch()
    };
    let created = service
        .create(&context_on(2024, 1, 10), &patch)
        .await
        .unwrap_or_default();

    let completed = service
        .update(&context_on(2024, 1, 15), created.id, &all_gates_set())
        .await
        .unwrap_or_default();

    assert_eq!(completed.timeliness.as_deref(), Some("Po termínu o 5 dní"));
}

#[tokio::test]
async fn completion_without_deadline_sets_no_timeliness() {
    let service = service();
    let context = context_on(2024, 1, 10);
    let created = service
        .create(&context, &valid_patch())
        .await
        .unwrap_or_default();

    let completed = service
        .update(&context, created.id, &all_gates_set())
        .await
        .unwrap_or_default();

    assert!(completed.completed_at.is_some());
    assert!(completed.on_time.is_none());
    assert!(completed.timeliness.is_none());
}

#[tokio::test]
async fn completion_is_a_one_way_latch() {
    let service = service();
    let first_context = context_on(2024, 1, 10);
    let patch = ActionPatch {
        deadline: Some("2024-01-10".to_owned()),
        ..valid_patch()
    };
    let created = service
        .create(&first_context, &patch)
        .await
        .unwrap_or_default();
    let completed = service
        .update(&first_context, created.id, &all_gates_set())
        .await
        .unwrap_or_default();

    let regress = ActionPatch {
        status_check: Some(false),
        ..ActionPatch::default()
    };
    let later_context = context_on(2024, 2, 20);
    let regressed = service
        .update(&later_context, created.id, &regress)
        .await
        .unwrap_or_default();
    assert!(!regressed.status_check);
    assert_eq!(regressed.completed_at, completed.completed_at);

    let restored = service
        .update(&later_context, created.id, &all_gates_set())
        .await
        .unwrap_or_default();
    assert_eq!(restored.completed_at, completed.completed_at);
    assert_eq!(restored.on_time, Some(true));
    assert_eq!(restored.timeliness.as_deref(), Some("V termínu"));
}

#[tokio::test]
async fn archive_hides_and_restore_reveals() {
    let service = service();
    let context = context_on(2024, 1, 10);
    let created = service
        .create(&context, &valid_patch())
        .await
        .unwrap_or_default();

    let archived = service.archive(&context, created.id).await;
    assert!(archived.is_some());
    assert!(service.get_all(false).await.is_empty());
    assert_eq!(service.get_all(true).await.len(), 1);
    assert_eq!(service.get_stats(&context).await.total_open, 0);

    let restored = service.restore(&context, created.id).await;
    assert!(restored.is_some());
    assert_eq!(service.get_all(false).await.len(), 1);
}

#[tokio::test]
async fn archive_of_missing_action_degrades_to_none() {
    let service = service();
    assert!(service.archive(&context_on(2024, 1, 10), 99).await.is_none());
}

#[tokio::test]
async fn get_all_sorts_by_number_descending() {
    let service = service();
    let context = context_on(2024, 1, 10);
    for _ in 0..3 {
        let _created = service.create(&context, &valid_patch()).await;
    }

    let numbers: Vec<u64> = service
        .get_all(false)
        .await
        .iter()
        .map(|action| action.number)
        .collect();
    assert_eq!(numbers, vec![3, 2, 1]);
}

#[tokio::test]
async fn delete_removes_the_record_and_its_attachments() {
    let attachment_store = Arc::new(FakeStore::<Attachment>::new());
    let files = Arc::new(FakeFiles::default());
    let attachments = AttachmentService::new(attachment_store, files.clone());
    let service = ActionService::new(Arc::new(FakeStore::<Action>::new()), attachments.clone());

    let context = context_on(2024, 1, 10);
    let created = service
        .create(&context, &valid_patch())
        .await
        .unwrap_or_default();
    let upload = AttachmentUpload {
        filename: "protokol.pdf".to_owned(),
        mime_type: "application/pdf".to_owned(),
        description: String::new(),
        bytes: vec![1, 2, 3],
    };
    let _stored = attachments.store(&context, created.id, upload).await;

    let removed = service.delete(created.id).await;
    assert!(removed.unwrap_or(false));
    assert!(service.find(created.id).await.is_none());
    assert!(attachments.get_for_action(created.id).await.is_empty());
    assert_eq!(files.removed.lock().await.len(), 1);
}

#[tokio::test]
async fn delete_of_missing_action_reports_false() {
    let service = service();
    let removed = service.delete(42).await;
    assert!(!removed.unwrap_or(true));
}

#[tokio::test]
async fn stats_count_overdue_and_week_boundaries() {
    let service = service();
    let context = context_on(2024, 1, 10);

    let overdue = ActionPatch {
        deadline: Some("2024-01-09".to_owned()),
        ..valid_patch()
    };
    let on_boundary = ActionPatch {
        deadline: Some("2024-01-17".to_owned()),
        ..valid_patch()
    };
    let beyond_boundary = ActionPatch {
        deadline: Some("2024-01-18".to_owned()),
        ..valid_patch()
    };
    let _first = service.create(&context, &overdue).await;
    let _second = service.create(&context, &on_boundary).await;
    let _third = service.create(&context, &beyond_boundary).await;

    let stats = service.get_stats(&context).await;
    assert_eq!(stats.total_open, 3);
    assert_eq!(stats.overdue, 1);
    assert_eq!(stats.due_this_week, 1);
    assert_eq!(stats.completed_this_month, 0);
}

#[tokio::test]
async fn stats_count_completions_in_the_current_month_only() {
    let service = service();
    let january = context_on(2024, 1, 10);
    let created = service
        .create(&january, &valid_patch())
        .await
        .unwrap_or_default();
    let _completed = service.update(&january, created.id, &all_gates_set()).await;

    let in_january = service.get_stats(&january).await;
    assert_eq!(in_january.completed_this_month, 1);

    let in_february = service.get_stats(&context_on(2024, 2, 1)).await;
    assert_eq!(in_february.completed_this_month, 0);
}

#[tokio::test]
async fn completed_actions_are_not_due_or_overdue() {
    let service = service();
    let context = context_on(2024, 1, 10);
    let patch = ActionPatch {
        deadline: Some("2024-01-12".to_owned()),
        ..valid_patch()
    };
    let created = service.create(&context, &patch).await.unwrap_or_default();
    let _completed = service.update(&context, created.id, &all_gates_set()).await;

    let stats = service.get_stats(&context).await;
    assert_eq!(stats.due_this_week, 0);
    assert_eq!(stats.overdue, 0);
    assert_eq!(stats.completed_this_month, 1);
}
