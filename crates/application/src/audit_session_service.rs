use std::collections::BTreeMap;
use std::sync::Arc;

use capatrack_core::{AppError, AppResult, OperationContext};
use capatrack_domain::{Action, AuditSession, AuditSessionPatch, Record, find_index_by_id, next_record_id};
use tracing::info;

use crate::ports::RecordStore;
use crate::record_service::RecordService;

/// Grouping of actions by the audit event that produced them.
///
/// Reads of the action collection go through the store directly, not the
/// action service, so archived actions stay visible in session views.
#[derive(Clone)]
pub struct AuditSessionService {
    records: RecordService<AuditSession>,
    actions: Arc<dyn RecordStore<Action>>,
}

impl AuditSessionService {
    /// Creates an audit session service over the two collection stores.
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore<AuditSession>>,
        actions: Arc<dyn RecordStore<Action>>,
    ) -> Self {
        Self {
            records: RecordService::new(store),
            actions,
        }
    }

    /// Returns all sessions sorted by audit date descending.
    pub async fn get_all(&self) -> Vec<AuditSession> {
        let mut sessions = self.records.get_all().await;
        sessions.sort_by(|left, right| right.date.cmp(&left.date));
        sessions
    }

    /// Finds a session by id.
    pub async fn find(&self, id: u64) -> Option<AuditSession> {
        self.records.find(id).await
    }

    /// Creates a new audit session from externally supplied fields.
    pub async fn create(
        &self,
        context: &OperationContext,
        patch: &AuditSessionPatch,
    ) -> AppResult<AuditSession> {
        let mut session = AuditSession::default();
        patch.apply(&mut session);
        session.validate().into_result()?;

        let created = self
            .records
            .mutate(|sessions| {
                session.assign_id(next_record_id(sessions));
                session.touch_created(context);
                session.touch_updated(context);
                sessions.push(session.clone());
                Ok(session.clone())
            })
            .await?;

        info!(id = created.id, "audit session created");
        Ok(created)
    }

    /// Applies a partial update to an existing session.
    pub async fn update(
        &self,
        context: &OperationContext,
        id: u64,
        patch: &AuditSessionPatch,
    ) -> AppResult<AuditSession> {
        self.records
            .mutate(|sessions| {
                let index = find_index_by_id(sessions, id).ok_or_else(|| {
                    AppError::NotFound("Auditní sezení nebylo nalezeno.".to_owned())
                })?;

                let mut session = sessions[index].clone();
                patch.apply(&mut session);
                session.validate().into_result()?;
                session.touch_updated(context);

                sessions[index] = session.clone();
                Ok(session)
            })
            .await
    }

    /// Deletes a session without touching the actions that reference it.
    ///
    /// Dangling `audit_session_id` values on actions are tolerated.
    pub async fn delete(&self, id: u64) -> AppResult<bool> {
        self.records.delete(id).await
    }

    /// Returns every action of one session, archived included, sorted by
    /// business number descending.
    pub async fn get_actions_for_session(&self, session_id: u64) -> Vec<Action> {
        let mut actions: Vec<Action> = self
            .actions
            .load()
            .await
            .into_iter()
            .filter(|action| action.audit_session_id == Some(session_id))
            .collect();
        actions.sort_by(|left, right| right.number.cmp(&left.number));
        actions
    }

    /// Counts actions per session in a single pass, archived included.
    pub async fn get_action_counts(&self) -> BTreeMap<u64, usize> {
        let mut counts = BTreeMap::new();
        for action in self.actions.load().await {
            if let Some(session_id) = action.audit_session_id {
                *counts.entry(session_id).or_insert(0) += 1;
            }
        }
        counts
    }
}
