use std::sync::Arc;

use capatrack_core::{AppError, AppResult, OperationContext};
use capatrack_domain::{Action, ActionPatch, ActionStats, Record, find_index_by_id, next_record_id};
use chrono::{Datelike, NaiveDate, TimeDelta};
use tracing::{debug, info, warn};

use crate::attachment_service::AttachmentService;
use crate::ports::RecordStore;
use crate::record_service::RecordService;

/// Lifecycle of audit findings and their corrective measures.
///
/// Owns the sequential business numbering, the PDCA completion latch,
/// timeliness computation, soft archival and the dashboard aggregates.
#[derive(Clone)]
pub struct ActionService {
    records: RecordService<Action>,
    attachments: AttachmentService,
}

impl ActionService {
    /// Creates an action service over a record store.
    ///
    /// The attachment service is needed because deleting an action also
    /// deletes its attachments.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore<Action>>, attachments: AttachmentService) -> Self {
        Self {
            records: RecordService::new(store),
            attachments,
        }
    }

    /// Returns actions sorted by business number descending.
    ///
    /// Archived records are excluded unless explicitly requested.
    pub async fn get_all(&self, include_archived: bool) -> Vec<Action> {
        let mut actions = self.records.get_all().await;
        if !include_archived {
            actions.retain(|action| !action.archived);
        }
        actions.sort_by(|left, right| right.number.cmp(&left.number));
        actions
    }

    /// Finds an action by id, archived or not.
    pub async fn find(&self, id: u64) -> Option<Action> {
        self.records.find(id).await
    }

    /// Creates a new action from externally supplied fields.
    ///
    /// Validation failures carry the full field-to-message map and leave
    /// the collection untouched. The id and the business number are both
    /// assigned from the locked snapshot.
    pub async fn create(
        &self,
        context: &OperationContext,
        patch: &ActionPatch,
    ) -> AppResult<Action> {
        let mut action = Action::default();
        patch.apply(&mut action);
        action.validate().into_result()?;

        let created = self
            .records
            .mutate(|actions| {
                action.assign_id(next_record_id(actions));
                action.number = next_number(actions);
                action.touch_created(context);
                action.touch_updated(context);
                action.archived = false;
                action.completed_at = None;
                action.on_time = None;
                action.timeliness = None;
                actions.push(action.clone());
                Ok(action.clone())
            })
            .await?;

        info!(id = created.id, number = created.number, "action created");
        Ok(created)
    }

    /// Applies a partial update to an existing action.
    ///
    /// Fields absent from the patch keep their stored values; validation
    /// runs over the merged state, so omitting a required field is fine as
    /// long as the stored value is valid. Setting the last open PDCA gate
    /// latches completion.
    pub async fn update(
        &self,
        context: &OperationContext,
        id: u64,
        patch: &ActionPatch,
    ) -> AppResult<Action> {
        let updated = self
            .records
            .mutate(|actions| {
                let index = find_index_by_id(actions, id)
                    .ok_or_else(|| AppError::NotFound("Akce nebyla nalezena.".to_owned()))?;

                let mut action = actions[index].clone();
                patch.apply(&mut action);
                action.validate().into_result()?;
                action.touch_updated(context);
                check_completion(&mut action, context);

                actions[index] = action.clone();
                Ok(action)
            })
            .await?;

        debug!(id, "action updated");
        Ok(updated)
    }

    /// Physically deletes an action together with its attachments.
    pub async fn delete(&self, id: u64) -> AppResult<bool> {
        let removed = self.records.delete(id).await?;
        if removed {
            if let Err(error) = self.attachments.delete_for_action(id).await {
                warn!(%error, action_id = id, "failed to remove attachments of deleted action");
            }
            info!(id, "action deleted");
        }
        Ok(removed)
    }

    /// Archives an action; failures degrade to `None`.
    pub async fn archive(&self, context: &OperationContext, id: u64) -> Option<Action> {
        self.set_archived(context, id, true).await
    }

    /// Restores an archived action; failures degrade to `None`.
    pub async fn restore(&self, context: &OperationContext, id: u64) -> Option<Action> {
        self.set_archived(context, id, false).await
    }

    /// Computes dashboard aggregates over the non-archived collection.
    pub async fn get_stats(&self, context: &OperationContext) -> ActionStats {
        let actions = self.get_all(false).await;
        let today = context.today();
        let week_ahead = today + TimeDelta::days(7);

        let mut stats = ActionStats {
            total_open: actions.len(),
            ..ActionStats::default()
        };

        for action in &actions {
            let deadline = action
                .deadline
                .as_deref()
                .and_then(|deadline| NaiveDate::parse_from_str(deadline, "%Y-%m-%d").ok());

            if action.completed_at.is_none()
                && let Some(deadline) = deadline
            {
                if deadline < today {
                    stats.overdue += 1;
                }
                if deadline >= today && deadline <= week_ahead {
                    stats.due_this_week += 1;
                }
            }

            if let Some(completed_at) = action.completed_at {
                let completed = completed_at.date_naive();
                if completed.year() == today.year() && completed.month() == today.month() {
                    stats.completed_this_month += 1;
                }
            }
        }

        stats
    }

    async fn set_archived(
        &self,
        context: &OperationContext,
        id: u64,
        archived: bool,
    ) -> Option<Action> {
        let patch = ActionPatch {
            archived: Some(archived),
            ..ActionPatch::default()
        };

        match self.update(context, id, &patch).await {
            Ok(action) => Some(action),
            Err(error) => {
                debug!(%error, id, archived, "archive toggle failed");
                None
            }
        }
    }
}

/// Next business-visible sequence number for a collection snapshot.
fn next_number(actions: &[Action]) -> u64 {
    actions
        .iter()
        .map(|action| action.number)
        .max()
        .map_or(1, |max| max + 1)
}

/// Latches completion once all four PDCA gates are set.
///
/// `completed_at` is set at most once; regressing a gate afterwards never
/// clears it, `on_time` or `timeliness`. Without a deadline the timeliness
/// fields stay unset.
fn check_completion(action: &mut Action, context: &OperationContext) {
    if !action.pdca_complete() || action.completed_at.is_some() {
        return;
    }

    action.completed_at = Some(context.now());

    let Some(deadline) = action
        .deadline
        .as_deref()
        .and_then(|deadline| NaiveDate::parse_from_str(deadline, "%Y-%m-%d").ok())
    else {
        return;
    };

    let today = context.today();
    let on_time = today <= deadline;
    action.on_time = Some(on_time);
    action.timeliness = Some(if on_time {
        "V termínu".to_owned()
    } else {
        delay_message(deadline, today)
    });
}

/// Renders the overdue verdict, with the one-day singular form.
fn delay_message(deadline: NaiveDate, today: NaiveDate) -> String {
    let days = (today - deadline).num_days();
    if days == 1 {
        "Po termínu o 1 den".to_owned()
    } else {
        format!("Po termínu o {days} dní")
    }
}

#[cfg(test)]
mod tests;
