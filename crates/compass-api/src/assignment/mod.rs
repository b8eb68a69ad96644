//! Who may move an assignment where, and the conditional update that applies it.

use compass_db::{
    models::{Assignment, AssignmentStatus},
    repositories::assignment as assignment_repo,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Mentor,
    Admin,
}

impl Actor {
    /// Mentors accept, reject and complete. Admins cancel and complete.
    pub const fn may_set(self, next: AssignmentStatus) -> bool {
        match self {
            Self::Mentor => matches!(
                next,
                AssignmentStatus::Active | AssignmentStatus::Rejected | AssignmentStatus::Completed
            ),
            Self::Admin => matches!(
                next,
                AssignmentStatus::Cancelled | AssignmentStatus::Completed
            ),
        }
    }
}

/// Check a requested change without touching the database.
///
/// Actor permission is checked before the state machine, so a mentor asking for
/// `cancelled` gets 403 regardless of the current status.
pub fn check_transition(
    actor: Actor,
    current: AssignmentStatus,
    next: AssignmentStatus,
) -> Result<(), ApiError> {
    if !actor.may_set(next) {
        return Err(ApiError::Forbidden(format!(
            "Not allowed to set an assignment to {next}"
        )));
    }

    if !current.is_live() {
        return Err(ApiError::Conflict(format!(
            "Assignment is already {current}"
        )));
    }

    if !current.can_transition_to(next) {
        return Err(ApiError::Conflict(format!(
            "Cannot move assignment from {current} to {next}"
        )));
    }

    Ok(())
}

/// Apply a transition to an assignment already loaded by the caller.
///
/// The update only matches while the row still has the status that was read,
/// so a concurrent change surfaces as 409 instead of being overwritten.
pub async fn apply_transition(
    pool: &PgPool,
    actor: Actor,
    assignment: &Assignment,
    next: AssignmentStatus,
    notes: Option<&str>,
) -> Result<Assignment, ApiError> {
    check_transition(actor, assignment.status, next)?;

    let updated =
        assignment_repo::transition_status(pool, assignment.id, assignment.status, next, notes)
            .await?
            .ok_or_else(|| {
                ApiError::Conflict("Assignment was changed concurrently, reload and retry".to_string())
            })?;

    tracing::info!(
        assignment_id = %updated.id,
        from = %assignment.status,
        to = %updated.status,
        actor = ?actor,
        "Assignment status changed"
    );

    Ok(updated)
}

/// Load an assignment, 404 when it does not exist.
pub async fn load(pool: &PgPool, assignment_id: Uuid) -> Result<Assignment, ApiError> {
    assignment_repo::find_by_id(pool, assignment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))
}
