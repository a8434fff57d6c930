//! Card lifecycle rules.
//!
//! Each `plan_*` function checks the preconditions of one engine operation
//! against a freshly loaded card and returns the mutations that carry it out.
//! Nothing here touches storage; `services::CardService` applies the plan
//! inside a unit of work.
//!
//! ```text
//! INITIAL/PENDING --move--> INITIAL/PENDING | FINAL   (not blocked)
//! INITIAL/PENDING --block-> blocked                   (not blocked)
//! blocked         --unblock-> not blocked
//! non-terminal    --cancel--> CANCEL, block closed with "cancelled"
//! ```

use chrono::{DateTime, Utc};

use crate::domain::{Card, Column, ColumnKind, ColumnTopology, KanbanError, Mutation};

pub const CANCEL_UNBLOCK_REASON: &str = "cancelled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub card_id: i64,
    pub from_column: i64,
    pub mutations: Vec<Mutation>,
}

impl Transition {
    fn new(card: &Card) -> Self {
        Self {
            card_id: card.id,
            from_column: card.column_id,
            mutations: Vec::new(),
        }
    }

    fn with(mut self, mutation: Mutation) -> Self {
        self.mutations.push(mutation);
        self
    }

    /// Column the card ends up in once every mutation is applied.
    pub fn to_column(&self) -> i64 {
        self.mutations
            .iter()
            .rev()
            .find_map(|m| match m {
                Mutation::MoveTo { column_id } => Some(*column_id),
                _ => None,
            })
            .unwrap_or(self.from_column)
    }
}

/// Rejects empty or whitespace-only required text.
pub fn require_text(field: &str, value: &str) -> Result<(), KanbanError> {
    if value.trim().is_empty() {
        return Err(KanbanError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn current_column<'t>(card: &Card, topology: &'t ColumnTopology) -> Result<&'t Column, KanbanError> {
    topology.column(card.column_id).ok_or_else(|| {
        tracing::debug!(
            card_id = card.id,
            column_id = card.column_id,
            board_id = topology.board_id(),
            "Card column is not part of board"
        );
        KanbanError::CardNotFound(card.id)
    })
}

pub fn plan_move(card: &Card, topology: &ColumnTopology) -> Result<Transition, KanbanError> {
    let current = current_column(card, topology)?;

    if current.kind == ColumnKind::Cancel {
        return Err(KanbanError::CardInFinalOrCancel {
            card_id: card.id,
            kind: current.kind,
        });
    }
    if card.blocked {
        return Err(KanbanError::CardBlocked(card.id));
    }

    let next = topology
        .next_column(current)
        .ok_or(KanbanError::NoNextColumn(card.id))?;

    Ok(Transition::new(card).with(Mutation::MoveTo { column_id: next.id }))
}

pub fn plan_block(
    card: &Card,
    reason: &str,
    topology: &ColumnTopology,
    now: DateTime<Utc>,
) -> Result<Transition, KanbanError> {
    let current = current_column(card, topology)?;

    if card.blocked {
        return Err(KanbanError::CardAlreadyBlocked(card.id));
    }
    if current.kind.is_terminal() {
        return Err(KanbanError::CardInFinalOrCancel {
            card_id: card.id,
            kind: current.kind,
        });
    }
    require_text("block reason", reason)?;

    Ok(Transition::new(card).with(Mutation::OpenBlock {
        at: now,
        reason: reason.to_string(),
    }))
}

pub fn plan_unblock(
    card: &Card,
    reason: &str,
    topology: &ColumnTopology,
    now: DateTime<Utc>,
) -> Result<Transition, KanbanError> {
    current_column(card, topology)?;

    if !card.blocked {
        return Err(KanbanError::CardNotBlocked(card.id));
    }
    require_text("unblock reason", reason)?;

    Ok(Transition::new(card).with(Mutation::CloseBlock {
        at: now,
        reason: reason.to_string(),
    }))
}

/// Cancellation overrides blocking: an open block is closed first.
///
/// `cancel_column_id` comes from the caller and must name the board's
/// CANCEL column.
pub fn plan_cancel(
    card: &Card,
    cancel_column_id: i64,
    topology: &ColumnTopology,
    now: DateTime<Utc>,
) -> Result<Transition, KanbanError> {
    let current = current_column(card, topology)?;

    if current.kind.is_terminal() {
        return Err(KanbanError::CardInFinalOrCancel {
            card_id: card.id,
            kind: current.kind,
        });
    }

    let cancel = topology.cancel_column();
    if cancel.id != cancel_column_id {
        return Err(KanbanError::Validation(format!(
            "column {} is not the cancel column of board {}",
            cancel_column_id,
            topology.board_id()
        )));
    }

    let mut transition = Transition::new(card);
    if card.blocked {
        transition = transition.with(Mutation::CloseBlock {
            at: now,
            reason: CANCEL_UNBLOCK_REASON.to_string(),
        });
    }
    Ok(transition.with(Mutation::MoveTo { column_id: cancel.id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::topology::tests::simple_board;

    fn card_in(column_id: i64) -> Card {
        Card {
            id: 1,
            title: "Write report".into(),
            description: "Quarterly numbers".into(),
            column_id,
            blocked: false,
            block_history: vec![],
        }
    }

    fn apply(card: &mut Card, transition: &Transition) {
        for mutation in &transition.mutations {
            card.apply(mutation);
        }
    }

    #[test]
    fn move_advances_along_the_path_until_final() {
        let topology = simple_board();
        let mut card = card_in(topology.initial_column().id);

        let first = plan_move(&card, &topology).unwrap();
        assert_eq!(first.to_column(), 11);
        apply(&mut card, &first);

        let second = plan_move(&card, &topology).unwrap();
        apply(&mut card, &second);
        assert_eq!(card.column_id, topology.final_column().id);

        assert!(matches!(
            plan_move(&card, &topology),
            Err(KanbanError::NoNextColumn(1))
        ));
    }

    #[test]
    fn blocked_card_cannot_move() {
        let topology = simple_board();
        let mut card = card_in(10);
        let transition = plan_block(&card, "waiting", &topology, Utc::now()).unwrap();
        apply(&mut card, &transition);

        assert!(matches!(
            plan_move(&card, &topology),
            Err(KanbanError::CardBlocked(1))
        ));
    }

    #[test]
    fn block_preconditions_in_order() {
        let topology = simple_board();
        let now = Utc::now();

        let mut blocked = card_in(10);
        let transition = plan_block(&blocked, "first", &topology, now).unwrap();
        apply(&mut blocked, &transition);
        assert!(matches!(
            plan_block(&blocked, "", &topology, now),
            Err(KanbanError::CardAlreadyBlocked(1))
        ));

        for terminal in [12, 13] {
            assert!(matches!(
                plan_block(&card_in(terminal), "", &topology, now),
                Err(KanbanError::CardInFinalOrCancel { .. })
            ));
        }

        assert!(matches!(
            plan_block(&card_in(11), "   ", &topology, now),
            Err(KanbanError::Validation(_))
        ));
    }

    #[test]
    fn unblock_requires_block_and_reason() {
        let topology = simple_board();
        let now = Utc::now();
        let mut card = card_in(10);

        assert!(matches!(
            plan_unblock(&card, "done", &topology, now),
            Err(KanbanError::CardNotBlocked(1))
        ));

        let transition = plan_block(&card, "held", &topology, now).unwrap();

        apply(&mut card, &transition);
        assert!(matches!(
            plan_unblock(&card, "", &topology, now),
            Err(KanbanError::Validation(_))
        ));

        let transition = plan_unblock(&card, "released", &topology, now).unwrap();

        apply(&mut card, &transition);
        assert!(!card.blocked);
        assert_eq!(card.block_history.len(), 1);
        assert!(card.block_history[0].unblocked_at.is_some());
    }

    #[test]
    fn cancel_closes_open_block_and_moves_to_cancel() {
        let topology = simple_board();
        let now = Utc::now();
        let mut card = card_in(11);
        let transition = plan_block(&card, "stuck", &topology, now).unwrap();
        apply(&mut card, &transition);

        let transition = plan_cancel(&card, 13, &topology, now).unwrap();
        assert_eq!(transition.mutations.len(), 2);
        apply(&mut card, &transition);

        assert_eq!(card.column_id, 13);
        assert!(!card.blocked);
        assert_eq!(
            card.block_history[0].unblock_reason.as_deref(),
            Some(CANCEL_UNBLOCK_REASON)
        );

        assert!(matches!(
            plan_move(&card, &topology),
            Err(KanbanError::CardInFinalOrCancel { kind: ColumnKind::Cancel, .. })
        ));
        assert!(matches!(
            plan_block(&card, "again", &topology, now),
            Err(KanbanError::CardInFinalOrCancel { .. })
        ));
        assert!(matches!(
            plan_cancel(&card, 13, &topology, now),
            Err(KanbanError::CardInFinalOrCancel { .. })
        ));
    }

    #[test]
    fn cancel_rejects_a_column_that_is_not_the_cancel_column() {
        let topology = simple_board();
        assert!(matches!(
            plan_cancel(&card_in(10), 12, &topology, Utc::now()),
            Err(KanbanError::Validation(_))
        ));
    }

    #[test]
    fn final_card_cannot_be_cancelled() {
        let topology = simple_board();
        assert!(matches!(
            plan_cancel(&card_in(12), 13, &topology, Utc::now()),
            Err(KanbanError::CardInFinalOrCancel { kind: ColumnKind::Final, .. })
        ));
    }

    #[test]
    fn card_outside_the_board_does_not_resolve() {
        let topology = simple_board();
        assert!(matches!(
            plan_move(&card_in(99), &topology),
            Err(KanbanError::CardNotFound(1))
        ));

        let mut blocked = card_in(99);
        blocked.blocked = true;
        assert!(matches!(
            plan_unblock(&blocked, "released", &topology, Utc::now()),
            Err(KanbanError::CardNotFound(1))
        ));
    }
}
