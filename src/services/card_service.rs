use chrono::Utc;

use crate::domain::lifecycle::{self, require_text};
use crate::domain::{Card, ColumnTopology, KanbanError, Transition};
use crate::infrastructure::CardGateway;

/// The card lifecycle engine.
///
/// Every operation runs as one unit of work: the card is locked and loaded
/// fresh, the transition is planned against the board topology, and all of
/// its mutations commit together or not at all.
pub struct CardService;

impl CardService {
    // ── Creation ───────────────────────────────────────────────

    pub async fn create_card(
        gateway: &CardGateway,
        board_id: i64,
        title: &str,
        description: &str,
    ) -> Result<Card, KanbanError> {
        require_text("title", title)?;
        require_text("description", description)?;

        let mut uow = gateway.begin().await?;

        uow.lock_board(board_id).await?;

        let topology = ColumnTopology::new(uow.load_columns(board_id).await?)?;
        let initial = topology.initial_column();

        let id = uow.insert_card(title, description, initial.id).await?;
        let card = uow.load_card(id).await?;
        uow.commit().await?;

        tracing::info!(
            card_id = card.id,
            board_id,
            column_id = initial.id,
            "Card created"
        );

        Ok(card)
    }

    // ── Transitions ────────────────────────────────────────────

    pub async fn move_to_next_column(
        gateway: &CardGateway,
        card_id: i64,
        topology: &ColumnTopology,
    ) -> Result<Card, KanbanError> {
        Self::transition(gateway, card_id, "move", |card| {
            lifecycle::plan_move(card, topology)
        })
        .await
    }

    pub async fn block(
        gateway: &CardGateway,
        card_id: i64,
        reason: &str,
        topology: &ColumnTopology,
    ) -> Result<Card, KanbanError> {
        Self::transition(gateway, card_id, "block", |card| {
            lifecycle::plan_block(card, reason, topology, Utc::now())
        })
        .await
    }

    pub async fn unblock(
        gateway: &CardGateway,
        card_id: i64,
        reason: &str,
        topology: &ColumnTopology,
    ) -> Result<Card, KanbanError> {
        Self::transition(gateway, card_id, "unblock", |card| {
            lifecycle::plan_unblock(card, reason, topology, Utc::now())
        })
        .await
    }

    pub async fn cancel(
        gateway: &CardGateway,
        card_id: i64,
        cancel_column_id: i64,
        topology: &ColumnTopology,
    ) -> Result<Card, KanbanError> {
        Self::transition(gateway, card_id, "cancel", |card| {
            lifecycle::plan_cancel(card, cancel_column_id, topology, Utc::now())
        })
        .await
    }

    async fn transition<F>(
        gateway: &CardGateway,
        card_id: i64,
        operation: &'static str,
        plan: F,
    ) -> Result<Card, KanbanError>
    where
        F: FnOnce(&Card) -> Result<Transition, KanbanError>,
    {
        let mut uow = gateway.begin().await?;
        uow.lock_card(card_id).await?;
        let mut card = uow.load_card(card_id).await?;

        let transition = match plan(&card) {
            Ok(transition) => transition,
            Err(e) => {
                tracing::debug!(card_id, operation, error = %e, "Card transition rejected");
                return Err(e);
            }
        };

        for mutation in &transition.mutations {
            uow.apply(card.id, mutation).await?;
            card.apply(mutation);
        }
        uow.commit().await?;

        tracing::info!(
            card_id,
            operation,
            from_column = transition.from_column,
            to_column = transition.to_column(),
            blocked = card.blocked,
            "Card transition committed"
        );

        Ok(card)
    }
}
