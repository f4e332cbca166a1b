use serde::Serialize;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::ActuatorError;
use crate::models::SeatRecord;
use crate::services::actuator::SeatActuator;

/// Итог выбора мест и отправки в корзину.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionOutcome {
    pub run_id: Uuid,
    pub cleared: usize,
    pub attempted: usize,
    /// `seatIdentifier` подтверждённых мест.
    pub selected: Vec<String>,
    pub failed: Vec<String>,
    pub committed: bool,
}

impl SelectionOutcome {
    pub fn shortfall(&self) -> usize {
        self.attempted - self.selected.len()
    }
}

/// Выбирает места через `actuator` и отправляет их в корзину.
///
/// Частичный выбор допустим: в корзину уходит то, что удалось выбрать.
/// `commit` вызывается, только если выбрано хотя бы одно место.
pub async fn apply_selection<A>(actuator: &A, seats: &[SeatRecord]) -> SelectionOutcome
where
    A: SeatActuator + ?Sized,
{
    let run_id = Uuid::new_v4();
    let span = info_span!("apply_selection", %run_id, seats = seats.len());
    run_selection(actuator, seats, run_id).instrument(span).await
}

async fn run_selection<A>(actuator: &A, seats: &[SeatRecord], run_id: Uuid) -> SelectionOutcome
where
    A: SeatActuator + ?Sized,
{
    let cleared = match actuator.clear().await {
        Ok(cleared) => {
            info!("Cleared {} existing seat selections", cleared);
            cleared
        }
        Err(e) => {
            error!("Error clearing seat selections: {}. Continuing with selection", e);
            0
        }
    };

    let mut selected = Vec::with_capacity(seats.len());
    let mut failed = Vec::new();

    for seat in seats {
        match actuator.toggle(seat.row_index, seat.seat_index).await {
            Ok(true) => {
                if let Some(code) = seat.price_code_id() {
                    if let Err(e) = actuator.set_price_code(seat.row_index, seat.seat_index, code).await {
                        warn!("Failed to set price code {} on seat {}: {}", code, seat.seat_identifier, e);
                    }
                }
                selected.push(seat.seat_identifier.clone());
            }
            Ok(false) => {
                warn!("Seat {} did not end up selected", seat.seat_identifier);
                failed.push(seat.seat_identifier.clone());
            }
            Err(ActuatorError::NotFound(id)) => {
                warn!("Seat {} not found on the page ({})", seat.seat_identifier, id);
                failed.push(seat.seat_identifier.clone());
            }
            Err(e) => {
                error!("Error selecting seat {}: {}", seat.seat_identifier, e);
                failed.push(seat.seat_identifier.clone());
            }
        }
    }

    info!("Selected {} seats out of {} attempted", selected.len(), seats.len());

    let committed = if selected.is_empty() {
        info!("No seats were successfully selected");
        false
    } else {
        info!("Adding {} seats to cart", selected.len());
        match actuator.commit().await {
            Ok(()) => true,
            Err(e) => {
                error!("Error adding seats to cart: {}", e);
                false
            }
        }
    };

    SelectionOutcome {
        run_id,
        cleared,
        attempted: seats.len(),
        selected,
        failed,
        committed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceCode;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Страница в памяти: записывает вызовы, часть мест "занята".
    #[derive(Default)]
    struct FakePage {
        taken: HashSet<(usize, usize)>,
        missing: HashSet<(usize, usize)>,
        fail_clear: bool,
        fail_commit: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakePage {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SeatActuator for FakePage {
        async fn clear(&self) -> Result<usize, ActuatorError> {
            self.record("clear".into());
            if self.fail_clear {
                return Err(ActuatorError::Rejected { action: "clear", status: 500 });
            }
            Ok(2)
        }

        async fn toggle(&self, row_index: usize, seat_index: usize) -> Result<bool, ActuatorError> {
            self.record(format!("toggle {}:{}", row_index, seat_index));
            if self.missing.contains(&(row_index, seat_index)) {
                return Err(ActuatorError::NotFound(format!("IMG{}C{}", row_index, seat_index)));
            }
            Ok(!self.taken.contains(&(row_index, seat_index)))
        }

        async fn set_price_code(&self, row_index: usize, seat_index: usize, code: &str) -> Result<(), ActuatorError> {
            self.record(format!("price {}:{}={}", row_index, seat_index, code));
            Ok(())
        }

        async fn commit(&self) -> Result<(), ActuatorError> {
            self.record("commit".into());
            if self.fail_commit {
                return Err(ActuatorError::Rejected { action: "commit", status: 502 });
            }
            Ok(())
        }
    }

    fn seat(seat_index: usize, code: Option<&str>) -> SeatRecord {
        let mut seat = SeatRecord::new(1, seat_index, "B", &(seat_index + 1).to_string(), "O");
        seat.price_code = code.map(|id| PriceCode { id: id.into(), name: None, description: None });
        seat
    }

    #[tokio::test]
    async fn selects_tags_and_commits() {
        let page = FakePage::default();
        let outcome = apply_selection(&page, &[seat(5, Some("9")), seat(4, None)]).await;

        assert_eq!(outcome.cleared, 2);
        assert_eq!(outcome.selected, vec!["B-6", "B-5"]);
        assert!(outcome.committed);
        assert_eq!(outcome.shortfall(), 0);
        assert_eq!(page.calls(), vec!["clear", "toggle 1:5", "price 1:5=9", "toggle 1:4", "commit"]);
    }

    #[tokio::test]
    async fn partial_selection_still_commits() {
        let page = FakePage {
            taken: HashSet::from([(1, 5)]),
            missing: HashSet::from([(1, 3)]),
            fail_clear: true,
            ..Default::default()
        };
        let outcome = apply_selection(&page, &[seat(5, Some("9")), seat(4, None), seat(3, None)]).await;

        assert_eq!(outcome.cleared, 0);
        assert_eq!(outcome.selected, vec!["B-5"]);
        assert_eq!(outcome.failed, vec!["B-6", "B-4"]);
        assert_eq!(outcome.shortfall(), 2);
        assert!(outcome.committed);
        assert!(!page.calls().iter().any(|c| c.starts_with("price")));
    }

    #[tokio::test]
    async fn nothing_selected_means_no_commit() {
        let page = FakePage { taken: HashSet::from([(1, 0)]), ..Default::default() };
        let outcome = apply_selection(&page, &[seat(0, None)]).await;

        assert!(outcome.selected.is_empty());
        assert!(!outcome.committed);
        assert!(!page.calls().contains(&"commit".to_string()));
    }

    #[tokio::test]
    async fn failed_commit_is_reported() {
        let page = FakePage { fail_commit: true, ..Default::default() };
        let outcome = apply_selection(&page, &[seat(0, None)]).await;
        assert_eq!(outcome.selected.len(), 1);
        assert!(!outcome.committed);
    }
}
