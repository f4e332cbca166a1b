use serde::{Deserialize, Serialize};

use crate::models::snapshot::lenient;

/// Код статуса свободного места. Все остальные коды считаются занятыми.
pub const OPEN_STATUS: &str = "O";

/// Ценовой код, по которому нашлась цена места.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCode {
    #[serde(deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub description: Option<String>,
}

/// Одно физическое место в схеме зала.
///
/// Записи приходят и от клиента (готовые группы со страницы), где значения
/// скопированы из массивов страницы как есть, поэтому текстовые поля
/// принимают и числа, а `priceNum` и строку.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatRecord {
    pub row_index: usize,
    /// Ключ смежности: соседние места отличаются на единицу в одном ряду.
    pub seat_index: usize,
    #[serde(deserialize_with = "lenient::text")]
    pub row: String,
    #[serde(deserialize_with = "lenient::text")]
    pub seat: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub seat_identifier: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub current_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub real_status: Option<String>,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub note: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub hold_comment: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub price_level_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price_num: Option<f64>,
    #[serde(default)]
    pub price_code: Option<PriceCode>,
}

impl SeatRecord {
    /// Место без цены и дополнительных полей.
    pub fn new(row_index: usize, seat_index: usize, row: &str, seat: &str, status: &str) -> Self {
        SeatRecord {
            row_index,
            seat_index,
            row: row.to_string(),
            seat: seat.to_string(),
            seat_identifier: format!("{}-{}", row, seat),
            status: status.to_string(),
            current_status: None,
            real_status: None,
            is_available: status == OPEN_STATUS,
            note: None,
            hold_comment: None,
            price_level_id: None,
            price: None,
            price_num: None,
            price_code: None,
        }
    }

    /// Подпись места по умолчанию, когда на странице нет `rowSeatName`.
    pub fn default_label(seat_index: usize) -> String {
        format!("Seat {}", seat_index + 1)
    }

    pub fn price_code_id(&self) -> Option<&str> {
        self.price_code
            .as_ref()
            .map(|code| code.id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Следующее место в том же ряду без разрыва.
    pub fn is_next_to(&self, previous: &SeatRecord) -> bool {
        self.row_index == previous.row_index && self.seat_index == previous.seat_index + 1
    }
}
