use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;

/// Значение ячейки из массивов страницы: строка, число или null.
///
/// Вендор кладёт в одни и те же массивы и строки, и числа, поэтому всё
/// приводится к `Option<String>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell(pub Option<String>);

impl Cell {
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => Cell(Some(s)),
            Value::Number(n) => Cell(Some(n.to_string())),
            Value::Bool(b) => Cell(Some(b.to_string())),
            _ => Cell(None),
        })
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

pub type Grid = Vec<Vec<Cell>>;

/// Число в начале строки, как его читает браузер: `"25.00 USD"` даёт 25.
///
/// Пробелы в начале пропускаются, дальше знак, цифры с необязательной
/// дробной частью и экспонента. Без единой цифры результата нет.
pub fn leading_number(raw: &str) -> Option<f64> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        has_digits |= frac_end > end + 1;
        end = frac_end;
    }
    if !has_digits {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    text[..end].parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Нестрогое чтение полей, которые страница отдаёт то строкой, то числом.
pub(crate) mod lenient {
    use super::{leading_number, Cell};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Cell::deserialize(deserializer)?.0.unwrap_or_default())
    }

    pub fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(Cell::deserialize(deserializer)?.0)
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64().filter(|number| number.is_finite()),
            Value::String(s) => leading_number(&s),
            _ => None,
        })
    }
}

/// Запись из таблицы цен `priceInfos`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceInfo {
    /// Составной ключ `"{priceCodeId}&{priceLevelId}"`.
    pub key_id: String,
    #[serde(default)]
    pub ticket_price_str: Cell,
    #[serde(default)]
    pub ticket_price_num: Cell,
}

/// Снимок глобальных переменных страницы со схемой зала.
///
/// Любое поле может отсутствовать: скрипт на странице отправляет только то,
/// что нашёл в `window`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub row_names: Option<Vec<Cell>>,
    pub row_seat_status: Option<Grid>,
    pub row_seat_name: Option<Grid>,
    #[serde(rename = "rowPriceLevelID")]
    pub row_price_level_id: Option<Grid>,
    pub row_seat_current_status: Option<Grid>,
    pub row_seat_real_status: Option<Grid>,
    pub row_seat_note: Option<Grid>,
    pub row_seat_hold_comment: Option<Grid>,
    pub rowless_section: Option<bool>,

    pub price_infos: Option<Vec<PriceInfo>>,
    pub price_code_ids: Option<Vec<Cell>>,
    pub price_code_id_name_map: Option<HashMap<String, Cell>>,
    pub price_code_id_desc_map: Option<HashMap<String, Cell>>,
}

impl PageSnapshot {
    /// Снимок без данных о местах: нечего сканировать.
    pub fn has_seating_data(&self) -> bool {
        self.row_seat_status.is_some()
    }

    /// Количество рядов: по самому длинному из `rowNames` и `rowSeatStatus`.
    pub fn row_count(&self) -> usize {
        let names = self.row_names.as_ref().map_or(0, Vec::len);
        let statuses = self.row_seat_status.as_ref().map_or(0, Vec::len);
        names.max(statuses)
    }

    /// Имя ряда; без `rowNames` ряды нумеруются с единицы.
    pub fn row_name(&self, row_index: usize) -> String {
        self.row_names
            .as_ref()
            .and_then(|names| names.get(row_index))
            .and_then(Cell::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| (row_index + 1).to_string())
    }

    /// Коды статусов ряда; пустой срез, если ряда нет в массиве.
    pub fn row_statuses(&self, row_index: usize) -> &[Cell] {
        self.row_seat_status
            .as_ref()
            .and_then(|rows| rows.get(row_index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Ячейка `grid[row][seat]`, если массив и ячейка есть.
pub fn cell_at(grid: Option<&Grid>, row_index: usize, seat_index: usize) -> Option<&str> {
    grid?.get(row_index)?.get(seat_index)?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cells_accept_strings_numbers_and_nulls() {
        let cells: Vec<Cell> = serde_json::from_value(json!(["A", 12, null, 1.5])).unwrap();
        assert_eq!(cells[0].as_str(), Some("A"));
        assert_eq!(cells[1].as_str(), Some("12"));
        assert_eq!(cells[2].as_str(), None);
        assert_eq!(cells[3].as_str(), Some("1.5"));
    }

    #[test]
    fn snapshot_uses_vendor_names() {
        let snapshot: PageSnapshot = serde_json::from_value(json!({
            "rowNames": ["A", "B"],
            "rowSeatStatus": [["O", "X"], ["O"]],
            "rowPriceLevelID": [[3, 3], [4]],
            "priceCodeIds": [5, 7],
            "priceInfos": [{"keyId": "5&3", "ticketPriceStr": "$25.00", "ticketPriceNum": 25}]
        }))
        .unwrap();

        assert_eq!(snapshot.row_count(), 2);
        assert_eq!(snapshot.row_name(1), "B");
        assert_eq!(cell_at(snapshot.row_price_level_id.as_ref(), 0, 1), Some("3"));
        assert_eq!(snapshot.price_infos.unwrap()[0].key_id, "5&3");
    }

    #[test]
    fn missing_row_names_fall_back_to_row_numbers() {
        let snapshot: PageSnapshot =
            serde_json::from_value(json!({"rowSeatStatus": [["O"], ["X"], []]})).unwrap();
        assert_eq!(snapshot.row_count(), 3);
        assert_eq!(snapshot.row_name(2), "3");
        assert!(snapshot.row_statuses(5).is_empty());
    }

    #[test]
    fn leading_number_reads_like_the_browser() {
        assert_eq!(leading_number("25.00"), Some(25.0));
        assert_eq!(leading_number("  25.00 USD"), Some(25.0));
        assert_eq!(leading_number("-.5x"), Some(-0.5));
        assert_eq!(leading_number("1e2e"), Some(100.0));
        assert_eq!(leading_number("3e"), Some(3.0));
        assert_eq!(leading_number("$25.00"), None);
        assert_eq!(leading_number("."), None);
        assert_eq!(leading_number(""), None);
    }
}
