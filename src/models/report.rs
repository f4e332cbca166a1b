use chrono::{DateTime, Utc};
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

use crate::models::{snapshot::lenient, SeatRecord};

/// Ключ для мест без найденной цены в `availableByPrice`.
pub const UNKNOWN_PRICE: &str = "Unknown";

/// Диапазон цен группы; все поля `None`, если ни у одного места нет числовой цены.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<String>,
    pub max: Option<String>,
    pub total: Option<String>,
    pub average: Option<String>,
}

impl PriceRange {
    pub fn from_seats(seats: &[SeatRecord]) -> Self {
        let prices: Vec<f64> = seats
            .iter()
            .filter_map(|seat| seat.price_num)
            .filter(|price| price.is_finite())
            .collect();

        if prices.is_empty() {
            return PriceRange::default();
        }

        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let total: f64 = prices.iter().sum();

        PriceRange {
            min: Some(format!("{:.2}", min)),
            max: Some(format!("{:.2}", max)),
            total: Some(format!("{:.2}", total)),
            average: Some(format!("{:.2}", total / prices.len() as f64)),
        }
    }
}

/// Максимальная серия свободных мест подряд в одном ряду (от двух мест).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjacentGroup {
    #[serde(deserialize_with = "lenient::text")]
    pub row: String,
    pub seats: Vec<SeatRecord>,
    pub count: usize,
    #[serde(default)]
    pub price_range: PriceRange,
}

impl AdjacentGroup {
    pub fn from_run(seats: Vec<SeatRecord>) -> Self {
        AdjacentGroup {
            row: seats.first().map(|seat| seat.row.clone()).unwrap_or_default(),
            count: seats.len(),
            price_range: PriceRange::from_seats(&seats),
            seats,
        }
    }

    pub fn labels(&self) -> String {
        self.seats.iter().map(|s| s.seat.as_str()).collect::<Vec<_>>().join(", ")
    }
}

/// Группировка по строковому ключу с сохранением порядка первого появления.
#[derive(Debug, Clone, PartialEq)]
pub struct Buckets<T> {
    entries: Vec<(String, Vec<T>)>,
    index: HashMap<String, usize>,
}

impl<T> Default for Buckets<T> {
    fn default() -> Self {
        Buckets { entries: Vec::new(), index: HashMap::new() }
    }
}

impl<T> Buckets<T> {
    pub fn push(&mut self, key: &str, item: T) {
        match self.index.get(key) {
            Some(&pos) => self.entries[pos].1.push(item),
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), vec![item]));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[T]> {
        self.index.get(key).map(|&pos| self.entries[pos].1.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Serialize> Serialize for Buckets<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, items) in &self.entries {
            map.serialize_entry(key, items)?;
        }
        map.end()
    }
}

/// Сводка по залу.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_rows: usize,
    pub total_seats: usize,
    pub available_seats: usize,
    pub availability_percentage: String,
    pub status_breakdown: BTreeMap<String, usize>,
    pub adjacent_groups: usize,
    pub largest_adjacent_group: usize,
}

/// Процент свободных мест с двумя знаками, `"0%"` для пустого зала.
pub fn availability_percentage(available: usize, total: usize) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.2}%", available as f64 / total as f64 * 100.0)
}

pub fn status_legend() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([("O", "Available"), ("X", "Unavailable/Sold")])
}

/// Отчёт по схеме зала.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub all: Vec<SeatRecord>,
    pub available: Vec<SeatRecord>,
    pub available_by_row: Buckets<SeatRecord>,
    pub available_by_price: Buckets<SeatRecord>,
    pub adjacent_seats: Vec<AdjacentGroup>,
    pub adjacent_by_count: BTreeMap<usize, Vec<AdjacentGroup>>,
    pub summary: Summary,
    pub map: Vec<String>,
    pub section: Option<String>,
    pub status_legend: BTreeMap<&'static str, &'static str>,
    pub rowless_section: Option<bool>,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Пустой отчёт: на странице не нашлось данных о местах.
    pub fn empty(section: Option<&str>) -> Self {
        Report {
            all: Vec::new(),
            available: Vec::new(),
            available_by_row: Buckets::default(),
            available_by_price: Buckets::default(),
            adjacent_seats: Vec::new(),
            adjacent_by_count: BTreeMap::new(),
            summary: Summary {
                availability_percentage: availability_percentage(0, 0),
                ..Summary::default()
            },
            map: Vec::new(),
            section: section.map(str::to_string),
            status_legend: status_legend(),
            rowless_section: None,
            generated_at: Utc::now(),
        }
    }

    pub fn best_group(&self) -> Option<&AdjacentGroup> {
        self.adjacent_seats.first()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(seat_index: usize, price: Option<f64>) -> SeatRecord {
        let mut seat = SeatRecord::new(0, seat_index, "A", &(seat_index + 1).to_string(), "O");
        seat.price_num = price;
        seat
    }

    #[test]
    fn price_range_ignores_unpriced_seats() {
        let range = PriceRange::from_seats(&[
            priced(0, Some(20.0)),
            priced(1, None),
            priced(2, Some(35.5)),
        ]);
        assert_eq!(range.min.as_deref(), Some("20.00"));
        assert_eq!(range.max.as_deref(), Some("35.50"));
        assert_eq!(range.total.as_deref(), Some("55.50"));
        assert_eq!(range.average.as_deref(), Some("27.75"));
    }

    #[test]
    fn price_range_is_empty_without_prices() {
        assert_eq!(PriceRange::from_seats(&[priced(0, None), priced(1, None)]), PriceRange::default());
    }

    #[test]
    fn percentage_is_rounded_and_zero_safe() {
        assert_eq!(availability_percentage(0, 0), "0%");
        assert_eq!(availability_percentage(1, 3), "33.33%");
        assert_eq!(availability_percentage(2, 2), "100.00%");
    }

    #[test]
    fn buckets_keep_first_seen_order() {
        let mut buckets = Buckets::default();
        buckets.push("C", 1);
        buckets.push("A", 2);
        buckets.push("C", 3);

        assert_eq!(buckets.keys().collect::<Vec<_>>(), vec!["C", "A"]);
        assert_eq!(buckets.get("C"), Some(&[1, 3][..]));
        assert_eq!(serde_json::to_string(&buckets).unwrap(), r#"{"C":[1,3],"A":[2]}"#);
    }
}
