//! seat_map.rs
//!
//! Построение отчёта по схеме зала из снимка глобальных переменных страницы.
//!
//! Каждое место получает запись `SeatRecord` с разрешённой ценой. Цена ищется
//! по составному ключу `"{priceCodeId}&{priceLevelId}"`; ценовые коды
//! перебираются в порядке `priceCodeIds`, выигрывает первый найденный.
//! Отсутствие любых массивов не ошибка: поля становятся `None`, а без
//! `rowSeatStatus` получается пустой отчёт.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::models::{
    report::{availability_percentage, status_legend, UNKNOWN_PRICE},
    snapshot::{cell_at, leading_number},
    Buckets, Cell, PageSnapshot, PriceCode, PriceInfo, Report, SeatRecord, Summary,
};
use crate::services::adjacency;

/// Индекс цен по `keyId`. При повторах ключа побеждает первая запись таблицы.
struct PriceTable<'a> {
    by_key: HashMap<&'a str, &'a PriceInfo>,
    code_ids: &'a [Cell],
    names: Option<&'a HashMap<String, Cell>>,
    descriptions: Option<&'a HashMap<String, Cell>>,
}

impl<'a> PriceTable<'a> {
    fn new(snapshot: &'a PageSnapshot) -> Option<Self> {
        let infos = snapshot.price_infos.as_ref()?;
        let code_ids = snapshot.price_code_ids.as_ref()?;

        let mut by_key = HashMap::with_capacity(infos.len());
        for info in infos {
            by_key.entry(info.key_id.as_str()).or_insert(info);
        }

        Some(PriceTable {
            by_key,
            code_ids,
            names: snapshot.price_code_id_name_map.as_ref(),
            descriptions: snapshot.price_code_id_desc_map.as_ref(),
        })
    }

    fn resolve(&self, level_id: &str) -> Option<(&'a PriceInfo, PriceCode)> {
        self.code_ids.iter().filter_map(Cell::as_str).find_map(|code_id| {
            let key = format!("{}&{}", code_id, level_id);
            let info = self.by_key.get(key.as_str())?;
            Some((*info, self.price_code(code_id)))
        })
    }

    fn price_code(&self, code_id: &str) -> PriceCode {
        let lookup = |map: Option<&HashMap<String, Cell>>| {
            map.and_then(|m| m.get(code_id)).and_then(Cell::as_str).map(str::to_string)
        };
        PriceCode {
            id: code_id.to_string(),
            name: lookup(self.names),
            description: lookup(self.descriptions),
        }
    }
}

/// Уровни цен `0`, `false` и пустая строка значат «нет уровня».
fn is_price_level(id: &str) -> bool {
    let id = id.trim();
    let zero_like = id.parse::<f64>().is_ok_and(|n| n == 0.0 || n.is_nan());
    !(id.is_empty() || id == "false" || zero_like)
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

/// Собирает запись места из параллельных массивов.
fn seat_record(
    snapshot: &PageSnapshot,
    prices: Option<&PriceTable<'_>>,
    row_index: usize,
    seat_index: usize,
    row_name: &str,
    status: &str,
) -> SeatRecord {
    let label = cell_at(snapshot.row_seat_name.as_ref(), row_index, seat_index)
        .map(str::to_string)
        .unwrap_or_else(|| SeatRecord::default_label(seat_index));

    let mut seat = SeatRecord::new(row_index, seat_index, row_name, &label, status);
    seat.current_status = owned(cell_at(snapshot.row_seat_current_status.as_ref(), row_index, seat_index));
    seat.real_status = owned(cell_at(snapshot.row_seat_real_status.as_ref(), row_index, seat_index));
    seat.note = owned(cell_at(snapshot.row_seat_note.as_ref(), row_index, seat_index));
    seat.hold_comment = owned(cell_at(snapshot.row_seat_hold_comment.as_ref(), row_index, seat_index));

    let raw_level = cell_at(snapshot.row_price_level_id.as_ref(), row_index, seat_index);
    seat.price_level_id = owned(raw_level.filter(|id| !id.trim().is_empty()));

    let level_id = raw_level.filter(|id| is_price_level(id));
    if let Some((info, code)) = level_id.zip(prices).and_then(|(id, table)| table.resolve(id)) {
        seat.price = owned(info.ticket_price_str.as_str());
        seat.price_num = info.ticket_price_num.as_str().and_then(leading_number);
        seat.price_code = Some(code);
    }

    seat
}

/// Строит отчёт по схеме зала. Никогда не падает: недостающие данные дают
/// пустые поля или пустой отчёт.
pub fn build_seat_map(snapshot: &PageSnapshot, section: Option<&str>) -> Report {
    if !snapshot.has_seating_data() {
        if snapshot.row_names.is_none() {
            warn!("No seating data on the page (rowNames and rowSeatStatus missing)");
        } else {
            warn!("rowSeatStatus missing, nothing to scan");
        }
        return Report::empty(section);
    }
    if snapshot.row_names.is_none() {
        warn!("rowNames missing, falling back to row numbers");
    }

    let prices = PriceTable::new(snapshot);
    if prices.is_none() {
        debug!("Price table or price code list missing, prices stay unresolved");
    }

    let row_count = snapshot.row_count();
    let mut all = Vec::new();
    let mut available = Vec::new();
    let mut status_breakdown: BTreeMap<String, usize> = BTreeMap::new();
    let mut map = Vec::with_capacity(row_count);

    for row_index in 0..row_count {
        let row_name = snapshot.row_name(row_index);
        let statuses = snapshot.row_statuses(row_index);

        let codes: String = statuses.iter().filter_map(Cell::as_str).collect();
        map.push(format!("Row {}: {}", row_name, codes));

        for (seat_index, cell) in statuses.iter().enumerate() {
            let status = cell.as_str().unwrap_or_default();
            let seat = seat_record(snapshot, prices.as_ref(), row_index, seat_index, &row_name, status);

            *status_breakdown.entry(seat.status.clone()).or_insert(0) += 1;
            if seat.is_available {
                available.push(seat.clone());
            }
            all.push(seat);
        }
    }

    let adjacent_seats = adjacency::find_adjacent_groups(&all);
    let adjacent_by_count = adjacency::adjacent_by_count(&adjacent_seats);

    let mut available_by_row = Buckets::default();
    let mut available_by_price = Buckets::default();
    for seat in &available {
        available_by_row.push(&seat.row, seat.clone());
        available_by_price.push(seat.price.as_deref().unwrap_or(UNKNOWN_PRICE), seat.clone());
    }

    let summary = Summary {
        total_rows: row_count,
        total_seats: all.len(),
        available_seats: available.len(),
        availability_percentage: availability_percentage(available.len(), all.len()),
        status_breakdown,
        adjacent_groups: adjacent_seats.len(),
        largest_adjacent_group: adjacent_seats.first().map_or(0, |group| group.count),
    };

    info!(
        "Seat map built: {} seats, {} available ({})",
        summary.total_seats, summary.available_seats, summary.availability_percentage
    );
    match adjacent_seats.first() {
        Some(best) => info!(
            "Best adjacent group: {} seats in row {} [{}], total {}",
            best.count,
            best.row,
            best.labels(),
            best.price_range.total.as_deref().unwrap_or("n/a")
        ),
        None => info!("No adjacent seats available"),
    }

    Report {
        all,
        available,
        available_by_row,
        available_by_price,
        adjacent_seats,
        adjacent_by_count,
        summary,
        map,
        section: section.map(str::to_string),
        status_legend: status_legend(),
        rowless_section: snapshot.rowless_section,
        generated_at: Utc::now(),
    }
}
