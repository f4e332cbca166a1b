use std::collections::BTreeMap;

use crate::models::{AdjacentGroup, SeatRecord};

/// Одиночное свободное место группой не считается.
pub const MIN_GROUP_SIZE: usize = 2;

fn close_run(run: &mut Vec<SeatRecord>, groups: &mut Vec<AdjacentGroup>) {
    if run.len() >= MIN_GROUP_SIZE {
        groups.push(AdjacentGroup::from_run(std::mem::take(run)));
    } else {
        run.clear();
    }
}

/// Находит максимальные серии свободных мест подряд.
///
/// Записи идут по рядам, внутри ряда по возрастанию `seat_index`. Серия
/// обрывается на занятом месте, на смене ряда и на пропуске в `seat_index`.
/// Результат отсортирован по убыванию размера; при равных размерах
/// сохраняется порядок обнаружения.
pub fn find_adjacent_groups(seats: &[SeatRecord]) -> Vec<AdjacentGroup> {
    let mut groups = Vec::new();
    let mut run: Vec<SeatRecord> = Vec::new();

    for seat in seats {
        if !seat.is_available {
            close_run(&mut run, &mut groups);
            continue;
        }
        if run.last().is_some_and(|last| !seat.is_next_to(last)) {
            close_run(&mut run, &mut groups);
        }
        run.push(seat.clone());
    }
    close_run(&mut run, &mut groups);

    // sort_by стабильна
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}

/// Группы по размеру, ключи по возрастанию.
pub fn adjacent_by_count(groups: &[AdjacentGroup]) -> BTreeMap<usize, Vec<AdjacentGroup>> {
    let mut by_count: BTreeMap<usize, Vec<AdjacentGroup>> = BTreeMap::new();
    for group in groups {
        by_count.entry(group.count).or_default().push(group.clone());
    }
    by_count
}

/// Выбирает места для покупки из самой большой группы.
///
/// Берутся последние `min(ticket_limit, count)` мест группы, начиная с конца
/// ряда, в том порядке, в котором их надо нажимать. `None`, если групп нет.
pub fn select_seats_for_purchase(groups: &[AdjacentGroup], ticket_limit: u32) -> Option<Vec<SeatRecord>> {
    let best = groups.first()?;
    let take = (ticket_limit as usize).min(best.count);
    Some(best.seats.iter().rev().take(take).cloned().collect())
}
