pub mod seat_map;
pub mod adjacency;
pub mod ticket_limit;
pub mod actuator;
pub mod applicator;
pub mod navigation;

pub use seat_map::build_seat_map;
pub use adjacency::{adjacent_by_count, find_adjacent_groups, select_seats_for_purchase};
pub use ticket_limit::{LimitResolver, LimitSignals, ResolvedLimit, TicketLimitChain};
pub use actuator::{PageBridgeClient, SeatActuator};
pub use applicator::{apply_selection, SelectionOutcome};
pub use navigation::{ManifestForm, ManifestNavigator};
