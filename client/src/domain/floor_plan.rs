//! Table floor plan for the venue. Local state only; nothing is synced with
//! the backend.

use std::collections::BTreeMap;

use tracing::debug;

/// Occupancy state of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableStatus {
    /// Available for walk-ins.
    Free,
    /// Held for a booking.
    Reserved,
    /// Guests are seated.
    Occupied,
}

/// One table on the floor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Table number shown on the floor.
    pub number: u16,
    /// Seat count.
    pub seats: u8,
    /// Occupancy state.
    pub status: TableStatus,
    /// Guests currently seated.
    pub guests: u8,
}

/// Rejected floor-plan operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FloorPlanError {
    /// No table has this number.
    #[error("table {number} does not exist")]
    UnknownTable { number: u16 },
    /// The layout repeats a table number.
    #[error("table {number} is listed twice")]
    DuplicateTable { number: u16 },
    /// The table already has guests.
    #[error("table {number} is occupied")]
    Occupied { number: u16 },
    /// More guests than seats.
    #[error("table {number} seats {seats}, not {guests}")]
    OverCapacity { number: u16, seats: u8, guests: u8 },
}

/// Per-status counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FloorSummary {
    /// Free tables.
    pub free: usize,
    /// Reserved tables.
    pub reserved: usize,
    /// Occupied tables.
    pub occupied: usize,
    /// Seats at free tables.
    pub open_seats: usize,
}

/// Numbered tables keyed by table number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorPlan {
    tables: BTreeMap<u16, Table>,
}

impl FloorPlan {
    /// Build a plan from `(number, seats)` pairs. Every table starts free.
    pub fn new(layout: impl IntoIterator<Item = (u16, u8)>) -> Result<Self, FloorPlanError> {
        let mut tables = BTreeMap::new();
        for (number, seats) in layout {
            let table = Table {
                number,
                seats,
                status: TableStatus::Free,
                guests: 0,
            };
            if tables.insert(number, table).is_some() {
                return Err(FloorPlanError::DuplicateTable { number });
            }
        }
        Ok(Self { tables })
    }

    /// Tables in number order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Look up one table.
    pub fn table(&self, number: u16) -> Option<&Table> {
        self.tables.get(&number)
    }

    /// Seat a party. Free and reserved tables can be seated.
    pub fn seat(&mut self, number: u16, guests: u8) -> Result<(), FloorPlanError> {
        let table = self.table_mut(number)?;
        if table.status == TableStatus::Occupied {
            return Err(FloorPlanError::Occupied { number });
        }
        if guests > table.seats {
            return Err(FloorPlanError::OverCapacity {
                number,
                seats: table.seats,
                guests,
            });
        }
        table.status = TableStatus::Occupied;
        table.guests = guests;
        debug!(number, guests, "table seated");
        Ok(())
    }

    /// Hold a free table. Reserving an already reserved table is a no-op.
    pub fn reserve(&mut self, number: u16) -> Result<(), FloorPlanError> {
        let table = self.table_mut(number)?;
        if table.status == TableStatus::Occupied {
            return Err(FloorPlanError::Occupied { number });
        }
        table.status = TableStatus::Reserved;
        Ok(())
    }

    /// Free a table whatever its state.
    pub fn release(&mut self, number: u16) -> Result<(), FloorPlanError> {
        let table = self.table_mut(number)?;
        table.status = TableStatus::Free;
        table.guests = 0;
        Ok(())
    }

    /// Counts per status.
    pub fn summary(&self) -> FloorSummary {
        self.tables
            .values()
            .fold(FloorSummary::default(), |mut summary, table| {
                match table.status {
                    TableStatus::Free => {
                        summary.free += 1;
                        summary.open_seats += usize::from(table.seats);
                    }
                    TableStatus::Reserved => summary.reserved += 1,
                    TableStatus::Occupied => summary.occupied += 1,
                }
                summary
            })
    }

    fn table_mut(&mut self, number: u16) -> Result<&mut Table, FloorPlanError> {
        self.tables
            .get_mut(&number)
            .ok_or(FloorPlanError::UnknownTable { number })
    }
}
