//! Page models: the in-memory state behind each screen.

use std::fmt;

use order_sheets_bridge::OrderBridge;
use order_sheets_core::{CellValue, Column, Dataset, RowRecord};

/// What the manager page is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Idle,
    Loading,
    Saving,
}

/// Editable grid over the order rows.
///
/// Holds the rows in memory; the host only sees them when [`save`](Self::save)
/// is called. Requests are not guarded against each other.
pub struct ManagerPage<B> {
    bridge: B,
    dataset: Dataset,
    state: PageState,
}

impl<B: OrderBridge> ManagerPage<B> {
    pub fn new(bridge: B) -> Self {
        Self {
            bridge,
            dataset: Dataset::new(),
            state: PageState::Idle,
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn into_bridge(self) -> B {
        self.bridge
    }

    /// Replace the rows with the default data file's. Returns the row count.
    pub async fn load(&mut self) -> usize {
        self.state = PageState::Loading;
        self.dataset = self.bridge.read_excel().await;
        self.state = PageState::Idle;
        tracing::debug!(rows = self.dataset.len(), "loaded");
        self.dataset.len()
    }

    /// Replace the rows with a user-picked file's. Returns the row count;
    /// a cancelled pick leaves the page empty.
    pub async fn import(&mut self) -> usize {
        self.state = PageState::Loading;
        self.dataset = self.bridge.select_and_read_excel().await;
        self.state = PageState::Idle;
        tracing::debug!(rows = self.dataset.len(), "imported");
        self.dataset.len()
    }

    /// Write the rows to the default data file.
    pub async fn save(&mut self) -> bool {
        self.state = PageState::Saving;
        let saved = self.bridge.save_excel(self.dataset.clone()).await;
        self.state = PageState::Idle;
        if !saved {
            tracing::warn!("save failed");
        }
        saved
    }

    /// Set one cell. Editing quantity or price recomputes the subtotal when
    /// both are numbers.
    pub fn set_cell(
        &mut self,
        row: usize,
        column: Column,
        value: CellValue,
    ) -> order_sheets_core::Result<()> {
        let record = self.dataset.get_mut(row)?;
        record.set(column.name(), value);
        if matches!(column, Column::Quantity | Column::Price) {
            update_subtotal(record);
        }
        Ok(())
    }

    /// Append a blank row numbered after the last one. Returns its index.
    pub fn add_row(&mut self) -> usize {
        let mut record = RowRecord::blank();
        record.set(Column::Id.name(), (self.dataset.len() + 1) as i64);
        self.dataset.push(record);
        self.dataset.len() - 1
    }

    pub fn remove_row(&mut self, row: usize) -> order_sheets_core::Result<RowRecord> {
        self.dataset.remove(row)
    }

    /// Number the rows 1..=n in their current order.
    pub fn renumber(&mut self) {
        for (i, record) in self.dataset.iter_mut().enumerate() {
            record.set(Column::Id.name(), (i + 1) as i64);
        }
    }
}

fn update_subtotal(record: &mut RowRecord) {
    let quantity = record.column(Column::Quantity).and_then(CellValue::as_number);
    let price = record.column(Column::Price).and_then(CellValue::as_number);
    if let (Some(q), Some(p)) = (quantity, price) {
        record.set(Column::Subtotal.name(), q * p);
    }
}

/// Summary of the order rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverviewPage {
    pub rows: usize,
    pub total: f64,
}

impl OverviewPage {
    pub fn summarize(dataset: &Dataset) -> Self {
        Self {
            rows: dataset.len(),
            total: dataset.total(),
        }
    }

    /// Summarize the default data file.
    pub async fn load<B: OrderBridge + ?Sized>(bridge: &B) -> Self {
        Self::summarize(&bridge.read_excel().await)
    }
}

impl fmt::Display for OverviewPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rows:  {}", self.rows)?;
        write!(f, "Total: {}", CellValue::Number(self.total))
    }
}
