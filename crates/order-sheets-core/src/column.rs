//! The fixed column set

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::HEADER;

/// One of the nine fixed columns of an order sheet.
///
/// Declaration order is header order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Id,
    Content,
    Quantity,
    Price,
    Subtotal,
    Material,
    Size,
    Handler,
    Remark,
}

impl Column {
    /// All columns in header order
    pub const ALL: [Column; 9] = [
        Column::Id,
        Column::Content,
        Column::Quantity,
        Column::Price,
        Column::Subtotal,
        Column::Material,
        Column::Size,
        Column::Handler,
        Column::Remark,
    ];

    /// Header text for this column
    pub fn name(self) -> &'static str {
        HEADER[self.index()]
    }

    /// 0-based position in the header row
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a column by its header text
    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|c| c.name() == name)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::from_name(s.trim()).ok_or_else(|| Error::UnknownColumn(s.to_string()))
    }
}
