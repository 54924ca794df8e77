//! Fixed column names shared by every region sheet.

use core::fmt;

/// Separator between section and field in a dynamic column name (`"<Section> - <Field>"`).
pub const ATTRIBUTE_SEPARATOR: &str = " - ";

/// Core columns in their fixed on-disk order.
pub const CORE_COLUMNS: [&str; 8] = [
    "RecordID",
    "Category",
    "SiteName",
    "Region",
    "Latitude",
    "Longitude",
    "Status",
    "RepairRank",
];

/// One of the eight columns every region sheet must expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoreColumn {
    RecordId,
    Category,
    SiteName,
    Region,
    Latitude,
    Longitude,
    Status,
    RepairRank,
}

impl CoreColumn {
    pub const ALL: [CoreColumn; 8] = [
        CoreColumn::RecordId,
        CoreColumn::Category,
        CoreColumn::SiteName,
        CoreColumn::Region,
        CoreColumn::Latitude,
        CoreColumn::Longitude,
        CoreColumn::Status,
        CoreColumn::RepairRank,
    ];

    pub fn name(self) -> &'static str {
        CORE_COLUMNS[self as usize]
    }

    /// Returns the core column with exactly this header name.
    pub fn from_name(name: &str) -> Option<CoreColumn> {
        CoreColumn::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for CoreColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn is_core_column(name: &str) -> bool {
    CORE_COLUMNS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_column_order_matches_names() {
        let names: Vec<_> = CoreColumn::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, CORE_COLUMNS.to_vec());
        assert_eq!(CoreColumn::from_name("Latitude"), Some(CoreColumn::Latitude));
        assert_eq!(CoreColumn::from_name("latitude"), None);
        assert!(is_core_column("RepairRank"));
        assert!(!is_core_column("Inspection - LastDate"));
    }
}
