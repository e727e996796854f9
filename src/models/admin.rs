//! Administrative division types shared by the boundary store and the catalog.

use serde::{Deserialize, Serialize};

/// Number of leading characters of a municipality code that name its department.
pub const DEPARTMENT_CODE_LEN: usize = 2;

/// Administrative level of a boundary feature or catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AdminLevel {
    /// First-level division
    Department,
    /// Second-level division, owned by a department
    Municipality,
}

impl AdminLevel {
    /// Get the field name for this level
    pub fn field_name(&self) -> &'static str {
        match self {
            AdminLevel::Department => "department",
            AdminLevel::Municipality => "municipality",
        }
    }
}

impl std::fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Department code prefix of a municipality code.
///
/// Codes shorter than the prefix length are returned whole.
pub fn department_prefix(municipality_code: &str) -> &str {
    municipality_code
        .char_indices()
        .nth(DEPARTMENT_CODE_LEN)
        .map(|(idx, _)| &municipality_code[..idx])
        .unwrap_or(municipality_code)
}

/// Catalog row for a department
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRecord {
    pub id: i64,
    pub code: String,
    pub name: String,
}

/// Catalog row for a municipality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MunicipalityRecord {
    pub id: i64,
    pub department_code: String,
    pub code: String,
    pub name: String,

    /// Municipality, non-municipalized area, etc.
    #[serde(default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,
}

impl MunicipalityRecord {
    /// Stored centroid as `(lng, lat)`, when both halves are recorded.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        match (self.longitude, self.latitude) {
            (Some(lng), Some(lat)) => Some((lng, lat)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_prefix() {
        assert_eq!(department_prefix("05001"), "05");
        assert_eq!(department_prefix("11"), "11");
        assert_eq!(department_prefix("9"), "9");
        assert_eq!(department_prefix(""), "");
    }

    #[test]
    fn test_centroid_requires_both_halves() {
        let mut record = MunicipalityRecord {
            id: 1,
            department_code: "05".to_string(),
            code: "05001".to_string(),
            name: "Medellín".to_string(),
            kind: None,
            latitude: Some(6.25),
            longitude: None,
        };
        assert!(record.centroid().is_none());

        record.longitude = Some(-75.56);
        assert_eq!(record.centroid(), Some((-75.56, 6.25)));
    }
}
