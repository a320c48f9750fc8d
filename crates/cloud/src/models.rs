//! Row types for the hosted attribute tables.
//!
//! Every table has the same shape: `city_id`, `city_name` and one value
//! column. Rows are keyed by `city_name` (the region's display name); the
//! `city_id` column is informational.

use std::collections::BTreeMap;
use std::fmt;

use depomap_colormap::Rgb;
use depomap_core::fold_diacritics;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CloudError, Result};

/// One of the three persisted attribute collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    StoreCounts,
    Colors,
    Radii,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::StoreCounts, Collection::Colors, Collection::Radii];

    /// Table name on the server.
    pub fn table(&self) -> &'static str {
        match self {
            Collection::StoreCounts => "city_store_counts",
            Collection::Colors => "city_colors",
            Collection::Radii => "city_radii",
        }
    }

    /// Name of the value column.
    pub fn value_column(&self) -> &'static str {
        match self {
            Collection::StoreCounts => "store_count",
            Collection::Colors => "color",
            Collection::Radii => "radius_km",
        }
    }

    /// Column list for a `select=` query.
    pub fn select_columns(&self) -> String {
        format!("city_id,city_name,{}", self.value_column())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// A single attribute value, typed by its collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Count(u32),
    Color(Rgb),
    Radius(f64),
}

impl AttributeValue {
    /// The collection this kind of value is stored in.
    pub fn collection(&self) -> Collection {
        match self {
            AttributeValue::Count(_) => Collection::StoreCounts,
            AttributeValue::Color(_) => Collection::Colors,
            AttributeValue::Radius(_) => Collection::Radii,
        }
    }

    pub fn as_count(&self) -> Option<u32> {
        match self {
            AttributeValue::Count(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgb> {
        match self {
            AttributeValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_radius(&self) -> Option<f64> {
        match self {
            AttributeValue::Radius(r) => Some(*r),
            _ => None,
        }
    }

    fn to_json(self) -> Value {
        match self {
            AttributeValue::Count(c) => Value::from(c),
            AttributeValue::Color(c) => Value::from(c.to_hex()),
            AttributeValue::Radius(r) => Value::from(r),
        }
    }

    fn from_json(collection: Collection, value: &Value) -> Result<Self> {
        let bad = || CloudError::Decode(format!("unexpected {} value: {value}", collection.value_column()));
        match collection {
            Collection::StoreCounts => value
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .map(AttributeValue::Count)
                .ok_or_else(bad),
            Collection::Colors => {
                let s = value.as_str().ok_or_else(bad)?;
                Rgb::from_hex(s)
                    .map(AttributeValue::Color)
                    .map_err(|e| CloudError::Decode(e.to_string()))
            }
            Collection::Radii => value
                .as_f64()
                .filter(|r| r.is_finite())
                .map(AttributeValue::Radius)
                .ok_or_else(bad),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Count(c) => write!(f, "{c}"),
            AttributeValue::Color(c) => write!(f, "{c}"),
            AttributeValue::Radius(r) => write!(f, "{r}"),
        }
    }
}

/// A row of any attribute table.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRow {
    pub city_id: String,
    pub city_name: String,
    pub value: AttributeValue,
}

impl AttributeRow {
    /// Row keyed by display name; `city_id` is the diacritic-folded name.
    pub fn new(city_name: &str, value: AttributeValue) -> Self {
        let city_name = city_name.trim().to_string();
        Self {
            city_id: fold_diacritics(&city_name),
            city_name,
            value,
        }
    }

    pub fn collection(&self) -> Collection {
        self.value.collection()
    }

    /// JSON object as sent in an upsert body.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("city_id".into(), Value::from(self.city_id.clone()));
        obj.insert("city_name".into(), Value::from(self.city_name.clone()));
        obj.insert(self.collection().value_column().into(), self.value.to_json());
        Value::Object(obj)
    }

    /// Parse a row returned by a `select` on `collection`.
    pub fn from_json(collection: Collection, row: &Value) -> Result<Self> {
        let obj = row
            .as_object()
            .ok_or_else(|| CloudError::Decode(format!("row is not an object: {row}")))?;
        let city_name = obj
            .get("city_name")
            .and_then(Value::as_str)
            .ok_or_else(|| CloudError::Decode("row without city_name".into()))?
            .to_string();
        let city_id = obj
            .get("city_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| fold_diacritics(&city_name));
        let raw = obj
            .get(collection.value_column())
            .ok_or_else(|| CloudError::Decode(format!("row without {}", collection.value_column())))?;
        Ok(Self {
            city_id,
            city_name,
            value: AttributeValue::from_json(collection, raw)?,
        })
    }
}

/// Attribute values keyed by display name.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// Collapse rows into a map; a later row for the same name wins.
pub fn rows_to_map(rows: Vec<AttributeRow>) -> AttributeMap {
    rows.into_iter().map(|r| (r.city_name, r.value)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_names() {
        assert_eq!(Collection::StoreCounts.table(), "city_store_counts");
        assert_eq!(Collection::Colors.select_columns(), "city_id,city_name,color");
        assert_eq!(Collection::Radii.value_column(), "radius_km");
    }

    #[test]
    fn test_row_json() {
        let row = AttributeRow::new(" İzmir ", AttributeValue::Count(7));
        assert_eq!(row.city_id, "izmir");
        assert_eq!(row.to_json(), json!({"city_id": "izmir", "city_name": "İzmir", "store_count": 7}));

        let parsed = AttributeRow::from_json(
            Collection::Colors,
            &json!({"city_id": "ankara", "city_name": "Ankara", "color": "#D79775"}),
        )
        .unwrap();
        assert_eq!(parsed.value.as_color(), Some(Rgb::new(0xd7, 0x97, 0x75)));
    }

    #[test]
    fn test_decode_errors() {
        let neg = json!({"city_name": "Van", "store_count": -1});
        assert!(AttributeRow::from_json(Collection::StoreCounts, &neg).is_err());
        let missing = json!({"city_name": "Van"});
        assert!(AttributeRow::from_json(Collection::Radii, &missing).is_err());
        let no_name = json!({"color": "#ffffff"});
        assert!(AttributeRow::from_json(Collection::Colors, &no_name).is_err());
    }

    #[test]
    fn test_missing_city_id_is_derived() {
        let row = AttributeRow::from_json(Collection::Radii, &json!({"city_name": "Muğla", "radius_km": 90.5})).unwrap();
        assert_eq!(row.city_id, "mugla");
        assert_eq!(row.value.as_radius(), Some(90.5));
    }
}
