use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::LayoutError;

/// Opaque reference to a palette entry placed inside a column.
pub type ComponentRef = Value;

/// Opaque palette entry describing a component type offered to the UI.
pub type ComponentDescriptor = Value;

/// Missing and `null` sequences both read as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rows: Vec<Row>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cols: Vec<Column>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub components: Vec<ComponentRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentPalette(pub Vec<ComponentDescriptor>);

impl ComponentPalette {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Where a new row lands relative to the reference row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    Before,
    After,
}

impl InsertPosition {
    /// Insertion index for a reference row, `None` on overflow. Indices are
    /// unsigned, so there is no negative "before the first row" reference.
    pub fn resolve(self, index: usize) -> Option<usize> {
        match self {
            Self::After => index.checked_add(1),
            Self::Before => Some(index),
        }
    }
}

/// Only `"after"` selects [`InsertPosition::After`]; anything else means before.
impl FromStr for InsertPosition {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw == "after" {
            Ok(Self::After)
        } else {
            Ok(Self::Before)
        }
    }
}

impl fmt::Display for InsertPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => f.write_str("before"),
            Self::After => f.write_str("after"),
        }
    }
}

impl Row {
    /// A row of `cols` independent, empty columns.
    pub fn with_columns(cols: usize) -> Self {
        Self {
            cols: (0..cols).map(|_| Column::default()).collect(),
            extra: Map::new(),
        }
    }
}

impl Layout {
    /// Inserts a fresh row next to the row at `index` and returns where it landed.
    ///
    /// Existing rows are never modified; rows at or after the insertion point
    /// shift right by one.
    pub fn insert_row(
        &mut self,
        pos: InsertPosition,
        index: usize,
        cols: usize,
    ) -> Result<usize, LayoutError> {
        let len = self.rows.len();
        let position = pos
            .resolve(index)
            .filter(|position| *position <= len)
            .ok_or(LayoutError::PositionOutOfRange { pos, index, len })?;

        self.rows.insert(position, Row::with_columns(cols));
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn labelled_row(label: &str) -> Row {
        let mut row = Row::with_columns(1);
        row.extra.insert("label".into(), json!(label));
        row
    }

    #[test]
    fn after_inserts_behind_reference_row() {
        let (a, b) = (labelled_row("a"), labelled_row("b"));
        let mut layout = Layout {
            rows: vec![a.clone(), b.clone()],
            ..Layout::default()
        };

        let position = layout
            .insert_row(InsertPosition::After, 0, 2)
            .expect("insert");

        assert_eq!(position, 1);
        assert_eq!(layout.rows, vec![a, Row::with_columns(2), b]);
    }

    #[test]
    fn before_inserts_in_front_of_reference_row() {
        let a = labelled_row("a");
        let mut layout = Layout {
            rows: vec![a.clone()],
            ..Layout::default()
        };

        let position = layout
            .insert_row(InsertPosition::Before, 0, 1)
            .expect("insert");

        assert_eq!(position, 0);
        assert_eq!(layout.rows, vec![Row::with_columns(1), a]);
    }

    #[test]
    fn new_row_has_requested_number_of_empty_columns() {
        for cols in [0, 1, 5] {
            let row = Row::with_columns(cols);
            assert_eq!(row.cols.len(), cols);
            assert!(row.cols.iter().all(|col| col.components.is_empty()));
            assert!(row.extra.is_empty());
        }
    }

    #[test]
    fn new_row_columns_are_independent() {
        let mut row = Row::with_columns(3);
        row.cols[0].components.push(json!({ "type": "heading" }));

        assert_eq!(row.cols[0].components.len(), 1);
        assert!(row.cols[1].components.is_empty());
        assert!(row.cols[2].components.is_empty());
    }

    #[test]
    fn out_of_range_position_leaves_layout_untouched() {
        let mut layout = Layout {
            rows: vec![labelled_row("a")],
            ..Layout::default()
        };
        let before = layout.clone();

        let err = layout
            .insert_row(InsertPosition::After, 1, 2)
            .expect_err("past the end");

        assert_eq!(
            err,
            LayoutError::PositionOutOfRange {
                pos: InsertPosition::After,
                index: 1,
                len: 1,
            }
        );
        assert_eq!(layout, before);

        let err = layout
            .insert_row(InsertPosition::After, usize::MAX, 1)
            .expect_err("overflow");
        assert!(matches!(err, LayoutError::PositionOutOfRange { .. }));
    }

    #[test]
    fn empty_layout_accepts_insert_at_zero() {
        let mut layout = Layout::default();
        assert_eq!(
            layout.insert_row(InsertPosition::Before, 0, 2).expect("insert"),
            0
        );
        assert_eq!(layout.rows.len(), 1);
    }

    #[test]
    fn parses_unknown_position_as_before() {
        assert_eq!("after".parse(), Ok(InsertPosition::After));
        assert_eq!("before".parse(), Ok(InsertPosition::Before));
        assert_eq!("sideways".parse(), Ok(InsertPosition::Before));
        assert_eq!("After".parse(), Ok(InsertPosition::Before));
    }

    #[test]
    fn layout_keeps_unknown_keys_and_defaults_missing_sequences() {
        let raw = json!({
            "id": "home",
            "rows": [
                { "cols": [ { "components": [ { "type": "text" } ], "width": 6 }, {} ] },
                {}
            ]
        });

        let layout: Layout = serde_json::from_value(raw.clone()).expect("layout");
        assert_eq!(layout.rows.len(), 2);
        assert_eq!(layout.rows[0].cols[0].extra.get("width"), Some(&json!(6)));
        assert!(layout.rows[0].cols[1].components.is_empty());
        assert!(layout.rows[1].cols.is_empty());
        assert_eq!(layout.extra.get("id"), Some(&json!("home")));

        let encoded = serde_json::to_value(&layout).expect("encode");
        assert_eq!(encoded["id"], json!("home"));
        assert_eq!(encoded["rows"][0]["cols"][0]["width"], json!(6));
    }

    #[test]
    fn null_sequences_read_as_empty() {
        let layout: Layout = serde_json::from_value(json!({ "rows": null })).expect("layout");
        assert!(layout.rows.is_empty());

        let layout: Layout = serde_json::from_value(json!({
            "rows": [ { "cols": null }, { "cols": [ { "components": null } ] } ]
        }))
        .expect("layout");
        assert!(layout.rows[0].cols.is_empty());
        assert!(layout.rows[1].cols[0].components.is_empty());
        assert!(layout.rows[1].cols[0].extra.is_empty());
    }

    #[test]
    fn palette_is_a_bare_json_array() {
        let palette: ComponentPalette =
            serde_json::from_str(r#"[{"name":"text"},{"name":"image"}]"#).expect("palette");
        assert_eq!(palette.len(), 2);
        assert_eq!(
            serde_json::to_string(&palette).expect("encode"),
            r#"[{"name":"text"},{"name":"image"}]"#
        );
    }
}
