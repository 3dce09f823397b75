//! Discovery of fields usable for coloring.

use crate::dataset::{Dataset, FieldKind};

/// Choice meaning "no coloring field".
pub const NO_COLOR_FIELD: &str = "None";

/// Color-by choices offered to the user.
///
/// Always starts with [`NO_COLOR_FIELD`], followed by label paths for
/// classification and detection fields, then plain numeric fields, each group
/// in schema order.
pub fn color_fields(dataset: &dyn Dataset) -> Vec<String> {
    let schema = dataset.field_schema();
    let mut fields = vec![NO_COLOR_FIELD.to_string()];

    fields.extend(schema.iter().filter_map(|(name, kind)| match kind {
        FieldKind::Classification => Some(format!("{}.label", name)),
        FieldKind::Detections => Some(format!("{}.detections.label", name)),
        _ => None,
    }));

    fields.extend(
        schema
            .iter()
            .filter(|(_, kind)| matches!(kind, FieldKind::Int | FieldKind::Float))
            .map(|(name, _)| name.clone()),
    );

    fields
}

/// Normalize a `color_by` parameter: `"None"` and blank mean no field.
pub fn selected_color_field(color_by: Option<&str>) -> Option<&str> {
    match color_by.map(str::trim) {
        None | Some("") | Some(NO_COLOR_FIELD) => None,
        Some(field) => Some(field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDataset;
    use pretty_assertions::assert_eq;

    #[test]
    fn label_fields_come_before_numeric_fields() {
        let dataset = MemoryDataset::new("d")
            .with_field("uniqueness", FieldKind::Float)
            .with_field("ground_truth", FieldKind::Classification)
            .with_field("filepath", FieldKind::String)
            .with_field("predictions", FieldKind::Detections)
            .with_field("count", FieldKind::Int)
            .with_field("tags", FieldKind::Other);

        assert_eq!(
            color_fields(&dataset),
            vec![
                "None",
                "ground_truth.label",
                "predictions.detections.label",
                "uniqueness",
                "count",
            ]
        );
    }

    #[test]
    fn empty_schema_offers_only_none() {
        assert_eq!(color_fields(&MemoryDataset::new("d")), vec!["None"]);
    }

    #[test]
    fn none_and_blank_mean_no_field() {
        assert_eq!(selected_color_field(None), None);
        assert_eq!(selected_color_field(Some("None")), None);
        assert_eq!(selected_color_field(Some("  ")), None);
        assert_eq!(
            selected_color_field(Some("ground_truth.label")),
            Some("ground_truth.label")
        );
    }
}
