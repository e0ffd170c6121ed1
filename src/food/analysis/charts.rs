//! Chart datasets derived from a NutritionRecord.
//!
//! Everything here is a pure projection: no I/O, and the same record always
//! yields the same datasets (colours included).

use serde::Serialize;

use crate::food::types::NutritionRecord;

/// Slice colours for the minerals chart, cycled by index.
pub const PALETTE: [&str; 6] = ["#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF", "#FF9F40"];

/// Light backgrounds for cooking-method and dish tags, cycled by index.
pub const TAG_PALETTE: [&str; 8] = [
    "hsl(0, 70%, 92%)",
    "hsl(45, 70%, 92%)",
    "hsl(90, 70%, 92%)",
    "hsl(135, 70%, 92%)",
    "hsl(180, 70%, 92%)",
    "hsl(225, 70%, 92%)",
    "hsl(270, 70%, 92%)",
    "hsl(315, 70%, 92%)",
];

const SODIUM_SCALE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Macros,
    Vitamins,
    Minerals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarPoint {
    pub name: &'static str,
    pub value: f64,
    pub fill: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarPoint {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
    pub fill: &'static str,
    /// Share of the whole series, 0–100.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub label: String,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub name: String,
    pub origin: String,
    pub description: String,
    pub health_benefits: Vec<String>,
    pub cooking_methods: Vec<Tag>,
    pub common_dishes: Vec<Tag>,
    pub tabs: Vec<Tab>,
    pub macros: Vec<BarPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vitamins: Option<Vec<RadarPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minerals: Option<Vec<PieSlice>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum AnalysisView {
    NoData,
    Dashboard(Dashboard),
}

impl AnalysisView {
    pub fn render(record: Option<&NutritionRecord>) -> Self {
        match record {
            None => AnalysisView::NoData,
            Some(record) => AnalysisView::Dashboard(Dashboard::from_record(record)),
        }
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        match self {
            AnalysisView::Dashboard(dashboard) => Some(dashboard),
            AnalysisView::NoData => None,
        }
    }
}

impl Dashboard {
    fn from_record(record: &NutritionRecord) -> Self {
        let vitamins = vitamins_series(record);
        let minerals = minerals_series(record);

        let mut tabs = vec![Tab::Macros];
        if vitamins.is_some() {
            tabs.push(Tab::Vitamins);
        }
        if minerals.is_some() {
            tabs.push(Tab::Minerals);
        }

        Self {
            name: record.name.clone(),
            origin: record.origin.clone(),
            description: record.description.clone(),
            health_benefits: record.health_benefits.clone(),
            cooking_methods: tags(&record.cooking_methods),
            common_dishes: tags(&record.common_dishes),
            tabs,
            macros: macro_series(record),
            vitamins,
            minerals,
        }
    }
}

pub fn macro_series(record: &NutritionRecord) -> Vec<BarPoint> {
    let n = &record.nutrition;
    vec![
        BarPoint { name: "Calories (kcal)", value: n.calories, fill: "#FF6384" },
        BarPoint { name: "Protein (g)", value: n.protein, fill: "#36A2EB" },
        BarPoint { name: "Fat (g)", value: n.fat, fill: "#FFCE56" },
        BarPoint { name: "Carbs (g)", value: n.carbs, fill: "#4BC0C0" },
        BarPoint { name: "Sugar (g)", value: n.sugar, fill: "#9966FF" },
        BarPoint { name: "Fiber (g)", value: n.fiber, fill: "#FF9F40" },
        BarPoint { name: "Sodium (mg/10)", value: n.sodium / SODIUM_SCALE, fill: "#C7C7C7" },
    ]
}

/// `None` when the record has no vitamin data, so the tab is not offered.
pub fn vitamins_series(record: &NutritionRecord) -> Option<Vec<RadarPoint>> {
    let vitamins = record.nutrition.vitamins.as_ref().filter(|v| !v.is_empty())?;
    Some(
        vitamins
            .iter()
            .map(|(name, value)| RadarPoint {
                name: name.to_string(),
                value,
            })
            .collect(),
    )
}

/// `None` when the record has no mineral data, so the tab is not offered.
pub fn minerals_series(record: &NutritionRecord) -> Option<Vec<PieSlice>> {
    let minerals = record.nutrition.minerals.as_ref().filter(|m| !m.is_empty())?;
    let total: f64 = minerals.values().sum();
    let count = minerals.len() as f64;

    Some(
        minerals
            .iter()
            .enumerate()
            .map(|(index, (name, value))| PieSlice {
                name: name.to_string(),
                value,
                fill: PALETTE[index % PALETTE.len()],
                // An all-zero series is split evenly rather than dividing by zero.
                percent: if total > 0.0 { value / total * 100.0 } else { 100.0 / count },
            })
            .collect(),
    )
}

pub fn tags(labels: &[String]) -> Vec<Tag> {
    labels
        .iter()
        .enumerate()
        .map(|(index, label)| Tag {
            label: label.clone(),
            color: TAG_PALETTE[index % TAG_PALETTE.len()],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::types::fixtures;
    use crate::food::types::NutrientTable;

    #[test]
    fn test_no_record_renders_no_data() {
        assert_eq!(AnalysisView::render(None), AnalysisView::NoData);
    }

    #[test]
    fn test_macro_series_scales_sodium() {
        let mut record = fixtures::apple();
        record.nutrition.sodium = 480.0;

        let macros = macro_series(&record);

        assert_eq!(macros.len(), 7);
        assert_eq!(macros[6].name, "Sodium (mg/10)");
        assert_eq!(macros[6].value, 48.0);
        assert_eq!(macros[0].value, 95.0);
    }

    #[test]
    fn test_empty_minerals_hide_minerals_tab() {
        let mut record = fixtures::apple();
        record.nutrition.minerals = Some(NutrientTable::new());

        let view = AnalysisView::render(Some(&record));
        let dashboard = view.dashboard().unwrap();

        assert_eq!(dashboard.tabs, vec![Tab::Macros, Tab::Vitamins]);
        assert!(dashboard.minerals.is_none());
    }

    #[test]
    fn test_absent_vitamins_hide_vitamins_tab() {
        let mut record = fixtures::apple();
        record.nutrition.vitamins = None;

        let view = AnalysisView::render(Some(&record));

        assert_eq!(view.dashboard().unwrap().tabs, vec![Tab::Macros, Tab::Minerals]);
    }

    #[test]
    fn test_single_mineral_is_whole_pie() {
        let mut record = fixtures::apple();
        record.nutrition.minerals = Some(NutrientTable::from_iter([("Iron", 18.0)]));

        let slices = minerals_series(&record).unwrap();

        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].name, "Iron");
        assert_eq!(slices[0].value, 18.0);
        assert_eq!(slices[0].percent, 100.0);
    }

    #[test]
    fn test_mineral_slices_follow_source_order() {
        let mut record = fixtures::apple();
        record.nutrition.minerals = Some(NutrientTable::from_iter([
            ("Potassium", 6.0),
            ("Magnesium", 2.0),
        ]));

        let slices = minerals_series(&record).unwrap();

        assert_eq!(slices[0].name, "Potassium");
        assert_eq!(slices[0].fill, PALETTE[0]);
        assert_eq!(slices[1].name, "Magnesium");
        assert_eq!(slices[1].fill, PALETTE[1]);
        assert_eq!(slices[0].percent, 75.0);
    }

    #[test]
    fn test_mineral_colours_cycle_through_palette() {
        let mut record = fixtures::apple();
        record.nutrition.minerals = Some(
            (0..8).map(|i| (format!("Mineral {}", i), 1.0)).collect(),
        );

        let slices = minerals_series(&record).unwrap();

        assert_eq!(slices[0].fill, PALETTE[0]);
        assert_eq!(slices[6].fill, PALETTE[0]);
        assert_eq!(slices[7].fill, PALETTE[1]);
    }

    #[test]
    fn test_render_is_deterministic() {
        let record = fixtures::apple();
        assert_eq!(
            AnalysisView::render(Some(&record)),
            AnalysisView::render(Some(&record))
        );
        assert_eq!(tags(&record.cooking_methods)[1].color, TAG_PALETTE[1]);
    }

    #[test]
    fn test_view_serializes_with_state_tag() {
        let json = serde_json::to_value(AnalysisView::render(None)).unwrap();
        assert_eq!(json["state"], "noData");
    }
}
