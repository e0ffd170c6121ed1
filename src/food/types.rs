use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use validator::{Validate, ValidationError};

/// Label returned when the recognition service answers without any candidate.
pub const UNKNOWN_FOOD: &str = "Unknown Food";

/// Placeholder attached to every looked-up record; images are not persisted.
pub const PLACEHOLDER_IMAGE_URL: &str = "/api/placeholder/400/300";

/// Best-guess name of the food shown in an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoodLabel(String);

impl FoodLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN_FOOD.to_string())
    }

    /// The sentinel is a valid but low-confidence result, not an error.
    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_FOOD
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Nutrient name to percent of daily value, in the order the source listed them.
///
/// A repeated name keeps its first position and takes the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NutrientTable(Vec<(String, f64)>);

impl NutrientTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.iter().find(|(existing, _)| existing == name).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().map(|(_, value)| *value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for NutrientTable {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, value) in iter {
            table.insert(name, value);
        }
        table
    }
}

impl Serialize for NutrientTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for NutrientTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = NutrientTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of nutrient names to numbers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = NutrientTable::new();
                while let Some((name, value)) = access.next_entry::<String, f64>()? {
                    table.insert(name, value);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_nutrition_facts"))]
pub struct NutritionFacts {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub sugar: f64,
    pub fiber: f64,
    pub sodium: f64,
    /// Percent of daily value, keyed by vitamin name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamins: Option<NutrientTable>,
    /// Percent of daily value, keyed by mineral name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minerals: Option<NutrientTable>,
}

impl NutritionFacts {
    fn amounts(&self) -> [(&'static str, f64); 7] {
        [
            ("calories", self.calories),
            ("protein", self.protein),
            ("fat", self.fat),
            ("carbs", self.carbs),
            ("sugar", self.sugar),
            ("fiber", self.fiber),
            ("sodium", self.sodium),
        ]
    }
}

fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn validate_nutrition_facts(facts: &NutritionFacts) -> Result<(), ValidationError> {
    if let Some((field, _)) = facts.amounts().iter().find(|(_, v)| !is_valid_amount(*v)) {
        let mut error = ValidationError::new("negative_amount");
        error.add_param("field".into(), field);
        return Err(error);
    }

    let percentages = facts
        .vitamins
        .iter()
        .chain(facts.minerals.iter())
        .flat_map(|map| map.iter());
    for (name, value) in percentages {
        if !is_valid_amount(value) {
            let mut error = ValidationError::new("negative_percentage");
            error.add_param("field".into(), &name);
            return Err(error);
        }
    }

    Ok(())
}

/// Structured result of a food lookup.
///
/// Created once per successful analysis and overwritten wholesale by the next
/// one. Absent list or text fields deserialize as empty and unknown fields are
/// ignored, so records written by older or newer builds still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NutritionRecord {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub health_benefits: Vec<String>,
    #[serde(default)]
    pub cooking_methods: Vec<String>,
    #[serde(default)]
    pub common_dishes: Vec<String>,
    #[validate]
    pub nutrition: NutritionFacts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn apple() -> NutritionRecord {
        NutritionRecord {
            name: "Apple".to_string(),
            description: "A crisp, sweet pome fruit.".to_string(),
            origin: "Central Asia".to_string(),
            health_benefits: vec!["Rich in fiber".to_string(), "Supports heart health".to_string()],
            cooking_methods: vec!["Raw".to_string(), "Baked".to_string(), "Stewed".to_string()],
            common_dishes: vec!["Apple pie".to_string(), "Apple sauce".to_string()],
            nutrition: NutritionFacts {
                calories: 95.0,
                protein: 0.5,
                fat: 0.3,
                carbs: 25.0,
                sugar: 19.0,
                fiber: 4.4,
                sodium: 2.0,
                vitamins: Some(NutrientTable::from_iter([("Vitamin A", 2.0), ("Vitamin C", 14.0)])),
                minerals: Some(NutrientTable::from_iter([("Iron", 1.0), ("Potassium", 6.0)])),
            },
            image_url: None,
        }
    }
}
