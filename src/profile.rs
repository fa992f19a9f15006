//! User profile collected by the intake flow, and the categories resolved from it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// Dominant constitutional category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Dosha {
    #[default]
    Vata,
    Pitta,
    Kapha,
}

impl Dosha {
    /// Resolve a free-form label (as returned by the classifier or typed by a
    /// user). Matching is a case-insensitive substring search in the order
    /// VATA, PITTA, KAPHA; anything else resolves to the default, VATA.
    pub fn resolve(label: &str) -> Self {
        let upper = label.to_uppercase();
        if upper.contains("VATA") {
            Self::Vata
        } else if upper.contains("PITTA") {
            Self::Pitta
        } else if upper.contains("KAPHA") {
            Self::Kapha
        } else {
            Self::default()
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vata => "VATA",
            Self::Pitta => "PITTA",
            Self::Kapha => "KAPHA",
        }
    }
}

impl std::fmt::Display for Dosha {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diet type selected in the dietary preferences step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietType {
    #[default]
    Vegetarian,
    Vegan,
    NonVegetarian,
    Eggetarian,
    Jain,
}

impl DietType {
    /// Parse a form value. Unset or unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "vegetarian" => Some(Self::Vegetarian),
            "vegan" => Some(Self::Vegan),
            "non-vegetarian" | "non_vegetarian" | "nonvegetarian" => Some(Self::NonVegetarian),
            "eggetarian" => Some(Self::Eggetarian),
            "jain" => Some(Self::Jain),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vegetarian => "vegetarian",
            Self::Vegan => "vegan",
            Self::NonVegetarian => "non-vegetarian",
            Self::Eggetarian => "eggetarian",
            Self::Jain => "jain",
        }
    }
}

impl std::fmt::Display for DietType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the intake flow collected about one person.
///
/// Field names follow the JSON the backend expects. Every field is optional on
/// input and null means unset. Numbers and booleans in text fields are read as
/// their text. Keys this struct does not know are kept in `extra` and sent back
/// out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    // Personal information
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub age: String,
    #[serde(deserialize_with = "lenient::text")]
    pub gender: String,
    #[serde(deserialize_with = "lenient::text")]
    pub height: String,
    #[serde(deserialize_with = "lenient::text")]
    pub weight: String,
    #[serde(deserialize_with = "lenient::text")]
    pub activity_level: String,

    // Health information
    #[serde(deserialize_with = "lenient::list")]
    pub health_conditions: Vec<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub allergies: Vec<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub medications: String,

    // Prakriti assessment
    #[serde(deserialize_with = "lenient::text")]
    pub dominant_dosha: String,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub body_size: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub body_weight: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub height_attr: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub bone_structure: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub complexion: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub skin_feel: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub skin_texture: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub face_shape: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub eye_type: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub appetite: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub digestion_quality: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub sleep_pattern: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub stress_level: Option<String>,

    // Dietary preferences
    #[serde(deserialize_with = "lenient::text")]
    pub diet_type: String,
    #[serde(deserialize_with = "lenient::list")]
    pub food_preferences: Vec<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub disliked_foods: Vec<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub meal_timing: String,
    #[serde(deserialize_with = "lenient::text")]
    pub cooking_time: String,
    #[serde(deserialize_with = "lenient::text")]
    pub budget: String,

    // Goals
    #[serde(deserialize_with = "lenient::list")]
    pub health_goals: Vec<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub weight_goal: String,
    #[serde(deserialize_with = "lenient::text")]
    pub timeframe: String,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Form values as the intake flow actually sends them.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(scalar(Value::deserialize(deserializer)?).unwrap_or_default())
    }

    pub fn optional_text<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(scalar(Value::deserialize(deserializer)?))
    }

    /// An array of scalars, or a single scalar as a one-item list.
    pub fn list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items.into_iter().filter_map(scalar).collect(),
            other => scalar(other).filter(|s| !s.trim().is_empty()).into_iter().collect(),
        })
    }
}

impl Profile {
    /// Load a profile from a JSON file.
    pub async fn load(path: &Path) -> Result<Self, ProfileError> {
        let raw = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// The resolved dominant dosha (VATA when unset or unrecognized).
    pub fn dosha(&self) -> Dosha {
        Dosha::resolve(&self.dominant_dosha)
    }

    /// The diet type, if one was chosen and is recognized.
    pub fn diet(&self) -> Option<DietType> {
        DietType::parse(&self.diet_type)
    }
}

/// The fixed attribute record the classification service is trained on.
///
/// Questions the intake flow does not ask are sent with constant answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrakritiAttributes {
    #[serde(rename = "Body Size")]
    pub body_size: String,
    #[serde(rename = "Body Weight")]
    pub body_weight: String,
    #[serde(rename = "Height")]
    pub height: String,
    #[serde(rename = "Bone Structure")]
    pub bone_structure: String,
    #[serde(rename = "Complexion")]
    pub complexion: String,
    #[serde(rename = "General feel of skin")]
    pub skin_feel: String,
    #[serde(rename = "Texture of Skin")]
    pub skin_texture: String,
    #[serde(rename = "Hair Color")]
    pub hair_color: String,
    #[serde(rename = "Appearance of Hair")]
    pub hair_appearance: String,
    #[serde(rename = "Shape of face")]
    pub face_shape: String,
    #[serde(rename = "Eyes")]
    pub eyes: String,
    #[serde(rename = "Eyelashes")]
    pub eyelashes: String,
    #[serde(rename = "Blinking of Eyes")]
    pub blinking: String,
    #[serde(rename = "Cheeks")]
    pub cheeks: String,
    #[serde(rename = "Nose")]
    pub nose: String,
    #[serde(rename = "Teeth and gums")]
    pub teeth_and_gums: String,
    #[serde(rename = "Lips")]
    pub lips: String,
    #[serde(rename = "Nails")]
    pub nails: String,
    #[serde(rename = "Appetite")]
    pub appetite: String,
    #[serde(rename = "Liking tastes")]
    pub liking_tastes: String,
    #[serde(rename = "Metabolism Type")]
    pub metabolism: String,
    #[serde(rename = "Climate Preference")]
    pub climate_preference: String,
    #[serde(rename = "Stress Levels")]
    pub stress_levels: String,
    #[serde(rename = "Sleep Patterns")]
    pub sleep_patterns: String,
    #[serde(rename = "Dietary Habits")]
    pub dietary_habits: String,
    #[serde(rename = "Physical Activity Level")]
    pub physical_activity: String,
    #[serde(rename = "Water Intake")]
    pub water_intake: String,
    #[serde(rename = "Digestion Quality")]
    pub digestion_quality: String,
    #[serde(rename = "Skin Sensitivity")]
    pub skin_sensitivity: String,
}

impl PrakritiAttributes {
    /// Build the classifier request from a profile's assessment answers.
    pub fn from_profile(profile: &Profile) -> Self {
        fn answer(value: &Option<String>, default: &str) -> String {
            value
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(default)
                .to_string()
        }
        let fixed = |s: &str| s.to_string();

        Self {
            body_size: answer(&profile.body_size, "Medium"),
            body_weight: answer(&profile.body_weight, "Moderate - steady weight"),
            height: answer(&profile.height_attr, "Average"),
            bone_structure: answer(&profile.bone_structure, "Medium"),
            complexion: answer(&profile.complexion, "Fair"),
            skin_feel: answer(&profile.skin_feel, "Smooth"),
            skin_texture: answer(&profile.skin_texture, "Normal"),
            hair_color: fixed("Black"),
            hair_appearance: fixed("Straight"),
            face_shape: answer(&profile.face_shape, "Oval"),
            eyes: answer(&profile.eye_type, "Medium"),
            eyelashes: fixed("Normal"),
            blinking: fixed("Normal"),
            cheeks: fixed("Normal"),
            nose: fixed("Normal"),
            teeth_and_gums: fixed("Normal"),
            lips: fixed("Normal"),
            nails: fixed("Normal"),
            appetite: answer(&profile.appetite, "Normal"),
            liking_tastes: fixed("Sweet"),
            metabolism: fixed("Normal"),
            climate_preference: fixed("Temperate"),
            stress_levels: answer(&profile.stress_level, "Moderate"),
            sleep_patterns: answer(&profile.sleep_pattern, "Normal"),
            dietary_habits: fixed("Vegetarian"),
            physical_activity: fixed("Moderate"),
            water_intake: fixed("Normal"),
            digestion_quality: answer(&profile.digestion_quality, "Normal"),
            skin_sensitivity: fixed("Low"),
        }
    }
}
