// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Prompt text and declared output schemas for content generation.

use chrono::NaiveDate;
use serde_json::{json, Map, Value};

use crate::models::{RoutineCategory, TimeOfDay, UserProfile};
use crate::time_utils::age_on;

/// Age assumed when the profile has no birth date.
const DEFAULT_AGE: i32 = 30;

/// Scalar kind of a declared output field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
}

impl FieldKind {
    fn schema_type(&self) -> &'static str {
        match self {
            FieldKind::String => "STRING",
            FieldKind::Number => "NUMBER",
        }
    }
}

/// One field of a declared output record.
#[derive(Debug, Clone, Copy)]
pub struct SchemaField {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Permitted values, if the field is an enumeration
    pub allowed: Option<&'static [&'static str]>,
}

const fn field(name: &'static str, kind: FieldKind) -> SchemaField {
    SchemaField {
        name,
        kind,
        allowed: None,
    }
}

pub const ROUTINE_FIELDS: &[SchemaField] = &[
    field("id", FieldKind::String),
    field("title", FieldKind::String),
    field("description", FieldKind::String),
    SchemaField {
        name: "category",
        kind: FieldKind::String,
        allowed: Some(&RoutineCategory::ALL),
    },
    SchemaField {
        name: "timeOfDay",
        kind: FieldKind::String,
        allowed: Some(&TimeOfDay::ALL),
    },
    field("durationMinutes", FieldKind::Number),
];

pub const TIP_FIELDS: &[SchemaField] = &[
    field("id", FieldKind::String),
    field("title", FieldKind::String),
    field("content", FieldKind::String),
    field("sourceName", FieldKind::String),
    field("sourceUrl", FieldKind::String),
    field("category", FieldKind::String),
];

/// Render a list-of-records schema in the Gemini `responseSchema` dialect.
/// All fields are required.
pub fn array_schema(fields: &[SchemaField]) -> Value {
    let mut properties = Map::new();
    for f in fields {
        let mut prop = json!({ "type": f.kind.schema_type() });
        if let Some(allowed) = f.allowed {
            prop["enum"] = json!(allowed);
        }
        properties.insert(f.name.to_string(), prop);
    }

    let required: Vec<&str> = fields.iter().map(|f| f.name).collect();

    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": properties,
            "required": required,
        }
    })
}

fn age_for(profile: &UserProfile, today: NaiveDate) -> i32 {
    profile
        .details
        .birth_date
        .map(|birth| age_on(birth, today))
        .unwrap_or(DEFAULT_AGE)
}

fn or_unknown<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "not provided".to_string())
}

fn text_or_none(value: Option<&str>) -> &str {
    value.filter(|s| !s.trim().is_empty()).unwrap_or("none reported")
}

/// Prompt for a tailored daily routine.
pub fn routine_prompt(profile: &UserProfile, today: NaiveDate) -> String {
    let d = &profile.details;
    format!(
        "Based on the following user profile, generate a daily health routine.\n\
         Profile:\n\
         - Age: {age}\n\
         - BMI: {bmi}\n\
         - Smoker: {smoker}, Drinker: {drinker}\n\
         - Diet: {diet}\n\
         - Activity level: {activity}\n\
         - Health conditions: {health}\n\
         - Mental health: {mental}\n\
         - Work schedule: {work}\n\
         - Usual wake time: {wake}, bedtime: {sleep}\n\n\
         Create 5-7 distinct routine items covering exercise, diet/nutrition, sleep hygiene \
         and mental wellness. Tailor them to the constraints above (for example, suggest \
         light movement for a sedentary person). Each item needs a unique id, a category \
         from [{categories}], a time of day from [{times}] and a whole-number duration in \
         minutes.",
        age = age_for(profile, today),
        bmi = or_unknown(d.bmi),
        smoker = or_unknown(d.smoker),
        drinker = or_unknown(d.drinker),
        diet = d.diet.map(|v| v.label()).unwrap_or("not provided"),
        activity = d.exercise_frequency.map(|v| v.label()).unwrap_or("not provided"),
        health = text_or_none(d.health_conditions.as_deref()),
        mental = text_or_none(d.mental_conditions.as_deref()),
        work = text_or_none(d.work_schedule.as_deref()),
        wake = or_unknown(d.wake_time.as_deref()),
        sleep = or_unknown(d.sleep_time.as_deref()),
        categories = RoutineCategory::ALL.join(", "),
        times = TimeOfDay::ALL.join(", "),
    )
}

/// Prompt for search-grounded, cited daily tips.
pub fn tips_prompt(profile: &UserProfile, today: NaiveDate) -> String {
    let d = &profile.details;
    format!(
        "Find 5 specific, actionable health tips relevant to a person with this profile:\n\
         - Age: {age}\n\
         - BMI: {bmi}\n\
         - Health conditions: {health}\n\
         - Mental health: {mental}\n\n\
         Use web search and only rely on certified health sources (WHO, Mayo Clinic, CDC, \
         NHS, Harvard Health). Return a JSON array where each object has: id, title, \
         content (markdown), sourceName, sourceUrl, category. The sourceUrl must be a \
         direct link found via search.",
        age = age_for(profile, today),
        bmi = or_unknown(d.bmi),
        health = text_or_none(d.health_conditions.as_deref()),
        mental = text_or_none(d.mental_conditions.as_deref()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DietType, Identity};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_routine_schema_declares_enums() {
        let schema = array_schema(ROUTINE_FIELDS);
        let props = &schema["items"]["properties"];

        assert_eq!(schema["type"], "ARRAY");
        assert_eq!(props["durationMinutes"]["type"], "NUMBER");
        assert_eq!(
            props["category"]["enum"],
            json!(["exercise", "diet", "sleep", "mental", "work"])
        );
        assert!(props["title"].get("enum").is_none());
        assert_eq!(schema["items"]["required"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_prompt_uses_age_from_birth_date() {
        let mut profile = UserProfile::empty(&Identity::demo());
        profile.details.birth_date = NaiveDate::from_ymd_opt(1984, 6, 2);
        profile.details.diet = Some(DietType::Keto);
        profile.details.bmi = Some(24.2);

        let prompt = routine_prompt(&profile, today());

        assert!(prompt.contains("Age: 39"));
        assert!(prompt.contains("BMI: 24.2"));
        assert!(prompt.contains("Diet: Keto"));
    }

    #[test]
    fn test_prompt_defaults_age_without_birth_date() {
        let profile = UserProfile::empty(&Identity::demo());
        let prompt = tips_prompt(&profile, today());
        assert!(prompt.contains("Age: 30"));
        assert!(prompt.contains("Health conditions: none reported"));
    }
}
