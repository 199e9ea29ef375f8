//! Field rules shared by every writable resource. Messages mirror the wording
//! clients already handle.

use validator::{ValidationError, ValidationErrors};

use crate::errors::FieldErrors;

pub const BLANK: &str = "This field may not be blank.";
pub const REQUIRED: &str = "This field is required.";

/// Required text: must be present and non-blank.
pub fn required(errs: &mut FieldErrors, field: &str, value: Option<&str>) {
    match value {
        None => errs.add(field, REQUIRED),
        Some(v) if v.trim().is_empty() => errs.add(field, BLANK),
        Some(_) => {}
    }
}

/// Present-but-blank check for fields that are only required on create/replace.
pub fn not_blank(errs: &mut FieldErrors, field: &str, value: Option<&str>) {
    if let Some(v) = value {
        if v.trim().is_empty() {
            errs.add(field, BLANK);
        }
    }
}

/// Fold `validator` results into `errs`. `rename` maps struct field names to
/// wire names where they differ.
pub fn collect(errs: &mut FieldErrors, result: Result<(), ValidationErrors>, rename: &[(&str, &str)]) {
    let Err(found) = result else { return };
    for (field, list) in found.field_errors() {
        let field = field.to_string();
        let wire = rename
            .iter()
            .find(|(from, _)| *from == field)
            .map(|(_, to)| *to)
            .unwrap_or(field.as_str());
        for e in list.iter() {
            errs.add(wire, message_for(e));
        }
    }
}

/// Whole numbers print without a fractional part.
fn number(v: &serde_json::Value) -> String {
    match v.as_f64() {
        Some(f) if f.fract() == 0.0 => format!("{}", f as i64),
        _ => v.to_string(),
    }
}

fn message_for(e: &ValidationError) -> String {
    if let Some(msg) = &e.message {
        return msg.to_string();
    }
    let param = |k: &str| e.params.get(k).map(number).unwrap_or_default();
    match &*e.code {
        "length" => format!("Ensure this field has no more than {} characters.", param("max")),
        "email" => "Enter a valid email address.".to_string(),
        "range" => {
            let below = match (e.params.get("value").and_then(|v| v.as_f64()), e.params.get("min").and_then(|v| v.as_f64())) {
                (Some(v), Some(min)) => v < min,
                _ => false,
            };
            if below {
                format!("Ensure this value is greater than or equal to {}.", param("min"))
            } else {
                format!("Ensure this value is less than or equal to {}.", param("max"))
            }
        }
        other => format!("Invalid value ({other})."),
    }
}

pub fn required_value<T>(errs: &mut FieldErrors, field: &str, value: &Option<T>) {
    if value.is_none() {
        errs.add(field, REQUIRED);
    }
}
