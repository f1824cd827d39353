use serde_json::{Map, Value};

use crate::entities::{NewTransaction, TransactionCore, MAX_GENDER_LEN, MAX_TEXT_LEN};
use crate::errors::ValidationErrors;
use crate::value_objects::ProcessedAt;

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const INVALID_STRING: &str = "Not a valid string.";
const INVALID_NUMBER: &str = "A valid number is required.";
const INVALID_INTEGER: &str = "A valid integer is required.";
const INVALID_DATETIME: &str = "Datetime has wrong format.";
const NON_POSITIVE_AMOUNT: &str = "Transaction amount must be positive";

/// Validates an inbound prediction payload field by field.
///
/// Every field is checked before returning so the caller gets the full
/// error map in one response.
pub fn validate_transaction(payload: &Value) -> Result<NewTransaction, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let Some(object) = payload.as_object() else {
        errors.add(
            "non_field_errors",
            "Invalid data. Expected a dictionary.",
        );
        return Err(errors);
    };

    let merchant = text_field(object, "merchant", MAX_TEXT_LEN, &mut errors);
    let category = text_field(object, "category", MAX_TEXT_LEN, &mut errors);
    let amt = number_field(object, "amt", &mut errors);
    let gender = text_field(object, "gender", MAX_GENDER_LEN, &mut errors);
    let city = text_field(object, "city", MAX_TEXT_LEN, &mut errors);
    let province = text_field(object, "province", MAX_TEXT_LEN, &mut errors);
    let latitude = number_field(object, "latitude", &mut errors);
    let longitude = number_field(object, "longitude", &mut errors);
    let city_pop = integer_field(object, "city_pop", &mut errors);
    let job = text_field(object, "job", MAX_TEXT_LEN, &mut errors);
    let unix_time = integer_field(object, "unix_time", &mut errors);
    let merch_latitude = number_field(object, "merch_latitude", &mut errors);
    let merch_longitude = number_field(object, "merch_longitude", &mut errors);
    let processed_at = processed_at_field(object, &mut errors);

    if let Some(value) = amt {
        if value <= 0.0 {
            errors.add("amt", NON_POSITIVE_AMOUNT);
        }
    }
    check_range(latitude, "latitude", 90.0, "Invalid latitude", &mut errors);
    check_range(longitude, "longitude", 180.0, "Invalid longitude", &mut errors);
    check_range(
        merch_latitude,
        "merch_latitude",
        90.0,
        "Invalid merchant latitude",
        &mut errors,
    );
    check_range(
        merch_longitude,
        "merch_longitude",
        180.0,
        "Invalid merchant longitude",
        &mut errors,
    );

    if !errors.is_empty() {
        return Err(errors);
    }

    match (
        merchant,
        category,
        amt,
        gender,
        city,
        province,
        latitude,
        longitude,
        city_pop,
        job,
        unix_time,
        merch_latitude,
        merch_longitude,
    ) {
        (
            Some(merchant),
            Some(category),
            Some(amt),
            Some(gender),
            Some(city),
            Some(province),
            Some(latitude),
            Some(longitude),
            Some(city_pop),
            Some(job),
            Some(unix_time),
            Some(merch_latitude),
            Some(merch_longitude),
        ) => Ok(NewTransaction {
            core: TransactionCore {
                merchant,
                category,
                amt,
                gender,
                city,
                province,
                latitude,
                longitude,
                city_pop,
                job,
                unix_time,
                merch_latitude,
                merch_longitude,
            },
            processed_at,
        }),
        _ => {
            errors.add("non_field_errors", "Incomplete transaction payload.");
            Err(errors)
        }
    }
}

fn check_range(
    value: Option<f64>,
    field: &str,
    bound: f64,
    message: &str,
    errors: &mut ValidationErrors,
) {
    if let Some(value) = value {
        if !(-bound..=bound).contains(&value) {
            errors.add(field, message);
        }
    }
}

fn present<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a Value> {
    match object.get(field) {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(Value::Null) => {
            errors.add(field, NOT_NULL);
            None
        }
        Some(value) => Some(value),
    }
}

fn text_field(
    object: &Map<String, Value>,
    field: &str,
    max_len: usize,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let value = present(object, field, errors)?;
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => {
            errors.add(field, INVALID_STRING);
            return None;
        }
    };
    if text.is_empty() {
        errors.add(field, NOT_BLANK);
        return None;
    }
    if text.chars().count() > max_len {
        errors.add(
            field,
            format!("Ensure this field has no more than {} characters.", max_len),
        );
        return None;
    }
    Some(text)
}

fn number_field(object: &Map<String, Value>, field: &str, errors: &mut ValidationErrors) -> Option<f64> {
    let value = present(object, field, errors)?;
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(number) if number.is_finite() => Some(number),
        _ => {
            errors.add(field, INVALID_NUMBER);
            None
        }
    }
}

fn integer_field(object: &Map<String, Value>, field: &str, errors: &mut ValidationErrors) -> Option<i64> {
    let value = present(object, field, errors)?;
    let number = match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.fract() == 0.0 && float.abs() < i64::MAX as f64)
                .map(|float| float as i64)
        }),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };
    if number.is_none() {
        errors.add(field, INVALID_INTEGER);
    }
    number
}

fn processed_at_field(object: &Map<String, Value>, errors: &mut ValidationErrors) -> Option<ProcessedAt> {
    match object.get("processed_at") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.trim().is_empty() => None,
        Some(Value::String(text)) => {
            let parsed = ProcessedAt::parse(text);
            if parsed.is_none() {
                errors.add("processed_at", INVALID_DATETIME);
            }
            parsed
        }
        Some(_) => {
            errors.add("processed_at", INVALID_DATETIME);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "merchant": "Amazon",
            "category": "Electronics",
            "amt": 1200.5,
            "gender": "M",
            "city": "Harare",
            "province": "Harare",
            "latitude": -17.83,
            "longitude": 31.05,
            "city_pop": 1_500_000,
            "job": "Engineer",
            "unix_time": 1_709_996_400,
            "merch_latitude": -17.9,
            "merch_longitude": 31.1
        })
    }

    #[test]
    fn accepts_complete_payload() {
        let transaction = validate_transaction(&payload()).expect("valid");
        assert_eq!(transaction.core.merchant, "Amazon");
        assert_eq!(transaction.core.city_pop, 1_500_000);
        assert!(transaction.processed_at.is_none());
    }

    #[test]
    fn accepts_numeric_strings_and_processed_at() {
        let mut body = payload();
        body["amt"] = json!("99.90");
        body["unix_time"] = json!("1709996400");
        body["processed_at"] = json!("2024-03-09T15:00:00");
        let transaction = validate_transaction(&body).expect("valid");
        assert_eq!(transaction.core.amt, 99.9);
        assert!(transaction.processed_at.expect("processed_at").is_naive());
    }

    #[test]
    fn rejects_non_positive_amounts() {
        for amount in [0.0, -1.0, -2500.75] {
            let mut body = payload();
            body["amt"] = json!(amount);
            let errors = validate_transaction(&body).expect_err("invalid amount");
            assert_eq!(errors.messages("amt"), [NON_POSITIVE_AMOUNT.to_string()]);
        }
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let mut body = payload();
        body["latitude"] = json!(90.5);
        body["longitude"] = json!(-180.01);
        let errors = validate_transaction(&body).expect_err("invalid coordinates");
        assert_eq!(errors.messages("latitude"), ["Invalid latitude".to_string()]);
        assert_eq!(errors.messages("longitude"), ["Invalid longitude".to_string()]);
    }

    #[test]
    fn boundary_coordinates_are_valid() {
        let mut body = payload();
        body["latitude"] = json!(-90.0);
        body["longitude"] = json!(180.0);
        assert!(validate_transaction(&body).is_ok());
    }

    #[test]
    fn reports_every_missing_and_malformed_field() {
        let body = json!({
            "merchant": "",
            "amt": "lots",
            "city_pop": 12.5,
            "processed_at": "not a date"
        });
        let errors = validate_transaction(&body).expect_err("invalid");
        assert_eq!(errors.messages("merchant"), [NOT_BLANK.to_string()]);
        assert_eq!(errors.messages("amt"), [INVALID_NUMBER.to_string()]);
        assert_eq!(errors.messages("city_pop"), [INVALID_INTEGER.to_string()]);
        assert_eq!(errors.messages("category"), [REQUIRED.to_string()]);
        assert_eq!(errors.messages("processed_at"), [INVALID_DATETIME.to_string()]);
    }

    #[test]
    fn rejects_non_object_bodies() {
        let errors = validate_transaction(&json!([1, 2, 3])).expect_err("not an object");
        assert!(errors.contains("non_field_errors"));
    }

    #[test]
    fn enforces_text_length() {
        let mut body = payload();
        body["gender"] = json!("x".repeat(11));
        let errors = validate_transaction(&body).expect_err("too long");
        assert!(errors.contains("gender"));
    }
}
