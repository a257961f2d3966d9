//! Write-side validation for tour records.
//!
//! `NewTour` is the loosely typed shape of a tour as it arrives from seed data
//! or an administrative insert. Validating it either produces field-scoped
//! [`ValidationErrors`] or a [`ValidTour`], which is the only input a
//! repository accepts for writes.

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::tour::{Availability, TourStatus};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTour {
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub days: Option<Number>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_city: Option<String>,
    pub end_city: Option<String>,
    pub seats_available: Option<Number>,
    pub seats_booked: Option<Number>,
    pub seats_maximum: Option<Number>,
    pub status: Option<TourStatus>,
}

/// A tour that passed validation. Only obtainable through [`NewTour::into_valid`]
/// and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTour {
    external_id: String,
    name: String,
    days: i32,
    start_date: NaiveDate,
    end_date: NaiveDate,
    start_city: String,
    end_city: String,
    seats_available: i32,
    seats_booked: i32,
    seats_maximum: i32,
    status: TourStatus,
}

impl ValidTour {
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn days(&self) -> i32 {
        self.days
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn start_city(&self) -> &str {
        &self.start_city
    }

    pub fn end_city(&self) -> &str {
        &self.end_city
    }

    pub fn seats_available(&self) -> i32 {
        self.seats_available
    }

    pub fn seats_booked(&self) -> i32 {
        self.seats_booked
    }

    pub fn seats_maximum(&self) -> i32 {
        self.seats_maximum
    }

    pub fn status(&self) -> TourStatus {
        self.status
    }

    pub fn availability(&self) -> Availability {
        Availability::from_seats(self.seats_available)
    }
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Any,
    GreaterThan(i64),
    AtLeast(i64),
}

const BLANK: &str = "can't be blank";
const NOT_A_NUMBER: &str = "is not a number";

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Reads one attribute, recording a field error when it has the wrong JSON type.
fn attribute<T: DeserializeOwned>(
    errors: &mut ValidationErrors,
    attributes: &Map<String, Value>,
    field: &'static str,
    message: &'static str,
) -> Option<T> {
    match attributes.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => match T::deserialize(value) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                errors.add(field, error("invalid_type", message));
                None
            }
        },
    }
}

fn present_text(errors: &mut ValidationErrors, field: &'static str, value: &Option<String>) -> Option<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Some(text.clone()),
        _ => {
            errors.add(field, error("blank", BLANK));
            None
        }
    }
}

fn present_date(errors: &mut ValidationErrors, field: &'static str, value: Option<NaiveDate>) -> Option<NaiveDate> {
    if value.is_none() {
        errors.add(field, error("blank", BLANK));
    }
    value
}

fn integer(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&Number>,
    missing: &'static str,
    bound: Bound,
) -> Option<i32> {
    let Some(number) = value else {
        let code = if missing == BLANK { "blank" } else { "not_a_number" };
        errors.add(field, error(code, missing));
        return None;
    };

    let Some(whole) = number.as_i64() else {
        if number.is_u64() {
            errors.add(field, error("out_of_range", "is out of range"));
        } else {
            errors.add(field, error("not_an_integer", "must be an integer"));
        }
        return None;
    };

    match bound {
        Bound::GreaterThan(min) if whole <= min => {
            errors.add(field, error("greater_than", "must be greater than 0"));
            return None;
        }
        Bound::AtLeast(min) if whole < min => {
            errors.add(field, error("greater_than_or_equal_to", "must be greater than or equal to 0"));
            return None;
        }
        _ => {}
    }

    match i32::try_from(whole) {
        Ok(v) => Some(v),
        Err(_) => {
            errors.add(field, error("out_of_range", "is out of range"));
            None
        }
    }
}

impl NewTour {
    /// Builds a `NewTour` from a JSON object of attributes. Values of the wrong
    /// type are reported on their own field instead of failing the whole record.
    pub fn from_json(value: &Value) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let Some(attributes) = value.as_object() else {
            errors.add("__all__", error("not_an_object", "must be an object of tour attributes"));
            return Err(errors);
        };

        let tour = NewTour {
            external_id: attribute(&mut errors, attributes, "external_id", "must be text"),
            name: attribute(&mut errors, attributes, "name", "must be text"),
            days: attribute(&mut errors, attributes, "days", NOT_A_NUMBER),
            start_date: attribute(&mut errors, attributes, "start_date", "is not a valid date"),
            end_date: attribute(&mut errors, attributes, "end_date", "is not a valid date"),
            start_city: attribute(&mut errors, attributes, "start_city", "must be text"),
            end_city: attribute(&mut errors, attributes, "end_city", "must be text"),
            seats_available: attribute(&mut errors, attributes, "seats_available", NOT_A_NUMBER),
            seats_booked: attribute(&mut errors, attributes, "seats_booked", NOT_A_NUMBER),
            seats_maximum: attribute(&mut errors, attributes, "seats_maximum", NOT_A_NUMBER),
            status: attribute(&mut errors, attributes, "status", "is not included in the list"),
        };

        if errors.errors().is_empty() {
            Ok(tour)
        } else {
            Err(errors)
        }
    }

    /// Validates every field and the cross-field rules, collecting all failures.
    pub fn into_valid(self) -> Result<ValidTour, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let external_id = present_text(&mut errors, "external_id", &self.external_id);
        let name = present_text(&mut errors, "name", &self.name);
        let days = integer(&mut errors, "days", self.days.as_ref(), BLANK, Bound::GreaterThan(0));
        let start_date = present_date(&mut errors, "start_date", self.start_date);
        let end_date = present_date(&mut errors, "end_date", self.end_date);
        let start_city = present_text(&mut errors, "start_city", &self.start_city);
        let end_city = present_text(&mut errors, "end_city", &self.end_city);
        let seats_available = integer(&mut errors, "seats_available", self.seats_available.as_ref(), NOT_A_NUMBER, Bound::Any);
        let seats_booked = integer(&mut errors, "seats_booked", self.seats_booked.as_ref(), NOT_A_NUMBER, Bound::AtLeast(0));
        let seats_maximum = integer(&mut errors, "seats_maximum", self.seats_maximum.as_ref(), NOT_A_NUMBER, Bound::GreaterThan(0));

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                errors.add(
                    "end_date",
                    error("end_date_before_start_date", "must be equal to or after the start date"),
                );
            }
        }

        if let (Some(available), Some(maximum)) = (seats_available, seats_maximum) {
            if available > maximum {
                errors.add(
                    "seats_available",
                    error("seats_available_exceeds_maximum", "cannot exceed the maximum number of seats"),
                );
            }
        }

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        match (
            external_id,
            name,
            days,
            start_date,
            end_date,
            start_city,
            end_city,
            seats_available,
            seats_booked,
            seats_maximum,
        ) {
            (
                Some(external_id),
                Some(name),
                Some(days),
                Some(start_date),
                Some(end_date),
                Some(start_city),
                Some(end_city),
                Some(seats_available),
                Some(seats_booked),
                Some(seats_maximum),
            ) => Ok(ValidTour {
                external_id,
                name,
                days,
                start_date,
                end_date,
                start_city,
                end_city,
                seats_available,
                seats_booked,
                seats_maximum,
                status: self.status.unwrap_or_default(),
            }),
            // every None above recorded an error
            _ => Err(errors),
        }
    }
}

impl Validate for NewTour {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.clone().into_valid().map(|_| ())
    }
}
