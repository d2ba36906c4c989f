//! Employee records.

use crate::error::CoreError;
use crate::validation::{check_length, check_non_negative, FieldReader};
use chrono::{Datelike, NaiveDate};
use hrnet_protocol::{from_document, Tagged};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::ops::RangeInclusive;

/// Maximum length of an employee name, in characters.
pub const MAX_NAME_LEN: usize = 35;

/// Years of birth accepted for an employee.
pub const BIRTH_YEARS: RangeInclusive<i64> = 1951..=2020;

/// Length of PAN and Aadhar numbers.
pub const ID_NUMBER_LEN: usize = 10;

/// Answers whether a designation code exists.
///
/// Employee validation goes through this so it can be run against whatever
/// currently holds the designation table.
pub trait DesignationLookup {
    fn designation_exists(&self, code: i64) -> Result<bool, CoreError>;
}

/// Employee gender, written as `"M"` or `"F"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parses a single `M`, `m`, `F` or `f`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "M" | "m" => Some(Gender::Male),
            "F" | "f" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Gender {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Gender::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid gender: {:?}", s)))
    }
}

/// `indian` travels as `0` or `1`.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(i64::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match i64::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            n => Err(serde::de::Error::custom(format!("expected 0 or 1, got {}", n))),
        }
    }
}

/// An employee record.
///
/// `emp_id` 0 means "not yet assigned". `dob` is derived from the
/// day/month/year triple when the record is validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub emp_id: i64,
    pub name: String,
    pub designation_code: i64,
    pub date: i64,
    pub month: i64,
    pub year: i64,
    pub salary: f64,
    pub gender: Gender,
    #[serde(with = "flag")]
    pub indian: bool,
    pub pan_no: String,
    pub aadhar: String,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
}

impl Tagged for Employee {
    const TYPE_TAG: &'static str = "Employee";
}

impl Employee {
    /// Sets the day/month/year fields and `dob` from `date`.
    pub fn set_birth_date(&mut self, date: NaiveDate) {
        self.date = i64::from(date.day());
        self.month = i64::from(date.month());
        self.year = i64::from(date.year());
        self.dob = Some(date);
    }

    /// Returns the date of birth, from `dob` or the day/month/year fields.
    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.dob
            .or_else(|| calendar_date(self.date, self.month, self.year))
    }

    /// Reads and validates an employee from a JSON object.
    ///
    /// Every field is checked; the returned validation error carries one
    /// entry per failing field. Day, month and year failures are reported
    /// under `dob`.
    pub fn from_value(value: &Value, lookup: &dyn DesignationLookup) -> Result<Self, CoreError> {
        let mut reader = FieldReader::new(value)?;

        let emp_id = reader.int("emp_id", "employee id");
        let name = reader.string("name", "name");
        let designation_code = reader.int("designation_code", "designation_code");
        let date = reader.int_as("date", "dob", "date");
        let month = reader.int_as("month", "dob", "month");
        let year = reader.int_as("year", "dob", "year");
        let salary = reader.number("salary", "salary");
        let gender = reader.string("gender", "gender");
        let indian = reader.int("indian", "indian");
        let pan_no = reader.string("pan_no", "PAN number");
        let aadhar = reader.string("aadhar", "Aadhar number");

        let emp_id = reader.check("emp_id", emp_id, |id| check_non_negative("emp_id", *id));
        let name = reader.check("name", name, |n| check_length("name", n, MAX_NAME_LEN));
        let designation_code = match designation_code {
            Some(code) if lookup.designation_exists(code)? => Some(code),
            Some(code) => {
                reader.reject(
                    "designation_code",
                    format!("Invalid Designation Code : {}", code),
                );
                None
            }
            None => None,
        };
        let dob = match (date, month, year) {
            (Some(date), Some(month), Some(year)) => check_dob(&mut reader, date, month, year),
            _ => None,
        };
        let salary = reader.check("salary", salary, |s| {
            if s.is_finite() && *s > 0.0 {
                Ok(())
            } else {
                Err("Invalid Entry for Basic Salary".into())
            }
        });
        let gender = gender.and_then(|g| match Gender::parse(&g) {
            Some(gender) => Some(gender),
            None => {
                reader.reject("gender", "Invalid entry for gender");
                None
            }
        });
        let indian = indian.and_then(|flag| match flag {
            0 => Some(false),
            1 => Some(true),
            _ => {
                reader.reject("indian", "Invalid entry for indian");
                None
            }
        });
        let pan_no = reader.check("pan_no", pan_no, |p| {
            check_id_number(p, "Invalid entry for Pan Number")
        });
        let aadhar = reader.check("aadhar", aadhar, |a| {
            check_id_number(a, "Invalid entry for Aadhar Number")
        });

        let employee = (|| {
            let dob = dob?;
            Some(Self {
                emp_id: emp_id?,
                name: name?,
                designation_code: designation_code?,
                date: i64::from(dob.day()),
                month: i64::from(dob.month()),
                year: i64::from(dob.year()),
                salary: salary?,
                gender: gender?,
                indian: indian?,
                pan_no: pan_no?,
                aadhar: aadhar?,
                dob: Some(dob),
            })
        })();

        match employee {
            Some(employee) if reader.is_clean() => Ok(employee),
            _ => Err(reader.into_error()),
        }
    }

    /// Reads and validates an employee from a JSON document.
    pub fn from_document(document: &str, lookup: &dyn DesignationLookup) -> Result<Self, CoreError> {
        let value: Value = from_document(document)?;
        Self::from_value(&value, lookup)
    }
}

fn calendar_date(date: i64, month: i64, year: i64) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(date).ok()?,
    )
}

/// Checks the birth date triple. The last failing part wins the `dob` slot.
fn check_dob(reader: &mut FieldReader<'_>, date: i64, month: i64, year: i64) -> Option<NaiveDate> {
    let mut ok = true;
    if !(1..=31).contains(&date) {
        reader.reject(
            "dob",
            format!(
                "Invalid Date entry : {}, it should be greater than zero and should not exceed 31",
                date
            ),
        );
        ok = false;
    }
    if !(1..=12).contains(&month) {
        reader.reject(
            "dob",
            format!(
                "Invalid Month entry : {}, it should be greater than zero and should not exceed 12",
                month
            ),
        );
        ok = false;
    }
    if !BIRTH_YEARS.contains(&year) {
        reader.reject(
            "dob",
            format!(
                "Invalid Year entry : {}, it should be greater than 1950 and should not exceed 2020",
                year
            ),
        );
        ok = false;
    }
    if !ok {
        return None;
    }

    let dob = calendar_date(date, month, year);
    if dob.is_none() {
        reader.reject(
            "dob",
            format!("Invalid Date of Birth : {:02}-{:02}-{}", date, month, year),
        );
    }
    dob
}

fn check_id_number(value: &str, message: &str) -> Result<(), String> {
    if value.chars().count() == ID_NUMBER_LEN {
        Ok(())
    } else {
        Err(message.to_string())
    }
}
