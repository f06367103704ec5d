use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Contact {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub birthday: NaiveDate,
    pub additional_data: Option<String>,
}

impl Contact {
    pub fn from_input(id: i32, input: ContactInput) -> Self {
        Self {
            id,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone_number: input.phone_number,
            birthday: input.birthday,
            additional_data: input.additional_data,
        }
    }

    /// Overwrites every field but `id`.
    pub fn replace_with(&mut self, input: ContactInput) {
        self.first_name = input.first_name;
        self.last_name = input.last_name;
        self.email = input.email;
        self.phone_number = input.phone_number;
        self.birthday = input.birthday;
        self.additional_data = input.additional_data;
    }
}

/// Request body for create and replace.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContactInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub birthday: NaiveDate,
    #[serde(default)]
    pub additional_data: Option<String>,
}

impl ContactInput {
    pub fn validate(&self) -> Result<(), ApiError> {
        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("phone_number", &self.phone_number),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ApiError::Validation(format!("{field} must not be blank")));
            }
        }
        if !self.email.contains('@') {
            return Err(ApiError::Validation("email must contain '@'".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

impl SearchQuery {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.query.is_empty() {
            return Err(ApiError::Validation("query must not be empty".to_string()));
        }
        Ok(())
    }
}
