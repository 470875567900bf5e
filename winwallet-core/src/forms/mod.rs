//! Client-side validation for the admin create-game form and the join form.
//!
//! Inputs are taken as the raw strings a form would hold so that "missing"
//! and "not a number" can be told apart, and every failing field is
//! reported at once.

use crate::types::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_QUESTIONS: usize = 12;
pub const MAX_TEXT_LEN: usize = 255;
pub const ETHEREUM_ADDRESS_LEN: usize = 42;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateGameInput {
    pub time_limit: String,
    pub max_players: String,
    pub pot_size: String,
    pub entry_value: String,
    pub start_time: String,
    /// Phrase/answer pairs; pairs with either side blank are skipped.
    pub questions: Vec<(String, String)>,
}

/// A create-game form that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    pub time_limit: u32,
    pub max_players: u32,
    pub pot_size: f64,
    pub entry_value: f64,
    pub start_time: DateTime<Utc>,
    pub questions: Vec<(String, String)>,
}

impl CreateGameInput {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<NewGame, Vec<FieldError>> {
        let mut errors = Vec::new();

        let time_limit = check_integer(
            &self.time_limit,
            "time_limit",
            60..=3600,
            "Time limit is required.",
            "Time limit must be between 60 and 3600 seconds.",
            &mut errors,
        );
        let max_players = check_integer(
            &self.max_players,
            "max_players",
            2..=100,
            "Maximum number of players is required.",
            "Number of players must be between 2 and 100.",
            &mut errors,
        );
        let pot_size = check_minimum(
            &self.pot_size,
            "pot_size",
            1.0,
            "Pot size is required.",
            "Pot size must be at least 1.",
            &mut errors,
        );
        let entry_value = check_minimum(
            &self.entry_value,
            "entry_value",
            0.01,
            "Entry value is required.",
            "Entry value must be at least 0.01.",
            &mut errors,
        );
        let start_time = self.check_start_time(now, &mut errors);
        let questions = self.check_questions(&mut errors);

        match (time_limit, max_players, pot_size, entry_value, start_time) {
            (Some(time_limit), Some(max_players), Some(pot_size), Some(entry_value), Some(start_time))
                if errors.is_empty() =>
            {
                Ok(NewGame {
                    time_limit,
                    max_players,
                    pot_size,
                    entry_value,
                    start_time,
                    questions,
                })
            }
            _ => Err(errors),
        }
    }

    fn check_start_time(
        &self,
        now: DateTime<Utc>,
        errors: &mut Vec<FieldError>,
    ) -> Option<DateTime<Utc>> {
        let value = self.start_time.trim();
        if value.is_empty() {
            errors.push(FieldError::new("start_time", "Start time is required."));
            return None;
        }

        match parse_timestamp(value) {
            None => {
                errors.push(FieldError::new(
                    "start_time",
                    "Start time must be a valid date and time.",
                ));
                None
            }
            Some(start) if start <= now => {
                errors.push(FieldError::new(
                    "start_time",
                    "Start time must be in the future.",
                ));
                None
            }
            Some(start) => Some(start),
        }
    }

    fn check_questions(&self, errors: &mut Vec<FieldError>) -> Vec<(String, String)> {
        if self.questions.len() > MAX_QUESTIONS {
            errors.push(FieldError::new(
                "phrases",
                format!("At most {} phrase-answer pairs are allowed.", MAX_QUESTIONS),
            ));
        }

        for (i, (phrase, answer)) in self.questions.iter().enumerate() {
            if phrase.chars().count() > MAX_TEXT_LEN {
                errors.push(FieldError::new(
                    &format!("phrase_{}", i),
                    format!("Field cannot be longer than {} characters.", MAX_TEXT_LEN),
                ));
            }
            if answer.chars().count() > MAX_TEXT_LEN {
                errors.push(FieldError::new(
                    &format!("answer_{}", i),
                    format!("Field cannot be longer than {} characters.", MAX_TEXT_LEN),
                ));
            }
        }

        let complete: Vec<(String, String)> = self
            .questions
            .iter()
            .map(|(p, a)| (p.trim().to_string(), a.trim().to_string()))
            .filter(|(p, a)| !p.is_empty() && !a.is_empty())
            .collect();

        if complete.is_empty() {
            errors.push(FieldError::new(
                "phrases",
                "At least one phrase-answer pair is required.",
            ));
        }

        complete
    }
}

impl NewGame {
    /// Field names follow the server's create-game form.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("time_limit".to_string(), self.time_limit.to_string()),
            ("max_players".to_string(), self.max_players.to_string()),
            ("pot_size".to_string(), self.pot_size.to_string()),
            ("entry_value".to_string(), self.entry_value.to_string()),
            (
                "start_time".to_string(),
                self.start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            ),
        ];
        for (i, (phrase, answer)) in self.questions.iter().enumerate() {
            fields.push((format!("phrase_{}", i), phrase.clone()));
            fields.push((format!("answer_{}", i), answer.clone()));
        }
        fields
    }
}

#[derive(Debug, Clone, Default)]
pub struct JoinGameInput {
    pub ethereum_address: String,
}

impl JoinGameInput {
    pub fn new(ethereum_address: impl Into<String>) -> Self {
        Self {
            ethereum_address: ethereum_address.into(),
        }
    }

    /// Returns the trimmed address.
    pub fn validate(&self) -> Result<String, Vec<FieldError>> {
        let address = self.ethereum_address.trim();
        if address.is_empty() {
            return Err(vec![FieldError::new(
                "ethereum_address",
                "Ethereum address is required.",
            )]);
        }
        if address.chars().count() != ETHEREUM_ADDRESS_LEN {
            return Err(vec![FieldError::new(
                "ethereum_address",
                "Ethereum address must be exactly 42 characters long.",
            )]);
        }
        Ok(address.to_string())
    }
}

fn check_integer(
    raw: &str,
    field: &str,
    range: std::ops::RangeInclusive<u32>,
    required: &str,
    out_of_range: &str,
    errors: &mut Vec<FieldError>,
) -> Option<u32> {
    let value = raw.trim();
    if value.is_empty() {
        errors.push(FieldError::new(field, required));
        return None;
    }
    match value.parse::<u32>() {
        Ok(n) if range.contains(&n) => Some(n),
        _ => {
            errors.push(FieldError::new(field, out_of_range));
            None
        }
    }
}

fn check_minimum(
    raw: &str,
    field: &str,
    minimum: f64,
    required: &str,
    too_small: &str,
    errors: &mut Vec<FieldError>,
) -> Option<f64> {
    let value = raw.trim();
    if value.is_empty() {
        errors.push(FieldError::new(field, required));
        return None;
    }
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= minimum => Some(n),
        _ => {
            errors.push(FieldError::new(field, too_small));
            None
        }
    }
}
