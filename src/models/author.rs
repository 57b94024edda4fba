//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::book::BookShort;

/// Full author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Date of death ("died")
    pub date_of_death: Option<NaiveDate>,
    /// Relative path of the author photo
    pub photo: Option<String>,
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

/// Author reference embedded in book payloads
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuthorShort {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl From<&Author> for AuthorShort {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id,
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
        }
    }
}

/// Author detail page: the author and their books
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetails {
    #[serde(flatten)]
    pub author: Author,
    pub display_name: String,
    pub books: Vec<BookShort>,
}

/// Create or update author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_life_dates"))]
pub struct AuthorInput {
    #[validate(length(min = 1, max = 100, message = "First name must be 1 to 100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1 to 100 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub photo: Option<String>,
}

fn validate_life_dates(input: &AuthorInput) -> Result<(), ValidationError> {
    if let (Some(born), Some(died)) = (input.date_of_birth, input.date_of_death) {
        if died < born {
            let mut err = ValidationError::new("date_order");
            err.message = Some("Date of death is before date of birth".into());
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(born: Option<NaiveDate>, died: Option<NaiveDate>) -> AuthorInput {
        AuthorInput {
            first_name: "Ursula".to_string(),
            last_name: "Le Guin".to_string(),
            date_of_birth: born,
            date_of_death: died,
            photo: None,
        }
    }

    #[test]
    fn test_display_name() {
        let author = Author {
            id: 1,
            first_name: "Ursula".to_string(),
            last_name: "Le Guin".to_string(),
            date_of_birth: None,
            date_of_death: None,
            photo: None,
        };
        assert_eq!(author.to_string(), "Le Guin, Ursula");
    }

    #[test]
    fn test_life_dates() {
        let born = NaiveDate::from_ymd_opt(1929, 10, 21);
        let died = NaiveDate::from_ymd_opt(2018, 1, 22);
        assert!(input(born, died).validate().is_ok());
        assert!(input(born, None).validate().is_ok());
        assert!(input(died, born).validate().is_err());
    }

    #[test]
    fn test_name_length() {
        let mut author = input(None, None);
        author.last_name = "x".repeat(101);
        assert!(author.validate().is_err());
        author.last_name = String::new();
        assert!(author.validate().is_err());
    }
}
