//! Book instance (loanable copy) model, loan status and renewal rules

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Latest accepted renewal date, in days after today
pub const MAX_RENEWAL_DAYS: i64 = 28;

/// Renewal date proposed by the renewal form, in days after today
pub const DEFAULT_RENEWAL_DAYS: i64 = 21;

/// Book availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    #[serde(rename = "o")]
    OnLoan,
    #[serde(rename = "a")]
    Available,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
        }
    }
}

impl Default for LoanStatus {
    fn default() -> Self {
        LoanStatus::Available
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            other => Err(format!("Invalid loan status: {}", other)),
        }
    }
}

// SQLx conversion for LoanStatus (stored as a one-character string)
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: &str = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Book instance model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    /// Unique ID for this particular book across whole library
    pub id: Uuid,
    pub book_id: i32,
    pub imprint: String,
    /// Expected date of availability
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}

impl BookInstance {
    /// A copy is overdue once its due date has passed
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_back.map(|due| today > due).unwrap_or(false)
    }
}

/// Book instance row joined with its book and borrower
#[derive(Debug, Clone, FromRow)]
pub struct BookInstanceRow {
    #[sqlx(flatten)]
    pub instance: BookInstance,
    pub book_title: String,
    pub book_slug: String,
    pub borrower_username: Option<String>,
}

impl BookInstanceRow {
    pub fn into_details(self, today: NaiveDate) -> BookInstanceDetails {
        BookInstanceDetails {
            is_overdue: self.instance.is_overdue(today),
            display_name: format!("{} ({})", self.instance.id, self.book_title),
            instance: self.instance,
            book_title: self.book_title,
            book_slug: self.book_slug,
            borrower_username: self.borrower_username,
        }
    }
}

/// Book instance with display data
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookInstanceDetails {
    #[serde(flatten)]
    pub instance: BookInstance,
    pub book_title: String,
    pub book_slug: String,
    pub borrower_username: Option<String>,
    pub is_overdue: bool,
    /// "{id} ({book title})"
    pub display_name: String,
}

/// Create or update book instance request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookInstanceInput {
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1 to 200 characters"))]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    #[serde(default)]
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}

/// Renew (or lend) a copy
#[derive(Debug, Deserialize, ToSchema)]
pub struct RenewBookRequest {
    /// Enter a date between now and 4 weeks (default 3)
    pub renewal_date: NaiveDate,
    /// Username of the borrower, one of the renewal form choices
    pub borrower: String,
}

/// Defaults shown by the renewal form
#[derive(Debug, Serialize, ToSchema)]
pub struct RenewBookForm {
    pub instance: BookInstanceDetails,
    pub proposed_renewal_date: NaiveDate,
    pub borrower_choices: Vec<String>,
}

/// Check a renewal date against `today`.
///
/// Accepts `today <= date <= today + 4 weeks` and returns the date unchanged.
pub fn validate_renewal_date(date: NaiveDate, today: NaiveDate) -> AppResult<NaiveDate> {
    if date < today {
        return Err(AppError::Validation("Invalid date - renewal in past".to_string()));
    }

    if date > today + Duration::days(MAX_RENEWAL_DAYS) {
        return Err(AppError::Validation(
            "Invalid date - renewal more than 4 weeks ahead".to_string(),
        ));
    }

    Ok(date)
}

/// Renewal date proposed to the librarian
pub fn proposed_renewal_date(today: NaiveDate) -> NaiveDate {
    today + Duration::days(DEFAULT_RENEWAL_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn message(result: AppResult<NaiveDate>) -> String {
        match result {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_renewal_accepts_window() {
        let today = day(2024, 2, 10);
        for offset in 0..=MAX_RENEWAL_DAYS {
            let date = today + Duration::days(offset);
            assert_eq!(validate_renewal_date(date, today).unwrap(), date);
        }
    }

    #[test]
    fn test_renewal_rejects_past() {
        let today = day(2024, 2, 10);
        let msg = message(validate_renewal_date(day(2024, 2, 9), today));
        assert_eq!(msg, "Invalid date - renewal in past");
        let msg = message(validate_renewal_date(day(2020, 1, 1), today));
        assert_eq!(msg, "Invalid date - renewal in past");
    }

    #[test]
    fn test_renewal_rejects_too_far() {
        let today = day(2024, 2, 10);
        // 2024 is a leap year: 28 days after Feb 10 is Mar 9
        assert!(validate_renewal_date(day(2024, 3, 9), today).is_ok());
        let msg = message(validate_renewal_date(day(2024, 3, 10), today));
        assert_eq!(msg, "Invalid date - renewal more than 4 weeks ahead");
    }

    #[test]
    fn test_proposed_date_is_accepted() {
        let today = day(2023, 12, 20);
        let proposed = proposed_renewal_date(today);
        assert_eq!(proposed, day(2024, 1, 10));
        assert!(validate_renewal_date(proposed, today).is_ok());
    }

    #[test]
    fn test_is_overdue() {
        let mut copy = BookInstance {
            id: Uuid::new_v4(),
            book_id: 1,
            imprint: "Ace, 1990".to_string(),
            due_back: None,
            status: LoanStatus::OnLoan,
            borrower_id: Some(3),
        };
        let today = day(2024, 5, 1);
        assert!(!copy.is_overdue(today));
        copy.due_back = Some(today);
        assert!(!copy.is_overdue(today));
        copy.due_back = Some(day(2024, 4, 30));
        assert!(copy.is_overdue(today));
    }

    #[test]
    fn test_loan_status_codes() {
        assert_eq!("o".parse::<LoanStatus>().unwrap(), LoanStatus::OnLoan);
        assert_eq!("a".parse::<LoanStatus>().unwrap(), LoanStatus::Available);
        assert!("x".parse::<LoanStatus>().is_err());
        assert_eq!(LoanStatus::default(), LoanStatus::Available);
        assert_eq!(serde_json::to_string(&LoanStatus::OnLoan).unwrap(), "\"o\"");
        assert_eq!(LoanStatus::OnLoan.to_string(), "On loan");
    }

    #[test]
    fn test_details_display_name() {
        let id = Uuid::new_v4();
        let row = BookInstanceRow {
            instance: BookInstance {
                id,
                book_id: 1,
                imprint: "Chilton".to_string(),
                due_back: Some(day(2024, 1, 1)),
                status: LoanStatus::OnLoan,
                borrower_id: None,
            },
            book_title: "Dune".to_string(),
            book_slug: "dune".to_string(),
            borrower_username: None,
        };
        let details = row.into_details(day(2024, 1, 2));
        assert!(details.is_overdue);
        assert_eq!(details.display_name, format!("{} (Dune)", id));
    }
}
