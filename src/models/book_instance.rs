//! Book instance (loanable copy), loan status and the renewal window

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Availability of a copy. Stored as a one-letter code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    pub fn code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
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
        match s {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            _ => Err(format!("Invalid loan status code: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus
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
        let s: String = Decode::<Postgres>::decode(value)?;
        s.trim().parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.code(), buf)
    }
}

/// Whether a copy due back on `due_back` is overdue on `today`.
/// A copy without a due date is never overdue.
pub fn is_overdue(due_back: Option<NaiveDate>, today: NaiveDate) -> bool {
    matches!(due_back, Some(due) if due < today)
}

/// Book instance row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    pub status: LoanStatus,
}

impl BookInstance {
    /// New copy with a freshly generated identifier
    pub fn new(book_id: Option<i32>, imprint: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            imprint: imprint.into(),
            due_back: None,
            borrower_id: None,
            status: LoanStatus::default(),
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        is_overdue(self.due_back, today)
    }
}

/// Instance joined with its book title and borrower name
#[derive(Debug, Clone, FromRow)]
pub struct InstanceRow {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub book_title: Option<String>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    pub borrower_username: Option<String>,
    pub status: LoanStatus,
}

/// Instance as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InstanceView {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub book_title: Option<String>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    pub borrower_username: Option<String>,
    pub status: LoanStatus,
    pub is_overdue: bool,
}

impl InstanceView {
    pub fn from_row(row: InstanceRow, today: NaiveDate) -> Self {
        Self {
            is_overdue: is_overdue(row.due_back, today),
            id: row.id,
            book_id: row.book_id,
            book_title: row.book_title,
            imprint: row.imprint,
            due_back: row.due_back,
            borrower_id: row.borrower_id,
            borrower_username: row.borrower_username,
            status: row.status,
        }
    }
}

impl std::fmt::Display for InstanceView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.book_title.as_deref().unwrap_or("-"))
    }
}

/// Create/update instance request. The identifier is never accepted from
/// clients.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct InstanceInput {
    pub book_id: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1 to 200 characters"))]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    #[serde(default)]
    pub status: LoanStatus,
}

impl InstanceInput {
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        Ok(())
    }
}

/// Loan listing parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LoanQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Renewal submission
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RenewInput {
    /// New due date; the proposed date is used when omitted
    pub renewal_date: Option<NaiveDate>,
}

/// Renewal form data: the copy and the suggested new due date
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalProposal {
    pub instance: InstanceView,
    pub proposed_renewal_date: NaiveDate,
}

/// Accepted range of renewal dates relative to `today`
#[derive(Debug, Clone, Copy)]
pub struct RenewalWindow {
    pub today: NaiveDate,
    pub default_weeks: i64,
    pub max_weeks: i64,
}

impl RenewalWindow {
    pub fn new(today: NaiveDate, default_weeks: i64, max_weeks: i64) -> Self {
        Self {
            today,
            default_weeks,
            max_weeks,
        }
    }

    pub fn proposed(&self) -> NaiveDate {
        self.today + Duration::weeks(self.default_weeks)
    }

    pub fn latest(&self) -> NaiveDate {
        self.today + Duration::weeks(self.max_weeks)
    }

    /// Accepts `today..=today + max_weeks`; the error names `renewal_date`
    pub fn validate(&self, date: NaiveDate) -> AppResult<NaiveDate> {
        if date < self.today {
            return Err(AppError::validation(
                "renewal_date",
                "Invalid date - renewal in past",
            ));
        }
        if date > self.latest() {
            return Err(AppError::validation(
                "renewal_date",
                format!(
                    "Invalid date - renewal more than {} weeks ahead",
                    self.max_weeks
                ),
            ));
        }
        Ok(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window(today: NaiveDate) -> RenewalWindow {
        RenewalWindow::new(today, 3, 4)
    }

    #[test]
    fn unset_due_date_is_never_overdue() {
        assert!(!is_overdue(None, date(2024, 2, 1)));
        assert!(!BookInstance::new(Some(1), "Penguin").is_overdue(date(1970, 1, 1)));
    }

    #[test]
    fn overdue_only_strictly_before_today() {
        let today = date(2024, 2, 1);
        assert!(is_overdue(Some(date(2024, 1, 31)), today));
        assert!(!is_overdue(Some(today), today));
        assert!(!is_overdue(Some(date(2024, 2, 2)), today));
    }

    #[test]
    fn renewal_bounds_are_inclusive() {
        let today = date(2024, 2, 1);
        let w = window(today);
        assert!(w.validate(today).is_ok());
        assert!(w.validate(today + Duration::weeks(4)).is_ok());
        assert!(w.validate(today + Duration::weeks(4) + Duration::days(1)).is_err());
        assert!(w.validate(today - Duration::days(1)).is_err());
    }

    #[test]
    fn renewal_errors_name_the_field() {
        match window(date(2024, 2, 1)).validate(date(2023, 12, 31)) {
            Err(AppError::Validation { field, message }) => {
                assert_eq!(field, "renewal_date");
                assert!(message.contains("past"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn overdue_copy_can_be_renewed_within_window() {
        let today = date(2024, 2, 1);
        let mut copy = BookInstance::new(Some(1), "Ace");
        copy.due_back = Some(date(2024, 1, 1));
        assert!(copy.is_overdue(today));

        let renewed = window(today).validate(date(2024, 2, 15)).unwrap();
        copy.due_back = Some(renewed);
        assert!(!copy.is_overdue(today));
        assert!(window(today).validate(date(2023, 12, 31)).is_err());
    }

    #[test]
    fn proposal_is_three_weeks_out() {
        assert_eq!(window(date(2024, 2, 1)).proposed(), date(2024, 2, 22));
    }

    #[test]
    fn new_instances_get_distinct_ids_and_maintenance_status() {
        let a = BookInstance::new(None, "x");
        let b = BookInstance::new(None, "x");
        assert_ne!(a.id, b.id);
        assert_eq!(a.status, LoanStatus::Maintenance);
    }

    #[test]
    fn status_codes_are_closed() {
        for status in [
            LoanStatus::Maintenance,
            LoanStatus::OnLoan,
            LoanStatus::Available,
            LoanStatus::Reserved,
        ] {
            assert_eq!(status.code().parse::<LoanStatus>(), Ok(status));
        }
        assert!("x".parse::<LoanStatus>().is_err());
        assert!(serde_json::from_str::<LoanStatus>("\"lost\"").is_err());
        assert_eq!(
            serde_json::to_string(&LoanStatus::OnLoan).unwrap(),
            "\"on_loan\""
        );
    }
}
