//! Book copies and loan management service

use chrono::{NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book_instance::{
        proposed_renewal_date, validate_renewal_date, BookInstanceDetails, BookInstanceInput,
        BookInstanceRow, RenewBookForm, RenewBookRequest,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn details(rows: Vec<BookInstanceRow>) -> Vec<BookInstanceDetails> {
        let today = Self::today();
        rows.into_iter().map(|row| row.into_details(today)).collect()
    }

    pub async fn get_instance(&self, id: Uuid) -> AppResult<BookInstanceDetails> {
        let row = self.repository.book_instances.get_by_id(id).await?;
        Ok(row.into_details(Self::today()))
    }

    /// Copies of the book with the given slug
    pub async fn list_for_book(&self, slug: &str) -> AppResult<Vec<BookInstanceDetails>> {
        let book = self.repository.books.get_by_slug(slug).await?;
        let rows = self.repository.book_instances.list_for_book(book.id).await?;
        Ok(Self::details(rows))
    }

    /// Copies on loan to a user
    pub async fn borrowed_by(&self, user_id: i32) -> AppResult<Vec<BookInstanceDetails>> {
        let rows = self.repository.book_instances.list_on_loan_to(user_id).await?;
        Ok(Self::details(rows))
    }

    /// Every copy on loan
    pub async fn all_borrowed(&self) -> AppResult<Vec<BookInstanceDetails>> {
        let rows = self.repository.book_instances.list_on_loan().await?;
        Ok(Self::details(rows))
    }

    pub async fn create_instance(&self, slug: &str, data: BookInstanceInput) -> AppResult<BookInstanceDetails> {
        data.validate()?;
        let book = self.repository.books.get_by_slug(slug).await?;
        self.check_borrower(&data).await?;

        let id = self.repository.book_instances.create(book.id, &data).await?;
        tracing::info!("Added copy {} of '{}'", id, book.title);
        self.get_instance(id).await
    }

    pub async fn update_instance(&self, id: Uuid, data: BookInstanceInput) -> AppResult<BookInstanceDetails> {
        data.validate()?;
        self.check_borrower(&data).await?;
        self.repository.book_instances.update(id, &data).await?;
        self.get_instance(id).await
    }

    pub async fn delete_instance(&self, id: Uuid) -> AppResult<()> {
        self.repository.book_instances.delete(id).await?;
        tracing::info!("Deleted copy {}", id);
        Ok(())
    }

    /// The borrower, when set, must be one of the renewal form's borrower choices
    async fn check_borrower(&self, data: &BookInstanceInput) -> AppResult<()> {
        if let Some(borrower_id) = data.borrower_id {
            if !self.repository.users.is_borrower(borrower_id).await? {
                return Err(AppError::Validation(format!(
                    "borrower_id: select a valid choice, {} is not one of the available choices",
                    borrower_id
                )));
            }
        }
        Ok(())
    }

    /// Defaults for the renewal form
    pub async fn renewal_form(&self, id: Uuid) -> AppResult<RenewBookForm> {
        let instance = self.get_instance(id).await?;
        let borrower_choices = self.repository.users.borrower_choices().await?;
        Ok(RenewBookForm {
            instance,
            proposed_renewal_date: proposed_renewal_date(Self::today()),
            borrower_choices,
        })
    }

    /// Renew or lend a copy to a borrower until the renewal date
    pub async fn renew(&self, id: Uuid, request: RenewBookRequest) -> AppResult<BookInstanceDetails> {
        let due_back = validate_renewal_date(request.renewal_date, Self::today())?;

        // Verify the copy exists
        self.repository.book_instances.get_by_id(id).await?;

        let borrower_id = self
            .repository
            .users
            .borrower_id(&request.borrower)
            .await?
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "borrower: select a valid choice, {} is not one of the available choices",
                    request.borrower
                ))
            })?;

        self.repository.book_instances.lend(id, borrower_id, due_back).await?;
        tracing::info!("Copy {} lent to '{}' until {}", id, request.borrower, due_back);
        self.get_instance(id).await
    }

    /// Mark a copy as returned and available
    pub async fn mark_returned(&self, id: Uuid) -> AppResult<BookInstanceDetails> {
        self.repository.book_instances.mark_returned(id).await?;
        tracing::info!("Copy {} returned", id);
        self.get_instance(id).await
    }
}
