//! Circulation service: book copies, loan listings and renewals

use chrono::{NaiveDate, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::book_instance::{
        BookInstance, InstanceInput, InstanceView, LoanQuery, LoanStatus, RenewInput,
        RenewalProposal, RenewalWindow,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
    config: CatalogConfig,
}

impl CirculationService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn renewal_window(&self, today: NaiveDate) -> RenewalWindow {
        RenewalWindow::new(
            today,
            self.config.renewal_default_weeks,
            self.config.renewal_max_weeks,
        )
    }

    // =========================================================================
    // COPIES
    // =========================================================================

    pub async fn get_instance(&self, id: Uuid) -> AppResult<InstanceView> {
        let row = self.repository.instances.get_row(id).await?;
        Ok(InstanceView::from_row(row, Self::today()))
    }

    pub async fn create_instance(&self, input: InstanceInput) -> AppResult<InstanceView> {
        input.check()?;

        let mut instance = BookInstance::new(input.book_id, input.imprint.trim());
        instance.due_back = input.due_back;
        instance.borrower_id = input.borrower_id;
        instance.status = input.status;

        let mut tx = self.repository.pool.begin().await?;
        self.check_instance_references(&mut tx, &input).await?;
        let created = self.repository.instances.create(&mut tx, &instance).await?;
        tx.commit().await?;

        tracing::info!("Circulation: created copy id={} status={}", created.id, created.status);
        self.get_instance(created.id).await
    }

    pub async fn update_instance(&self, id: Uuid, input: InstanceInput) -> AppResult<InstanceView> {
        input.check()?;

        let mut tx = self.repository.pool.begin().await?;
        self.repository.instances.lock(&mut tx, id).await?;
        self.check_instance_references(&mut tx, &input).await?;
        let updated = self.repository.instances.update(&mut tx, id, &input).await?;
        tx.commit().await?;

        tracing::info!("Circulation: updated copy id={} status={}", id, updated.status);
        self.get_instance(id).await
    }

    pub async fn delete_instance(&self, id: Uuid) -> AppResult<()> {
        self.repository.instances.delete(id).await?;
        tracing::info!("Circulation: deleted copy id={}", id);
        Ok(())
    }

    async fn check_instance_references(&self, conn: &mut PgConnection, input: &InstanceInput) -> AppResult<()> {
        if let Some(book_id) = input.book_id {
            if !self.repository.books.exists(conn, book_id).await? {
                return Err(AppError::validation(
                    "book_id",
                    format!("Book with id {} does not exist", book_id),
                ));
            }
        }

        if let Some(borrower_id) = input.borrower_id {
            if !self.repository.users.exists(conn, borrower_id).await? {
                return Err(AppError::validation(
                    "borrower_id",
                    format!("User with id {} does not exist", borrower_id),
                ));
            }
        }

        Ok(())
    }

    // =========================================================================
    // LOANS
    // =========================================================================

    /// Copies on loan to `user_id`
    pub async fn user_loans(&self, user_id: i32, query: &LoanQuery) -> AppResult<(Vec<InstanceView>, i64)> {
        self.on_loan(Some(user_id), query).await
    }

    /// Every copy on loan (librarian view)
    pub async fn all_loans(&self, query: &LoanQuery) -> AppResult<(Vec<InstanceView>, i64)> {
        self.on_loan(None, query).await
    }

    async fn on_loan(&self, borrower_id: Option<i32>, query: &LoanQuery) -> AppResult<(Vec<InstanceView>, i64)> {
        let (limit, offset) = self.config.page_window(query.page, query.per_page);
        let (rows, total) = self
            .repository
            .instances
            .list_by_status(LoanStatus::OnLoan, borrower_id, limit, offset)
            .await?;

        let today = Self::today();
        let loans = rows
            .into_iter()
            .map(|row| InstanceView::from_row(row, today))
            .collect();
        Ok((loans, total))
    }

    // =========================================================================
    // RENEWAL
    // =========================================================================

    /// Renewal form: the copy and the suggested new due date
    pub async fn renewal_proposal(&self, id: Uuid) -> AppResult<RenewalProposal> {
        let today = Self::today();
        let instance = InstanceView::from_row(self.repository.instances.get_row(id).await?, today);
        Ok(RenewalProposal {
            instance,
            proposed_renewal_date: self.renewal_window(today).proposed(),
        })
    }

    /// Set a new due date. The copy stays locked from lookup to commit so
    /// concurrent renewals of one copy apply one after the other.
    pub async fn renew(&self, id: Uuid, input: RenewInput) -> AppResult<InstanceView> {
        let window = self.renewal_window(Self::today());

        let mut tx = self.repository.pool.begin().await?;
        self.repository.instances.lock(&mut tx, id).await?;

        let requested = input.renewal_date.unwrap_or_else(|| window.proposed());
        let due_back = window.validate(requested).map_err(|e| {
            tracing::warn!("Circulation: rejected renewal of copy id={} to {}: {}", id, requested, e);
            e
        })?;

        self.repository.instances.set_due_back(&mut tx, id, due_back).await?;
        tx.commit().await?;

        tracing::info!("Circulation: renewed copy id={} until {}", id, due_back);
        self.get_instance(id).await
    }
}
