use crate::domain::{
    LoanStatus, UserId,
    loan::{LineItem, LoanRecord},
    value_objects::{BookId, LoanId},
};
use crate::ports::loan_repository::{LoanRepository as LoanRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::collections::HashMap;
use std::fmt::Display;
use std::io;
use std::str::FromStr;
use uuid::Uuid;

const LOAN_COLUMNS: &str = r#"
    loan_id,
    borrower_id,
    approved_by,
    loaned_at,
    due_date,
    returned_at,
    status,
    fine_amount
"#;

fn invalid_data(message: String) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(io::Error::new(io::ErrorKind::InvalidData, message))
}

fn quantity_out_of_range(quantity: impl Display) -> Box<dyn std::error::Error + Send + Sync> {
    invalid_data(format!("quantity out of range: {}", quantity))
}

/// PostgreSQLの行データをLoanRecordに変換する（明細は空）
///
/// 未知のstatus文字列はエラー。旧データの "Borrowed" は Borrowing として読み込む。
fn map_row_to_loan(row: &PgRow) -> Result<LoanRecord> {
    let status_str: String = row.try_get("status")?;
    let status = LoanStatus::from_str(&status_str).map_err(invalid_data)?;

    let approved_by: Option<Uuid> = row.try_get("approved_by")?;

    Ok(LoanRecord {
        loan_id: LoanId::from_uuid(row.try_get("loan_id")?),
        borrower_id: UserId::from_uuid(row.try_get("borrower_id")?),
        approved_by: approved_by.map(UserId::from_uuid),
        loaned_at: row.try_get("loaned_at")?,
        due_date: row.try_get("due_date")?,
        returned_at: row.try_get("returned_at")?,
        status,
        fine_amount: row.try_get("fine_amount")?,
        line_items: Vec::new(),
    })
}

fn map_row_to_line_item(row: &PgRow) -> Result<LineItem> {
    let quantity: i32 = row.try_get("quantity")?;
    let quantity: u32 = quantity
        .try_into()
        .map_err(|_| quantity_out_of_range(quantity))?;

    Ok(LineItem {
        book_id: BookId::from_uuid(row.try_get("book_id")?),
        quantity,
    })
}

/// LoanRepositoryのPostgreSQL実装
///
/// 貸出記録は `loans`、明細は `loan_line_items` に保存する。
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    /// PostgreSQLコネクションプールから新しいLoanRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 貸出記録の行に明細を付けて返す
    ///
    /// 行の並び順はそのまま維持する。
    async fn attach_line_items(&self, rows: Vec<PgRow>) -> Result<Vec<LoanRecord>> {
        let mut loans = rows
            .iter()
            .map(map_row_to_loan)
            .collect::<Result<Vec<_>>>()?;
        if loans.is_empty() {
            return Ok(loans);
        }

        let loan_ids: Vec<Uuid> = loans.iter().map(|l| l.loan_id.value()).collect();
        let item_rows = sqlx::query(
            r#"
            SELECT loan_id, book_id, quantity
            FROM loan_line_items
            WHERE loan_id = ANY($1)
            ORDER BY loan_id, position ASC
            "#,
        )
        .bind(&loan_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items: HashMap<Uuid, Vec<LineItem>> = HashMap::new();
        for row in &item_rows {
            let loan_id: Uuid = row.try_get("loan_id")?;
            items
                .entry(loan_id)
                .or_default()
                .push(map_row_to_line_item(row)?);
        }

        for loan in &mut loans {
            loan.line_items = items.remove(&loan.loan_id.value()).unwrap_or_default();
        }

        Ok(loans)
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    async fn load(&self, loan_id: LoanId) -> Result<Option<LoanRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM loans WHERE loan_id = $1",
            LOAN_COLUMNS
        ))
        .bind(loan_id.value())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_line_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// 貸出記録を保存（upsert）
    ///
    /// 記録と明細を1トランザクションで書き込む。明細は全件入れ替える。
    async fn save(&self, loan: &LoanRecord) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO loans (
                loan_id,
                borrower_id,
                approved_by,
                loaned_at,
                due_date,
                returned_at,
                status,
                fine_amount,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            ON CONFLICT (loan_id)
            DO UPDATE SET
                borrower_id = EXCLUDED.borrower_id,
                approved_by = EXCLUDED.approved_by,
                loaned_at = EXCLUDED.loaned_at,
                due_date = EXCLUDED.due_date,
                returned_at = EXCLUDED.returned_at,
                status = EXCLUDED.status,
                fine_amount = EXCLUDED.fine_amount,
                updated_at = NOW()
            "#,
        )
        .bind(loan.loan_id.value())
        .bind(loan.borrower_id.value())
        .bind(loan.approved_by.map(|id| id.value()))
        .bind(loan.loaned_at)
        .bind(loan.due_date)
        .bind(loan.returned_at)
        .bind(loan.status.as_str())
        .bind(loan.fine_amount)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM loan_line_items WHERE loan_id = $1")
            .bind(loan.loan_id.value())
            .execute(&mut *tx)
            .await?;

        for (position, item) in loan.line_items.iter().enumerate() {
            let quantity: i32 = item
                .quantity
                .try_into()
                .map_err(|_| quantity_out_of_range(item.quantity))?;

            sqlx::query(
                r#"
                INSERT INTO loan_line_items (loan_id, position, book_id, quantity)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(loan.loan_id.value())
            .bind(position as i32)
            .bind(item.book_id.value())
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_by_borrower(&self, borrower_id: UserId) -> Result<Vec<LoanRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM loans WHERE borrower_id = $1 ORDER BY loaned_at DESC",
            LOAN_COLUMNS
        ))
        .bind(borrower_id.value())
        .fetch_all(&self.pool)
        .await?;

        self.attach_line_items(rows).await
    }

    async fn list_all(&self) -> Result<Vec<LoanRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM loans ORDER BY loaned_at DESC",
            LOAN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        self.attach_line_items(rows).await
    }

    /// 旧データの "Borrowed" も Borrowing として拾う
    async fn list_by_status(&self, status: LoanStatus) -> Result<Vec<LoanRecord>> {
        let labels: Vec<&str> = match status {
            LoanStatus::Borrowing => vec!["Borrowing", "Borrowed"],
            other => vec![other.as_str()],
        };

        let rows = sqlx::query(&format!(
            "SELECT {} FROM loans WHERE status = ANY($1) ORDER BY loaned_at DESC",
            LOAN_COLUMNS
        ))
        .bind(&labels)
        .fetch_all(&self.pool)
        .await?;

        self.attach_line_items(rows).await
    }
}
