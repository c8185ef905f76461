use thiserror::Error;

use crate::domain::PeriodError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid period query: {0}")]
    InvalidPeriod(#[from] PeriodError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
