//! Maps UI service errors to skywatch_core::AppError for consistent user-facing messages.

mod weather;
