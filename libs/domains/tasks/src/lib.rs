//! Tasks Domain
//!
//! Task catalogue used by month/week plan auto-fill:
//!
//! - [`TaskTemplateService`] seeds the default template tasks idempotently and
//!   turns prompts into tasks through an external [`GenerationClient`],
//!   falling back to the templates whenever generation fails.
//! - [`TaskService`] creates and lists tasks and picks out the templates.
//! - [`plan`] holds the per-day completion map and period validation.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_tasks::{GenerationConfig, HttpGenerationClient, PgTaskRepository, TaskTemplateService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = sea_orm::Database::connect("postgres://...").await?;
//! let generator = HttpGenerationClient::new(&GenerationConfig::default())?;
//!
//! let service = TaskTemplateService::new(PgTaskRepository::new(db), generator);
//! let tasks = service.generate_from_prompt("plan my week").await?;
//! assert!(!tasks.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod generation;
pub mod models;
pub mod plan;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod templates;

pub use config::GenerationConfig;
pub use error::{TaskError, TaskResult};
pub use generation::{GenerationClient, GenerationFailure, GenerationOutcome, HttpGenerationClient};
pub use models::{AI_CATEGORY, GeneratedTask, NewTask, TEMPLATE_CATEGORY, Task};
pub use plan::{DayStatusMap, MonthDayStatus, PlanError, PlanPeriod, WeekDayStatus};
pub use postgres::PgTaskRepository;
pub use repository::TaskRepository;
pub use service::{TaskService, TaskTemplateService};
