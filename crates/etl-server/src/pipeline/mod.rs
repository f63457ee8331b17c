//! Clinical measurement ingestion pipeline
//!
//! One job moves a single delimited file through these steps:
//!
//! 1. [`reader`]: parse the file into a [`RowSet`]
//! 2. [`schema`]: normalize column names and check required columns
//! 3. [`sanitizer`]: trim cells and split off rows missing required values
//! 4. [`policy`]: reject the file when more than half its rows are invalid
//! 5. [`persister`]: append the valid rows to `clinical_measurements`
//!
//! [`runner::JobRunner`] sequences the steps and records progress on the
//! [`state::Job`] held in the shared [`registry::JobRegistry`].

pub mod error;
pub mod persister;
pub mod policy;
pub mod reader;
pub mod registry;
pub mod rowset;
pub mod runner;
pub mod sanitizer;
pub mod schema;
pub mod state;

pub use error::{JobError, PersistError};
pub use persister::{InMemoryStore, MeasurementStore, PostgresStore};
pub use registry::{JobRegistry, Registration, RunId};
pub use rowset::RowSet;
pub use runner::{JobRequest, JobRunner, PipelineSettings};
pub use state::{Job, Stage, TransitionError};
