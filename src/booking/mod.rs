pub mod desk;
pub mod handler;
pub mod ledger;
pub mod processor;
pub mod workflow;

pub use desk::{BookingDesk, Submission, SubmissionOutcome, WorkflowUpdate};
pub use handler::{BookingHandler, LedgerHandler};
pub use ledger::BookingLedger;
pub use processor::{BookingProcessor, ProcessorError, SimulatedProcessor};
pub use workflow::{BookingWorkflow, WorkflowPhase, TIME_SLOTS};
