//! Wizard engine: sub-stores, step rules, the session, and submission.

pub mod images;
pub mod notifier;
pub mod proximity;
pub mod sequencer;
pub mod service;
pub mod session;
pub mod steps;
pub mod store;
pub mod submission;
pub mod validation;

pub use images::{
    is_valid_image_url, ImageProbe, ImageValidationPipeline, PendingProbe, ProbeFailure,
    ProbeResolution,
};
pub use notifier::{NoticeKind, Notifier, RecordingNotifier, TracingNotifier};
pub use proximity::{HydrationIssue, ProximityInputConfig, ProximityPointRegistry};
pub use sequencer::{SequencerStatus, StepSequencer};
pub use service::ListingService;
pub use session::{SessionMode, WizardSession};
pub use steps::{effective_steps, StepDescriptor, WizardStep, STEP_TABLE};
pub use store::{HydrationReport, WizardState};
pub use submission::{SubmissionAssembler, SubmissionOutcome, SubmissionTicket};
pub use validation::validate_step;
