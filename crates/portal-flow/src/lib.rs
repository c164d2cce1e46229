//! Upload-process-download workflow engine
//!
//! A workflow renders a form with one file input per required field, checks
//! that every field has a pick, posts the files as multipart data to a server
//! endpoint and saves the binary answer under a fixed file name:
//! - `config`: immutable per-process parameters
//! - `catalog`: the processes offered by the portal
//! - `workflow`: form handles and the submit lifecycle
//! - `sink`: staging and saving of artifacts, with guaranteed cleanup
//! - `present`: mapping outcomes to alerts and logs
//! - `view`: the single display region

pub mod catalog;
pub mod config;
mod error;
pub mod present;
mod selection;
pub mod sink;
mod transport;
pub mod view;
pub mod workflow;

pub use config::{FieldSpec, WorkflowConfig};
pub use error::FlowError;
pub use present::{present, AlertKind, Presenter};
pub use selection::{SelectedFile, SelectionState, ValidationFailure};
pub use sink::{ArtifactSink, DirectorySink};
pub use transport::{Artifact, HttpTransport};
pub use view::{FieldView, FormView, ViewController, ViewSnapshot, Workspace};
pub use workflow::{
    DeliveredArtifact, FormHandle, FormState, LastResult, SubmitOutcome, Workflow,
};
