//! Page logic shared by the covvar-web host and its wasm frontend.
//!
//! Nothing in here touches the DOM. The frontend reads form controls into
//! a [`request::FormSnapshot`], feeds server responses into a
//! [`poller::JobPoller`], and turns [`results::JobResults`] into chart and
//! table models before writing them back to the document.

pub mod error;
pub mod format;
pub mod phase;
pub mod poller;
pub mod request;
pub mod results;
pub mod status;

pub use error::{FetchFailure, ParseError, ValidationError};
pub use phase::{Database, Phase, SequenceType};
pub use poller::{JobPoller, PollEvent, PollState};
pub use request::{FormField, FormSnapshot, JobRequest, PhaseSelection, PrimaryInput};
pub use results::{JobResults, PieChart, ResultTable};
pub use status::{JobStatus, StatusResponse, StatusView};
