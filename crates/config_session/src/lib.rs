//! Edit session and form contract for the GitNotify configuration dashboard.
//!
//! [`ConfigEditSession`] owns the lifecycle of one editing session: the
//! initial fetch, local edits to a working copy, validation, and the
//! whole-document replace. [`FormView`] projects the session state onto a
//! [`FormModel`] and forwards user input; any front end (the
//! `gitnotify-config` CLI included) draws that model.
//!
//! ```text
//! FormInput ──dispatch──▶ ConfigEditSession ──ConfigStore──▶ service
//!     ▲                          │
//!     └──── FormModel ◀──render──┘
//! ```

pub mod field;
pub mod session;
pub mod state;
pub mod view;

pub use field::{FieldEdit, FieldEditError};
pub use session::{
    ConfigEditSession, EditOutcome, LoadOutcome, SubmitOutcome, SAVE_SUCCESS_MESSAGE,
};
pub use state::{EditState, SessionPhase, SessionState};
pub use view::{Banner, DispatchOutcome, FormFields, FormInput, FormModel, FormView};
