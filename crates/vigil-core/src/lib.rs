//! vigil-core — backend wire contract and console view state.
//!
//! Pure types only: serde mirrors of the recognition backend's REST
//! payloads, the registration session state machine, and the dashboard
//! view state. All authoritative state lives server-side; these types
//! mirror it for display and local flow control.

pub mod dashboard;
pub mod notice;
pub mod protocol;
pub mod session;

pub use dashboard::{DashboardState, Recognition};
pub use notice::{Notice, NoticeKind};
pub use session::{RegistrationSession, SessionError, Slot, WizardStep};
