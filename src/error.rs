use core::time::Duration;
use thiserror::Error;

/// Produced while resolving [`PartialSettings`](`crate::settings::PartialSettings`) into [`Settings`](`crate::settings::Settings`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
	#[error("`formURL` is required")]
	MissingFormUrl,
	#[error(transparent)]
	MissingAsyncSettings(#[from] MissingAsyncSettings),
}

/// Names (in their configuration-key spelling) of every required async setting that was absent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("missing async settings: {}", .0.join(", "))]
pub struct MissingAsyncSettings(pub Vec<&'static str>);

/// Anything that went wrong between issuing a request and having a usable body.
///
/// These are recoverable: the controller re-arms the form and shows its failure notice.
#[derive(Debug, Error)]
pub enum TransportError {
	#[error("network error: {0}")]
	Network(String),
	#[error("request timed out after {0:?}")]
	Timeout(Duration),
	#[error("unexpected HTTP status {0}")]
	Status(u16),
	#[error("invalid JSON in data fragment: {0}")]
	Json(#[from] serde_json::Error),
}

/// Halts a load/validate/submit cycle.
#[derive(Debug, Error)]
pub enum FlowError {
	#[error(transparent)]
	Transport(#[from] TransportError),
	#[error("{what} not found (selector {selector:?})")]
	MissingElement { what: &'static str, selector: String },
	#[error("no form present in response")]
	MissingForm,
	#[error("<body> element missing")]
	MissingBody,
}

impl FlowError {
	/// Whether the end user should see a failure notice.
	///
	/// Misconfiguration and malformed server markup are only logged.
	#[must_use]
	pub fn is_recoverable(&self) -> bool {
		matches!(self, Self::Transport(_))
	}
}
