//! Per-trigger configuration.
//!
//! [`PartialSettings`] is the loosely typed overlay (every field optional, deserializable from the
//! camelCase keys a page would write in JavaScript or JSON). [`PartialSettings::resolve`] merges it
//! onto the documented defaults and produces an immutable [`Settings`] value.

use crate::error::{MissingAsyncSettings, SettingsError};
use core::{fmt, time::Duration};
use serde::Deserialize;
use std::rc::Rc;
use tracing::error;

pub const DEFAULT_MODAL_ID: &str = "#modal";
pub const DEFAULT_MODAL_CONTENT: &str = ".modal-content";
pub const DEFAULT_MODAL_FORM: &str = ".modal-content form";
pub const DEFAULT_SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;
pub const DEFAULT_ERROR_CLASS: &str = "is-invalid";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_FAILURE_NOTICE: &str = r#"<div class="alert alert-danger" role="alert">The server could not be reached. Please try again.</div>"#;

/// `fetch` credentials policy, passed through to every request unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Credentials {
	Omit,
	#[default]
	SameOrigin,
	Include,
}

impl Credentials {
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Credentials::Omit => "omit",
			Credentials::SameOrigin => "same-origin",
			Credentials::Include => "include",
		}
	}
}

/// Options handed to the modal widget when an instance has to be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModalOptions {
	/// Whether <kbd>Esc</kbd> closes the modal.
	pub keyboard: bool,
}

/// Re-wires a trigger inside page content that an async update just replaced.
#[derive(Clone)]
pub struct ReArm(Rc<dyn Fn()>);

impl ReArm {
	pub fn new(f: impl Fn() + 'static) -> Self {
		Self(Rc::new(f))
	}

	pub fn call(&self) {
		(self.0)();
	}
}

impl fmt::Debug for ReArm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ReArm").field(&Rc::as_ptr(&self.0)).finish()
	}
}

/// Fully populated async update configuration. See [`PartialAsyncSettings::validate`].
#[derive(Debug, Clone)]
pub struct AsyncSettings {
	/// Markup inserted as the first child of `<body>` after a successful save.
	pub success_message: String,
	/// JSON endpoint returning the fresh page fragment.
	pub data_url: String,
	/// Selector of the element whose content is replaced by the fragment.
	pub data_element_id: String,
	/// Key of the fragment inside the JSON object.
	pub data_key: String,
	pub rearm: ReArm,
	/// Hide the modal after the page was patched instead of reloading a fresh form into it.
	pub close_on_submit: bool,
}

/// Either a navigating submit, or a complete async update bundle. Never partially populated.
#[derive(Debug, Clone, Default)]
pub enum AsyncUpdate {
	#[default]
	Disabled,
	Enabled(AsyncSettings),
}

/// Resolved, immutable configuration of one modal form trigger.
#[derive(Debug, Clone)]
pub struct Settings {
	pub modal_id: String,
	pub modal_content: String,
	pub modal_form: String,
	pub submit_button: String,
	/// Where the form is (re)loaded from and what its `action` is reset to.
	pub form_url: String,
	/// Lets the browser submit natively, e.g. for confirmation-only delete forms.
	pub is_delete_form: bool,
	/// Substring whose presence in a validation response marks the form as rejected.
	pub error_class: String,
	pub credentials: Credentials,
	pub async_update: AsyncUpdate,
	/// Applies to each request individually. `None` waits indefinitely.
	pub timeout: Option<Duration>,
	/// Shown inside the modal when a request fails.
	pub failure_notice: String,
	pub modal_options: ModalOptions,
}

impl Settings {
	/// Shorthand for [`PartialSettings::new`]`(form_url).`[`resolve`](`PartialSettings::resolve`)`()`.
	///
	/// # Errors
	///
	/// Iff `form_url` is empty.
	pub fn for_url(form_url: impl Into<String>) -> Result<Self, SettingsError> {
		PartialSettings::new(form_url).resolve()
	}

	#[must_use]
	pub fn async_settings(&self) -> Option<&AsyncSettings> {
		match &self.async_update {
			AsyncUpdate::Disabled => None,
			AsyncUpdate::Enabled(async_settings) => Some(async_settings),
		}
	}
}

/// Async settings as written by a page. Missing and empty values are both treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialAsyncSettings {
	pub close_on_submit: bool,
	pub success_message: Option<String>,
	pub data_url: Option<String>,
	pub data_element_id: Option<String>,
	pub data_key: Option<String>,
	#[serde(skip)]
	pub add_modal_form_function: Option<ReArm>,
}

impl PartialAsyncSettings {
	/// Checks the bundle as a whole.
	///
	/// Each absent field is logged by name, in declaration order.
	///
	/// # Errors
	///
	/// Iff any of `successMessage`, `dataUrl`, `dataElementId`, `dataKey` or `addModalFormFunction` is absent.
	pub fn validate(self) -> Result<AsyncSettings, MissingAsyncSettings> {
		fn present(value: Option<String>) -> Option<String> {
			value.filter(|value| !value.is_empty())
		}

		let success_message = present(self.success_message);
		let data_url = present(self.data_url);
		let data_element_id = present(self.data_element_id);
		let data_key = present(self.data_key);

		let mut missing = Vec::new();
		for (name, is_present) in [
			("successMessage", success_message.is_some()),
			("dataUrl", data_url.is_some()),
			("dataElementId", data_element_id.is_some()),
			("dataKey", data_key.is_some()),
			("addModalFormFunction", self.add_modal_form_function.is_some()),
		] {
			if !is_present {
				error!(setting = name, "'{}' in asyncSettings is missing.", name);
				missing.push(name);
			}
		}

		match (success_message, data_url, data_element_id, data_key, self.add_modal_form_function) {
			(Some(success_message), Some(data_url), Some(data_element_id), Some(data_key), Some(rearm)) => Ok(AsyncSettings {
				success_message,
				data_url,
				data_element_id,
				data_key,
				rearm,
				close_on_submit: self.close_on_submit,
			}),
			_ => Err(MissingAsyncSettings(missing)),
		}
	}
}

/// Overlay of user-provided settings. Every `None` falls back to the documented default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialSettings {
	#[serde(rename = "modalID")]
	pub modal_id: Option<String>,
	pub modal_content: Option<String>,
	pub modal_form: Option<String>,
	pub submit_button: Option<String>,
	#[serde(rename = "formURL")]
	pub form_url: Option<String>,
	pub is_delete_form: Option<bool>,
	pub error_class: Option<String>,
	pub credentials: Option<Credentials>,
	pub async_update: Option<bool>,
	pub async_settings: PartialAsyncSettings,
	/// Milliseconds. `0` disables the timeout.
	pub timeout_ms: Option<u64>,
	pub failure_notice: Option<String>,
	pub keyboard: Option<bool>,
}

impl PartialSettings {
	pub fn new(form_url: impl Into<String>) -> Self {
		Self {
			form_url: Some(form_url.into()),
			..Self::default()
		}
	}

	/// Parses settings from a JSON object using the same keys as the JavaScript API.
	///
	/// # Errors
	///
	/// Iff `json` isn't a valid settings object.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	#[must_use]
	pub fn delete_form(mut self) -> Self {
		self.is_delete_form = Some(true);
		self
	}

	/// Switches to async updates with the given bundle.
	#[must_use]
	pub fn async_update(mut self, async_settings: PartialAsyncSettings) -> Self {
		self.async_update = Some(true);
		self.async_settings = async_settings;
		self
	}

	/// Merges onto the defaults.
	///
	/// # Errors
	///
	/// - [`SettingsError::MissingFormUrl`] iff no (non-empty) form URL was given.
	/// - [`SettingsError::MissingAsyncSettings`] iff async updates are enabled but the bundle is incomplete.
	pub fn resolve(self) -> Result<Settings, SettingsError> {
		let form_url = match self.form_url.filter(|url| !url.is_empty()) {
			Some(form_url) => form_url,
			None => {
				error!("'formURL' is missing.");
				return Err(SettingsError::MissingFormUrl);
			}
		};

		let async_update = if self.async_update.unwrap_or(false) {
			AsyncUpdate::Enabled(self.async_settings.validate()?)
		} else {
			AsyncUpdate::Disabled
		};

		Ok(Settings {
			modal_id: self.modal_id.unwrap_or_else(|| DEFAULT_MODAL_ID.to_owned()),
			modal_content: self.modal_content.unwrap_or_else(|| DEFAULT_MODAL_CONTENT.to_owned()),
			modal_form: self.modal_form.unwrap_or_else(|| DEFAULT_MODAL_FORM.to_owned()),
			submit_button: self.submit_button.unwrap_or_else(|| DEFAULT_SUBMIT_BUTTON.to_owned()),
			form_url,
			is_delete_form: self.is_delete_form.unwrap_or(false),
			// Every response contains the empty string.
			error_class: self.error_class.filter(|class| !class.is_empty()).unwrap_or_else(|| DEFAULT_ERROR_CLASS.to_owned()),
			credentials: self.credentials.unwrap_or_default(),
			async_update,
			timeout: match self.timeout_ms {
				None => Some(DEFAULT_TIMEOUT),
				Some(0) => None,
				Some(ms) => Some(Duration::from_millis(ms)),
			},
			failure_notice: self.failure_notice.unwrap_or_else(|| DEFAULT_FAILURE_NOTICE.to_owned()),
			modal_options: ModalOptions {
				keyboard: self.keyboard.unwrap_or(false),
			},
		})
	}
}
