use crate::{
	controller::{Generation, ModalForm},
	error::FlowError,
	host::{Dom, Host, Request, ASYNC_UPDATE_FIELD},
	settings::{AsyncSettings, AsyncUpdate},
};
use serde_json::Value;
use tracing::{error, instrument, trace, warn};

impl<H: Host> ModalForm<H> {
	/// Submits a form the server has accepted.
	///
	/// Without async updates this is the browser's native, navigating submission.
	/// Otherwise the form is saved out of band, the success message shown, the page patched from the data fragment,
	/// and the modal either closed or reloaded with a fresh form.
	///
	/// Page-level steps run even if the modal was closed in the meantime, since the save already happened.
	/// Only the final close-or-reload is skipped then.
	/// A failed page patch is logged and skips the re-arm callback, but the modal is still closed or reloaded.
	///
	/// # Errors
	///
	/// - [`FlowError::Transport`] iff the save or the reload fails.
	/// - [`FlowError::MissingBody`] iff the document has no `<body>` for the success message.
	#[instrument(skip(self))]
	pub async fn submit(&self, generation: Generation) -> Result<(), FlowError> {
		let dom = self.host.dom();
		let modal = self.modal()?;
		let form = self.form(&modal).ok_or(FlowError::MissingForm)?;

		let async_settings = match &self.settings.async_update {
			AsyncUpdate::Disabled => {
				trace!("Submitting natively.");
				dom.submit_form(&form);
				return Ok(());
			}
			AsyncUpdate::Enabled(async_settings) => async_settings,
		};

		let mut data = dom.form_data(&form);
		let (name, value) = ASYNC_UPDATE_FIELD;
		dom.append_form_field(&mut data, name, value);
		self.fetch(Request::with_form(dom.form_action(&form), dom.form_method(&form), data, self.settings.credentials))
			.await?;

		let body = dom.body().ok_or(FlowError::MissingBody)?;
		dom.prepend_html(&body, &async_settings.success_message);

		// The record is saved at this point. Resubmitting would save it again, so the form stays locked.
		match self.patch_page(async_settings).await {
			Ok(()) => async_settings.rearm.call(),
			Err(error) => error!("Saved, but the page couldn't be patched: {}", error),
		}

		if !self.is_live(generation) {
			warn!("The modal was closed during the async update; Leaving it closed.");
			return Ok(());
		}
		if async_settings.close_on_submit {
			self.close();
			Ok(())
		} else {
			self.load().await
		}
	}

	/// Replaces the data element's content with `json[data_key]` from the data fragment.
	async fn patch_page(&self, async_settings: &AsyncSettings) -> Result<(), FlowError> {
		let dom = self.host.dom();
		let fragment: Value = self.fetch(Request::get(&async_settings.data_url, self.settings.credentials)).await?.json()?;

		let html = match fragment.get(&async_settings.data_key) {
			Some(Value::String(html)) => html.clone(),
			Some(other) => other.to_string(),
			None => {
				warn!("Data fragment has no key {:?}; Leaving the page as is.", async_settings.data_key);
				return Ok(());
			}
		};
		match dom.query(&async_settings.data_element_id) {
			Some(target) => dom.set_inner_html(&target, &html),
			None => error!("Data element {:?} not found; Leaving the page as is.", async_settings.data_element_id),
		}
		Ok(())
	}
}
