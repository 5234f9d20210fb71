use crate::{
	controller::{Generation, ModalForm},
	error::FlowError,
	host::{Dom, Host, Request, REQUESTED_WITH},
};
use tracing::{instrument, trace, warn};

/// How the server judged a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
	/// The form came back with field errors and was redisplayed.
	Rejected,
	Accepted,
	/// The modal was closed before the response arrived.
	Stale,
}

impl<H: Host> ModalForm<H> {
	/// One validation cycle, continuing into [`submit`](`ModalForm::submit`) on acceptance.
	pub(crate) async fn run_cycle(&self) -> Result<(), FlowError> {
		let generation = self.generation();
		let result = match self.validate(generation).await {
			Ok(Verdict::Accepted) => self.submit(generation).await,
			Ok(Verdict::Rejected | Verdict::Stale) => Ok(()),
			Err(error) => Err(error),
		};
		match result {
			Ok(()) => Ok(()),
			Err(error) => self.fail(generation, error),
		}
	}

	/// Sends the form's current data to its current action and classifies the answer.
	///
	/// The submit control is disabled first.
	/// A response containing [`Settings::error_class`](`crate::Settings::error_class`) replaces the modal content,
	/// and the form inside it is reset to the form URL and bound again.
	///
	/// # Errors
	///
	/// - [`FlowError::Transport`] iff the request fails.
	/// - [`FlowError::MissingForm`] iff there's no form to validate, or a rejection response contains none.
	#[instrument(skip(self))]
	pub async fn validate(&self, generation: Generation) -> Result<Verdict, FlowError> {
		let dom = self.host.dom();
		let modal = self.modal()?;
		let form = self.form(&modal).ok_or(FlowError::MissingForm)?;
		self.set_submit_disabled(&modal, true);

		let request = Request::with_form(dom.form_action(&form), dom.form_method(&form), dom.form_data(&form), self.settings.credentials).header(REQUESTED_WITH);
		let response = self.fetch(request).await?;
		if !self.is_live(generation) {
			warn!("The modal was closed during validation; Discarding the response.");
			return Ok(Verdict::Stale);
		}

		if response.body.contains(&self.settings.error_class) {
			trace!("Response carries the error marker; Redisplaying the form.");
			self.redisplay(&self.modal()?, &response.body)?;
			Ok(Verdict::Rejected)
		} else {
			trace!("Response carries no error marker.");
			Ok(Verdict::Accepted)
		}
	}
}
