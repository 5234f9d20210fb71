use crate::{
	controller::ModalForm,
	error::FlowError,
	host::{Dom, Host, ModalWidget, Request},
};
use std::rc::Rc;
use tracing::{instrument, trace, warn};

impl<H: Host> ModalForm<H> {
	/// Loads the form into the modal on the host's executor. This is what a trigger click does.
	pub fn open(self: &Rc<Self>) {
		let this = Rc::clone(self);
		self.spawn("load", async move {
			let generation = this.generation();
			match this.load().await {
				Ok(()) => Ok(()),
				Err(error) => this.fail(generation, error),
			}
		});
	}

	/// Fetches [`Settings::form_url`](`crate::Settings::form_url`) into the modal content region and shows the modal.
	///
	/// If the content contains a form, its `action` is reset to the form URL and it is [bound](`ModalForm::bind`).
	/// Content without a form is shown as is.
	///
	/// # Errors
	///
	/// On transport failure the content region is emptied and the modal still shown, so the caller can put a notice there.
	#[instrument(skip(self), fields(form_url = %self.settings.form_url))]
	pub async fn load(&self) -> Result<(), FlowError> {
		let generation = self.generation();
		let response = self.fetch(Request::get(&self.settings.form_url, self.settings.credentials)).await;
		if !self.is_live(generation) {
			warn!("The modal was closed while its form was loading; Discarding the response.");
			return Ok(());
		}

		let dom = self.host.dom();
		let widget = self.host.modal();
		let modal = self.modal()?;
		let content = self.content(&modal)?;
		let instance = widget.get_or_create_instance(&modal, self.settings.modal_options);
		self.bind_hidden(&modal);

		let response = match response {
			Ok(response) => response,
			Err(error) => {
				dom.clear_children(&content);
				widget.show(&instance);
				return Err(error.into());
			}
		};

		dom.set_inner_html(&content, &response.body);
		widget.show(&instance);

		match self.form(&modal) {
			Some(form) => {
				dom.set_form_action(&form, &self.settings.form_url);
				self.bind(&modal, form);
			}
			None => trace!("Loaded content contains no form; Showing it without handlers."),
		}
		Ok(())
	}
}
