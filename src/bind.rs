use crate::{
	controller::ModalForm,
	host::{Dom, ElementOf, FormOf, Host, ModalWidget, SubmitAction},
};
use std::rc::Rc;
use tracing::{error, instrument, trace, warn};

impl<H: Host> ModalForm<H> {
	/// Attaches the submit handler to `form` and, once per controller, the hidden handler to `modal`.
	///
	/// Must be called again whenever the form node is replaced. The previous form's handler is removed then.
	/// Binding also ends any in-flight state: a freshly bound form can be submitted.
	#[instrument(skip_all)]
	pub fn bind(&self, modal: &ElementOf<H>, form: FormOf<H>) {
		self.bind_hidden(modal);
		self.set_busy(false);

		let mut bound_form = self.bound_form.borrow_mut();
		if matches!(&*bound_form, Some((bound, _)) if *bound == form) {
			return trace!("Form is already bound.");
		}

		let this = self.this.clone();
		let is_delete_form = self.settings.is_delete_form;
		let listener = self.host.dom().on_submit(
			&form,
			Box::new(move || {
				if is_delete_form {
					trace!("Delete form; Letting the browser submit.");
					return SubmitAction::Proceed;
				}
				if let Some(this) = this.upgrade() {
					this.submitted();
				}
				SubmitAction::Intercept
			}),
		);
		*bound_form = Some((form, listener));
	}

	pub(crate) fn bind_hidden(&self, modal: &ElementOf<H>) {
		let mut hidden_listener = self.hidden_listener.borrow_mut();
		if hidden_listener.is_some() {
			return;
		}

		let this = self.this.clone();
		*hidden_listener = Some(self.host.modal().on_hidden(
			modal,
			Box::new(move || {
				if let Some(this) = this.upgrade() {
					this.hidden();
				}
			}),
		));
	}

	/// Starts a validation cycle unless one is running already.
	fn submitted(self: Rc<Self>) {
		if self.is_busy() {
			return warn!("A submission is already in flight; Ignoring this one.");
		}
		self.set_busy(true);

		let this = Rc::clone(&self);
		self.spawn("validate", async move { this.run_cycle().await });
	}

	/// Empties the content region so the next load starts from scratch, and invalidates pending continuations.
	fn hidden(&self) {
		self.invalidate();
		match self.modal().and_then(|modal| self.content(&modal)) {
			Ok(content) => self.host.dom().clear_children(&content),
			Err(error) => error!("Can't clear the hidden modal: {}", error),
		}
	}
}
