use crate::{
	error::{FlowError, TransportError},
	host::{Dom, ElementOf, FormDataOf, FormOf, HiddenListenerOf, Host, ListenerOf, ModalWidget, Request, Response, Transport},
	settings::Settings,
};
use core::cell::{Cell, RefCell};
use futures::future::{self, Either};
use std::rc::{Rc, Weak};
use tracing::{error, warn};

/// Identifies the modal session a continuation was started in.
///
/// Bumped every time the modal finishes hiding, which invalidates all continuations started before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// Drives one trigger's form through load, validation and submission.
///
/// Holds no DOM references across events except the listener guards of the currently bound form.
/// Several controllers may share a [`Host`], but each modal should be driven by the controllers of its own triggers only.
pub struct ModalForm<H: Host> {
	pub(crate) host: Rc<H>,
	pub(crate) settings: Settings,
	pub(crate) this: Weak<Self>,
	generation: Cell<u64>,
	busy: Cell<bool>,
	pub(crate) bound_form: RefCell<Option<(FormOf<H>, ListenerOf<H>)>>,
	pub(crate) hidden_listener: RefCell<Option<HiddenListenerOf<H>>>,
}

impl<H: Host> ModalForm<H> {
	#[must_use]
	pub fn new(host: Rc<H>, settings: Settings) -> Rc<Self> {
		Rc::new_cyclic(|this| Self {
			host,
			settings,
			this: this.clone(),
			generation: Cell::new(0),
			busy: Cell::new(false),
			bound_form: RefCell::new(None),
			hidden_listener: RefCell::new(None),
		})
	}

	#[must_use]
	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	#[must_use]
	pub fn generation(&self) -> Generation {
		Generation(self.generation.get())
	}

	#[must_use]
	pub fn is_live(&self, generation: Generation) -> bool {
		self.generation() == generation
	}

	/// Whether a validation or submission is in flight.
	#[must_use]
	pub fn is_busy(&self) -> bool {
		self.busy.get()
	}

	pub(crate) fn set_busy(&self, busy: bool) {
		self.busy.set(busy);
	}

	/// Invalidates every pending continuation and forgets the bound form.
	pub(crate) fn invalidate(&self) {
		self.generation.set(self.generation.get().wrapping_add(1));
		self.busy.set(false);
		self.bound_form.borrow_mut().take();
	}

	/// Runs `task` on the host's executor, logging how it ended.
	pub(crate) fn spawn(&self, name: &'static str, task: impl core::future::Future<Output = Result<(), FlowError>> + 'static) {
		self.host.spawn_local(Box::pin(async move {
			if let Err(error) = task.await {
				error!(task = name, "Modal form cycle halted: {}", error);
			}
		}));
	}

	/// `fetch` raced against the configured timeout. Non-2xx statuses are errors.
	pub(crate) async fn fetch(&self, request: Request<FormDataOf<H>>) -> Result<Response, TransportError> {
		let response = self.host.transport().fetch(request);
		let response = match self.settings.timeout {
			None => response.await,
			Some(timeout) => match future::select(response, self.host.sleep(timeout)).await {
				Either::Left((response, _)) => response,
				Either::Right(((), _)) => Err(TransportError::Timeout(timeout)),
			},
		};
		response?.error_for_status()
	}

	pub(crate) fn modal(&self) -> Result<ElementOf<H>, FlowError> {
		self.host.dom().query(&self.settings.modal_id).ok_or_else(|| FlowError::MissingElement {
			what: "modal container",
			selector: self.settings.modal_id.clone(),
		})
	}

	pub(crate) fn content(&self, modal: &ElementOf<H>) -> Result<ElementOf<H>, FlowError> {
		self.host.dom().query_within(modal, &self.settings.modal_content).ok_or_else(|| FlowError::MissingElement {
			what: "modal content region",
			selector: self.settings.modal_content.clone(),
		})
	}

	/// The form currently inside `modal`, if any.
	pub(crate) fn form(&self, modal: &ElementOf<H>) -> Option<FormOf<H>> {
		let dom = self.host.dom();
		dom.query_within(modal, &self.settings.modal_form).and_then(|element| dom.as_form(&element))
	}

	pub(crate) fn set_submit_disabled(&self, modal: &ElementOf<H>, disabled: bool) {
		let dom = self.host.dom();
		match dom.query_within(modal, &self.settings.submit_button) {
			Some(button) => dom.set_disabled(&button, disabled),
			None => warn!("No submit control matching {:?} in the modal.", self.settings.submit_button),
		}
	}

	/// Replaces the content region with `html`, then resets and binds the form it contains.
	///
	/// # Errors
	///
	/// [`FlowError::MissingForm`] iff `html` contains no form.
	pub(crate) fn redisplay(&self, modal: &ElementOf<H>, html: &str) -> Result<(), FlowError> {
		let dom = self.host.dom();
		dom.set_inner_html(&self.content(modal)?, html);
		let form = self.form(modal).ok_or(FlowError::MissingForm)?;
		dom.set_form_action(&form, &self.settings.form_url);
		self.bind(modal, form);
		Ok(())
	}

	/// Ends a failed cycle. Transport failures re-arm the form and become visible.
	///
	/// # Errors
	///
	/// Passes `error` through, so callers can `return self.fail(…)`.
	pub(crate) fn fail(&self, generation: Generation, error: FlowError) -> Result<(), FlowError> {
		if !self.is_live(generation) {
			warn!("Discarding failure of a stale modal form cycle: {}", error);
			return Ok(());
		}
		self.busy.set(false);
		if error.is_recoverable() {
			if let Ok(modal) = self.modal() {
				let dom = self.host.dom();
				if let Some(button) = dom.query_within(&modal, &self.settings.submit_button) {
					dom.set_disabled(&button, false);
				}
				if let Ok(content) = self.content(&modal) {
					dom.prepend_html(&content, &self.settings.failure_notice);
				}
			}
		}
		Err(error)
	}

	/// Hides the modal, if it has a widget instance.
	pub fn close(&self) {
		let modal = match self.modal() {
			Ok(modal) => modal,
			Err(error) => return error!("Can't close modal: {}", error),
		};
		let widget = self.host.modal();
		match widget.get_instance(&modal) {
			Some(instance) => widget.hide(&instance),
			None => warn!("Modal {:?} has no widget instance to hide.", self.settings.modal_id),
		}
	}
}
