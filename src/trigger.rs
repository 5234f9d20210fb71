use crate::{
	controller::ModalForm,
	host::{Dom, ElementOf, Host, ListenerOf},
	settings::Settings,
};
use std::rc::Rc;

/// A trigger element wired to open a modal form.
///
/// Dropping this removes the click listener. The controller lives on while anything else still holds it.
pub struct Trigger<H: Host> {
	pub(crate) controller: Rc<ModalForm<H>>,
	pub(crate) listener: ListenerOf<H>,
}

impl<H: Host> Trigger<H> {
	#[must_use]
	pub fn controller(&self) -> &Rc<ModalForm<H>> {
		&self.controller
	}
}

/// Makes a click on `trigger` load [`Settings::form_url`] into the configured modal.
pub fn modal_form<H: Host>(host: Rc<H>, trigger: &ElementOf<H>, settings: Settings) -> Trigger<H> {
	let controller = ModalForm::new(Rc::clone(&host), settings);
	let listener = host.dom().on_click(trigger, {
		let controller = Rc::clone(&controller);
		Box::new(move || controller.open())
	});
	Trigger { controller, listener }
}
