//! The seams between the controller and the page it runs in.
//!
//! [`Dom`], [`ModalWidget`] and [`Transport`] are the three external collaborators.
//! [`Host`] bundles one of each with a local task spawner and a timer.
//! [`crate::web`] implements all of them for the browser.

use crate::{error::TransportError, settings::{Credentials, ModalOptions}};
use core::{fmt::Debug, time::Duration};
use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;

/// Header marking a request as programmatic, so the server can answer with a partial.
pub const REQUESTED_WITH: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

/// Form field appended to async saves. The server must save without redirecting when it's present.
pub const ASYNC_UPDATE_FIELD: (&str, &str) = ("asyncUpdate", "True");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
	Get,
	Post,
	Put,
	Patch,
	Delete,
}

impl Method {
	/// Interprets a form's `method` attribute. Like browsers, anything unrecognised means `GET`.
	#[must_use]
	pub fn from_form_attribute(method: &str) -> Self {
		match method.trim().to_ascii_uppercase().as_str() {
			"POST" => Method::Post,
			"PUT" => Method::Put,
			"PATCH" => Method::Patch,
			"DELETE" => Method::Delete,
			_ => Method::Get,
		}
	}

	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}

/// A `fetch` call. `B` is the host's form data representation.
#[derive(Debug)]
pub struct Request<B> {
	pub url: String,
	pub method: Method,
	pub headers: Vec<(&'static str, &'static str)>,
	pub body: Option<B>,
	pub credentials: Credentials,
}

impl<B> Request<B> {
	pub fn get(url: impl Into<String>, credentials: Credentials) -> Self {
		Self {
			url: url.into(),
			method: Method::Get,
			headers: Vec::new(),
			body: None,
			credentials,
		}
	}

	pub fn with_form(url: impl Into<String>, method: Method, body: B, credentials: Credentials) -> Self {
		Self {
			url: url.into(),
			method,
			headers: Vec::new(),
			body: Some(body),
			credentials,
		}
	}

	#[must_use]
	pub fn header(mut self, (name, value): (&'static str, &'static str)) -> Self {
		self.headers.push((name, value));
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
	pub status: u16,
	pub body: String,
}

impl Response {
	pub fn ok(body: impl Into<String>) -> Self {
		Self { status: 200, body: body.into() }
	}

	#[must_use]
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// # Errors
	///
	/// [`TransportError::Status`] iff the status is outside `200..300`.
	pub fn error_for_status(self) -> Result<Self, TransportError> {
		if self.is_success() {
			Ok(self)
		} else {
			Err(TransportError::Status(self.status))
		}
	}

	/// # Errors
	///
	/// Iff the body isn't valid JSON for `T`.
	pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
		Ok(serde_json::from_str(&self.body)?)
	}
}

/// What a submit listener wants done with the browser's native submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
	/// `preventDefault()`.
	Intercept,
	/// Let the browser navigate.
	Proceed,
}

/// DOM query and manipulation primitives.
///
/// Element handles are cheap clones referring to the same node.
/// Nothing is cached across events by the controller: content is replaced wholesale, so elements are looked up again each time.
pub trait Dom {
	type Element: Clone + Debug + PartialEq;
	type Form: Clone + Debug + PartialEq;
	type FormData;
	/// Removes its listener when dropped.
	type Listener;

	fn query(&self, selector: &str) -> Option<Self::Element>;
	fn query_within(&self, scope: &Self::Element, selector: &str) -> Option<Self::Element>;
	fn body(&self) -> Option<Self::Element>;

	/// Replaces all children with the parsed `html`. The markup is trusted and not sanitised.
	fn set_inner_html(&self, element: &Self::Element, html: &str);
	/// Inserts the parsed `html` before the first child.
	fn prepend_html(&self, element: &Self::Element, html: &str);
	fn clear_children(&self, element: &Self::Element);
	fn set_disabled(&self, element: &Self::Element, disabled: bool);

	fn as_form(&self, element: &Self::Element) -> Option<Self::Form>;
	fn form_action(&self, form: &Self::Form) -> String;
	fn set_form_action(&self, form: &Self::Form, action: &str);
	fn form_method(&self, form: &Self::Form) -> Method;
	/// Serializes the form's current fields, files included.
	fn form_data(&self, form: &Self::Form) -> Self::FormData;
	fn append_form_field(&self, data: &mut Self::FormData, name: &str, value: &str);
	/// Native, navigating submission. Does not fire submit listeners.
	fn submit_form(&self, form: &Self::Form);

	fn on_submit(&self, form: &Self::Form, listener: Box<dyn Fn() -> SubmitAction>) -> Self::Listener;
	fn on_click(&self, element: &Self::Element, listener: Box<dyn Fn()>) -> Self::Listener;
}

/// Show/hide lifecycle of a modal dialog widget.
pub trait ModalWidget {
	type Element;
	type Instance;
	type Listener;

	fn get_instance(&self, container: &Self::Element) -> Option<Self::Instance>;
	fn create_instance(&self, container: &Self::Element, options: ModalOptions) -> Self::Instance;
	fn show(&self, instance: &Self::Instance);
	fn hide(&self, instance: &Self::Instance);
	/// Fires once the modal has finished closing.
	fn on_hidden(&self, container: &Self::Element, listener: Box<dyn Fn()>) -> Self::Listener;

	fn get_or_create_instance(&self, container: &Self::Element, options: ModalOptions) -> Self::Instance {
		match self.get_instance(container) {
			Some(instance) => instance,
			None => self.create_instance(container, options),
		}
	}
}

/// HTTP `fetch`. Responses of any status are returned as [`Ok`].
pub trait Transport {
	type FormData;

	fn fetch(&self, request: Request<Self::FormData>) -> LocalBoxFuture<'static, Result<Response, TransportError>>;
}

/// Everything a [`ModalForm`](`crate::ModalForm`) needs from its environment.
pub trait Host: 'static {
	type Dom: Dom;
	type Modal: ModalWidget<Element = ElementOf<Self>>;
	type Transport: Transport<FormData = FormDataOf<Self>>;

	fn dom(&self) -> &Self::Dom;
	fn modal(&self) -> &Self::Modal;
	fn transport(&self) -> &Self::Transport;

	/// Runs `task` to completion on the current thread, cooperatively.
	fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);
	fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

pub type ElementOf<H> = <<H as Host>::Dom as Dom>::Element;
pub type FormOf<H> = <<H as Host>::Dom as Dom>::Form;
pub type FormDataOf<H> = <<H as Host>::Dom as Dom>::FormData;
pub type ListenerOf<H> = <<H as Host>::Dom as Dom>::Listener;
pub type HiddenListenerOf<H> = <<H as Host>::Modal as ModalWidget>::Listener;
