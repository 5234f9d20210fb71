//! Browser [`Host`]: [`web_sys`] DOM, Bootstrap's `Modal` widget, and `window.fetch`.
//!
//! Bootstrap 5 must be loaded globally, i.e. `bootstrap.Modal` has to resolve.

use crate::{
	error::TransportError,
	host::{Dom, Host, Method, ModalWidget, Request, Response, SubmitAction, Transport},
	settings::{Credentials, ModalOptions, PartialSettings, ReArm, Settings},
	trigger::{modal_form, Trigger},
};
use core::time::Duration;
use futures::future::LocalBoxFuture;
use js_sys::{Function, Object, Promise, Reflect, JSON};
use std::rc::Rc;
use tracing::{error, instrument, trace, warn};
use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue, UnwrapThrowExt};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, EventTarget, FormData, Headers, HtmlFormElement, RequestCredentials, RequestInit, Window};

#[wasm_bindgen]
extern "C" {
	/// `bootstrap.Modal`.
	#[wasm_bindgen(js_namespace = bootstrap, js_name = Modal)]
	#[derive(Debug, Clone)]
	pub type BootstrapModal;

	#[wasm_bindgen(static_method_of = BootstrapModal, js_namespace = bootstrap, js_class = "Modal", js_name = getInstance)]
	fn get_instance(element: &Element) -> Option<BootstrapModal>;

	#[wasm_bindgen(constructor, js_namespace = bootstrap, js_class = "Modal")]
	fn new(element: &Element, options: &JsValue) -> BootstrapModal;

	#[wasm_bindgen(method)]
	fn show(this: &BootstrapModal);

	#[wasm_bindgen(method)]
	fn hide(this: &BootstrapModal);
}

/// Bootstrap fires this once the modal has finished its closing transition.
pub const HIDDEN_EVENT: &str = "hidden.bs.modal";

/// An event listener that is removed when this guard is dropped.
#[derive(Debug)]
pub struct EventListener {
	target: EventTarget,
	event_type: &'static str,
	callback: Option<Closure<dyn Fn(web_sys::Event)>>,
}

impl EventListener {
	pub fn new(target: &EventTarget, event_type: &'static str, callback: impl Fn(web_sys::Event) + 'static) -> Self {
		let callback = Closure::wrap(Box::new(callback) as Box<dyn Fn(web_sys::Event)>);
		if let Err(error) = target.add_event_listener_with_callback(event_type, callback.as_ref().unchecked_ref()) {
			error!("Failed to add {:?} listener: {:?}", event_type, error);
		}
		Self {
			target: target.clone(),
			event_type,
			callback: Some(callback),
		}
	}

	/// Keeps the listener attached for the rest of the page's lifetime.
	pub fn forget(mut self) {
		if let Some(callback) = self.callback.take() {
			callback.forget();
		}
	}
}

impl Drop for EventListener {
	fn drop(&mut self) {
		if let Some(callback) = self.callback.take() {
			if let Err(error) = self.target.remove_event_listener_with_callback(self.event_type, callback.as_ref().unchecked_ref()) {
				warn!("Failed to remove {:?} listener: {:?}", self.event_type, error);
			}
		}
	}
}

#[derive(Debug, Clone)]
pub struct WebHost {
	window: Window,
	document: Document,
}

impl WebHost {
	/// [`None`] outside of a browser window context.
	#[must_use]
	pub fn new() -> Option<Self> {
		let window = web_sys::window()?;
		let document = window.document()?;
		Some(Self { window, document })
	}
}

fn network_error(error: JsValue) -> TransportError {
	TransportError::Network(format!("{:?}", error))
}

impl Dom for WebHost {
	type Element = Element;
	type Form = HtmlFormElement;
	type FormData = FormData;
	type Listener = EventListener;

	fn query(&self, selector: &str) -> Option<Element> {
		self.document.query_selector(selector).unwrap_or_else(|error| {
			error!("Invalid selector {:?}: {:?}", selector, error);
			None
		})
	}

	fn query_within(&self, scope: &Element, selector: &str) -> Option<Element> {
		scope.query_selector(selector).unwrap_or_else(|error| {
			error!("Invalid selector {:?}: {:?}", selector, error);
			None
		})
	}

	fn body(&self) -> Option<Element> {
		self.document.body().map(Into::into)
	}

	fn set_inner_html(&self, element: &Element, html: &str) {
		element.set_inner_html(html);
	}

	fn prepend_html(&self, element: &Element, html: &str) {
		if let Err(error) = element.insert_adjacent_html("afterbegin", html) {
			error!("Failed to insert HTML: {:?}", error);
		}
	}

	fn clear_children(&self, element: &Element) {
		while let Some(child) = element.last_child() {
			if let Err(error) = element.remove_child(&child) {
				return error!("Failed to remove the node: {:?}", error);
			}
		}
	}

	fn set_disabled(&self, element: &Element, disabled: bool) {
		let result = if disabled {
			element.set_attribute("disabled", "")
		} else {
			element.remove_attribute("disabled")
		};
		if let Err(error) = result {
			error!("Failed to toggle `disabled`: {:?}", error);
		}
	}

	fn as_form(&self, element: &Element) -> Option<HtmlFormElement> {
		element.dyn_ref::<HtmlFormElement>().cloned()
	}

	fn form_action(&self, form: &HtmlFormElement) -> String {
		form.action()
	}

	fn set_form_action(&self, form: &HtmlFormElement, action: &str) {
		form.set_action(action);
	}

	fn form_method(&self, form: &HtmlFormElement) -> Method {
		Method::from_form_attribute(&form.method())
	}

	fn form_data(&self, form: &HtmlFormElement) -> FormData {
		FormData::new_with_form(form).expect_throw("modal-forms: Failed to read form data.")
	}

	fn append_form_field(&self, data: &mut FormData, name: &str, value: &str) {
		if let Err(error) = data.append_with_str(name, value) {
			error!("Failed to append form field {:?}: {:?}", name, error);
		}
	}

	fn submit_form(&self, form: &HtmlFormElement) {
		if let Err(error) = form.submit() {
			error!("Native form submission failed: {:?}", error);
		}
	}

	fn on_submit(&self, form: &HtmlFormElement, listener: Box<dyn Fn() -> SubmitAction>) -> EventListener {
		EventListener::new(form, "submit", move |event| {
			if listener() == SubmitAction::Intercept {
				event.prevent_default();
			}
		})
	}

	fn on_click(&self, element: &Element, listener: Box<dyn Fn()>) -> EventListener {
		EventListener::new(element, "click", move |_| listener())
	}
}

impl ModalWidget for WebHost {
	type Element = Element;
	type Instance = BootstrapModal;
	type Listener = EventListener;

	fn get_instance(&self, container: &Element) -> Option<BootstrapModal> {
		BootstrapModal::get_instance(container)
	}

	fn create_instance(&self, container: &Element, options: ModalOptions) -> BootstrapModal {
		let js_options = Object::new();
		if let Err(error) = Reflect::set(&js_options, &"keyboard".into(), &options.keyboard.into()) {
			error!("Failed to set modal option `keyboard`: {:?}", error);
		}
		BootstrapModal::new(container, &js_options)
	}

	fn show(&self, instance: &BootstrapModal) {
		instance.show();
	}

	fn hide(&self, instance: &BootstrapModal) {
		instance.hide();
	}

	fn on_hidden(&self, container: &Element, listener: Box<dyn Fn()>) -> EventListener {
		EventListener::new(container, HIDDEN_EVENT, move |_| listener())
	}
}

impl Transport for WebHost {
	type FormData = FormData;

	#[instrument(skip(self, request), fields(url = %request.url, method = request.method.as_str()))]
	fn fetch(&self, request: Request<FormData>) -> LocalBoxFuture<'static, Result<Response, TransportError>> {
		let window = self.window.clone();
		Box::pin(async move {
			let init = RequestInit::new();
			init.set_method(request.method.as_str());
			init.set_credentials(match request.credentials {
				Credentials::Omit => RequestCredentials::Omit,
				Credentials::SameOrigin => RequestCredentials::SameOrigin,
				Credentials::Include => RequestCredentials::Include,
			});
			if !request.headers.is_empty() {
				let headers = Headers::new().map_err(network_error)?;
				for (name, value) in &request.headers {
					headers.append(name, value).map_err(network_error)?;
				}
				init.set_headers(&headers);
			}
			if let Some(body) = &request.body {
				if request.method == Method::Get {
					warn!("Dropping the body of a GET request to {:?}.", request.url);
				} else {
					init.set_body(body);
				}
			}

			let response: web_sys::Response = JsFuture::from(window.fetch_with_str_and_init(&request.url, &init))
				.await
				.map_err(network_error)?
				.dyn_into()
				.map_err(network_error)?;
			let body = JsFuture::from(response.text().map_err(network_error)?).await.map_err(network_error)?;
			trace!(status = response.status(), "Response received.");
			Ok(Response {
				status: response.status(),
				body: body.as_string().unwrap_or_default(),
			})
		})
	}
}

impl Host for WebHost {
	type Dom = Self;
	type Modal = Self;
	type Transport = Self;

	fn dom(&self) -> &Self {
		self
	}

	fn modal(&self) -> &Self {
		self
	}

	fn transport(&self) -> &Self {
		self
	}

	fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
		wasm_bindgen_futures::spawn_local(task);
	}

	fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
		let window = self.window.clone();
		let timeout = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
		let promise = Promise::new(&mut |resolve, _reject| {
			if let Err(error) = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, timeout) {
				error!("Failed to schedule timeout: {:?}", error);
			}
		});
		Box::pin(async move {
			if let Err(error) = JsFuture::from(promise).await {
				error!("Timeout promise rejected: {:?}", error);
			}
		})
	}
}

impl Trigger<WebHost> {
	/// Keeps the trigger wired for the rest of the page's lifetime.
	pub fn forget(self) {
		self.listener.forget();
	}
}

/// Reads a JavaScript settings object with the keys of the `modalForm` jQuery plugin.
///
/// `asyncSettings.addModalFormFunction`, if it is a function, becomes the [`ReArm`] callback.
/// Every other key is read through [`PartialSettings::from_json`].
///
/// # Errors
///
/// Iff `settings` isn't an object or contains invalid values.
pub fn read_settings(settings: &JsValue) -> Result<PartialSettings, JsValue> {
	if !settings.is_object() {
		return Err(JsValue::from_str("modal-forms: Settings must be an object."));
	}
	let json = JSON::stringify(settings)?
		.as_string()
		.ok_or_else(|| JsValue::from_str("modal-forms: Settings can't be serialised."))?;
	let mut partial = PartialSettings::from_json(&json).map_err(|error| JsValue::from_str(&error.to_string()))?;

	let async_settings = Reflect::get(settings, &"asyncSettings".into())?;
	if async_settings.is_object() {
		if let Ok(function) = Reflect::get(&async_settings, &"addModalFormFunction".into())?.dyn_into::<Function>() {
			partial.async_settings.add_modal_form_function = Some(ReArm::new(move || {
				if let Err(error) = function.call0(&JsValue::NULL) {
					error!("`addModalFormFunction` threw: {:?}", error);
				}
			}));
		}
	}
	Ok(partial)
}

/// [`read_settings`], then [resolved](`PartialSettings::resolve`).
///
/// # Errors
///
/// Iff `settings` can't be read or is incomplete.
pub fn settings_from_js(settings: &JsValue) -> Result<Settings, JsValue> {
	read_settings(settings)?.resolve().map_err(|error| JsValue::from_str(&error.to_string()))
}

/// JavaScript entry point. Wires `trigger` for the rest of the page's lifetime.
///
/// # Errors
///
/// Iff `settings` can't be read or resolved, or there's no browser window.
#[wasm_bindgen(js_name = modalForm)]
pub fn modal_form_js(trigger: Element, settings: JsValue) -> Result<Element, JsValue> {
	let settings = settings_from_js(&settings)?;
	let host = WebHost::new().ok_or_else(|| JsValue::from_str("modal-forms: No browser window."))?;
	modal_form(Rc::new(host), &trigger, settings).forget();
	Ok(trigger)
}
