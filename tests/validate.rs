use modal_forms::{
	host::{Method, Response, REQUESTED_WITH},
	modal_form,
	settings::{PartialSettings, DEFAULT_FAILURE_NOTICE},
	Settings, Trigger,
};
use std::rc::Rc;

use fake_host_::{FakeHost, Logs, Page, Scripted, ACCEPTED, CONTENT, FORM, FORM_URL, INVALID_FORM, TRIGGER};

/// A page with [`FORM`] loaded into the shown modal.
fn loaded(settings: Settings) -> (Page, Trigger<FakeHost>) {
	let mut page = Page::new();
	let trigger = modal_form(Rc::clone(&page.host), &TRIGGER, settings);
	page.transport().respond(FORM);
	page.dom().click(TRIGGER);
	page.settle();
	assert!(page.modal().is_shown());
	(page, trigger)
}

#[test]
fn validation_request_carries_the_form() {
	let (mut page, _trigger) = loaded(Settings::for_url(FORM_URL).unwrap());
	page.transport().respond(INVALID_FORM);

	assert!(page.dom().submit());
	page.settle();

	let requests = page.transport().requests();
	assert_eq!(requests.len(), 2);
	let validation = &requests[1];
	assert_eq!(validation.url, FORM_URL);
	assert_eq!(validation.method, Method::Post);
	assert_eq!(validation.headers, vec![REQUESTED_WITH]);
	assert_eq!(validation.field("title"), Some("Dune"));
	assert_eq!(validation.field("cover"), Some(""));
	assert_eq!(validation.field("asyncUpdate"), None);
}

#[test]
fn rejected_form_is_redisplayed_and_rebound() {
	let (mut page, _trigger) = loaded(Settings::for_url(FORM_URL).unwrap());
	let first_form = page.dom().current_form().unwrap();
	page.transport().respond(INVALID_FORM);

	page.dom().submit();
	page.settle();

	assert_eq!(page.dom().html(CONTENT), INVALID_FORM);
	let form = page.dom().current_form().unwrap();
	assert_ne!(form.id, first_form.id);
	assert_eq!(form.action, FORM_URL);
	assert_eq!(page.dom().submit_listener_count(), 1);
	assert_eq!(page.dom().button_disabled(), Some(false));
	assert!(page.dom().native_submits().is_empty());

	page.transport().respond(INVALID_FORM);
	assert!(page.dom().submit());
	page.settle();

	let requests = page.transport().requests();
	assert_eq!(requests.len(), 3);
	assert_eq!(requests[2].url, FORM_URL);
	assert_eq!(requests[2].headers, vec![REQUESTED_WITH]);
}

#[test]
fn error_loop_ends_in_one_native_submit() {
	let (mut page, _trigger) = loaded(Settings::for_url(FORM_URL).unwrap());

	for _ in 0..3 {
		let response = page.transport().respond_later();
		page.dom().submit();
		page.settle();
		assert_eq!(page.dom().button_disabled(), Some(true));

		response.send(Response::ok(INVALID_FORM)).unwrap();
		page.settle();
		assert_eq!(page.dom().button_disabled(), Some(false));
		assert_eq!(page.dom().forms_in_content(), 1);
	}

	page.transport().respond(ACCEPTED);
	page.dom().submit();
	page.settle();

	let form = page.dom().current_form().unwrap();
	assert_eq!(page.dom().native_submits(), vec![form.id]);
	assert_eq!(page.transport().requests().len(), 5);
}

#[test]
fn second_submit_while_in_flight_is_ignored() {
	let (mut page, _trigger) = loaded(Settings::for_url(FORM_URL).unwrap());
	let (logs, _guard) = Logs::capture();
	let response = page.transport().respond_later();

	assert!(page.dom().submit());
	assert!(page.dom().submit());
	page.settle();

	assert_eq!(page.transport().requests().len(), 2);
	assert_eq!(logs.containing("already in flight").len(), 1);

	response.send(Response::ok(ACCEPTED)).unwrap();
	page.settle();
	assert_eq!(page.dom().native_submits().len(), 1);
}

#[test]
fn delete_form_submits_natively() {
	let (mut page, _trigger) = loaded(PartialSettings::new(FORM_URL).delete_form().resolve().unwrap());
	let form = page.dom().current_form().unwrap();

	assert!(!page.dom().submit());
	page.settle();

	assert_eq!(page.dom().navigations(), vec![form.id]);
	assert_eq!(page.transport().requests().len(), 1);
}

#[test]
fn rejection_without_a_form_halts_the_cycle() {
	let (mut page, _trigger) = loaded(Settings::for_url(FORM_URL).unwrap());
	let (logs, _guard) = Logs::capture();
	page.transport().respond(r#"<p class="is-invalid">Something broke.</p>"#);

	page.dom().submit();
	page.settle();

	assert_eq!(logs.containing("no form present in response").len(), 1);
	assert!(page.dom().current_form().is_none());
	assert!(!page.dom().html(CONTENT).contains(DEFAULT_FAILURE_NOTICE));
	assert!(page.dom().native_submits().is_empty());
}

#[test]
fn network_failure_rearms_the_form() {
	let (mut page, _trigger) = loaded(Settings::for_url(FORM_URL).unwrap());
	page.transport().push(Scripted::Fail("connection reset"));

	page.dom().submit();
	page.settle();

	assert_eq!(page.dom().button_disabled(), Some(false));
	assert!(page.dom().html(CONTENT).starts_with(DEFAULT_FAILURE_NOTICE));
	assert!(page.dom().native_submits().is_empty());

	page.transport().respond(ACCEPTED);
	assert!(page.dom().submit());
	page.settle();

	assert_eq!(page.dom().native_submits().len(), 1);
}

#[test]
fn server_error_is_not_an_acceptance() {
	let (mut page, _trigger) = loaded(Settings::for_url(FORM_URL).unwrap());
	page.transport().push(Scripted::Respond(Response {
		status: 500,
		body: "<h1>Server Error</h1>".to_owned(),
	}));

	page.dom().submit();
	page.settle();

	assert!(page.dom().native_submits().is_empty());
	assert!(page.dom().html(CONTENT).starts_with(DEFAULT_FAILURE_NOTICE));
	assert_eq!(page.dom().button_disabled(), Some(false));
}

#[test]
fn custom_error_class() {
	let settings = PartialSettings {
		error_class: Some("has-error".to_owned()),
		..PartialSettings::new(FORM_URL)
	}
	.resolve()
	.unwrap();
	let (mut page, _trigger) = loaded(settings);
	page.transport().respond(INVALID_FORM);

	page.dom().submit();
	page.settle();

	// `is-invalid` means nothing with this configuration.
	assert_eq!(page.dom().native_submits().len(), 1);
}

#[test]
fn empty_error_class_does_not_reject_everything() {
	let settings = PartialSettings {
		error_class: Some(String::new()),
		..PartialSettings::new(FORM_URL)
	}
	.resolve()
	.unwrap();
	let (mut page, _trigger) = loaded(settings);
	page.transport().respond(ACCEPTED);

	page.dom().submit();
	page.settle();

	assert_eq!(page.dom().native_submits().len(), 1);
}

#[test]
fn response_after_dismissal_is_discarded() {
	let (mut page, _trigger) = loaded(Settings::for_url(FORM_URL).unwrap());
	let (logs, _guard) = Logs::capture();
	let response = page.transport().respond_later();

	page.dom().submit();
	page.settle();
	page.modal().dismiss();
	response.send(Response::ok(INVALID_FORM)).unwrap();
	page.settle();

	assert_eq!(page.dom().html(CONTENT), "");
	assert!(page.dom().current_form().is_none());
	assert_eq!(page.dom().submit_listener_count(), 0);
	assert_eq!(logs.containing("closed during validation").len(), 1);
}

#[test]
fn failure_after_dismissal_stays_silent() {
	let (mut page, _trigger) = loaded(Settings::for_url(FORM_URL).unwrap());
	let response = page.transport().respond_later();

	page.dom().submit();
	page.settle();
	page.modal().dismiss();
	drop(response);
	page.settle();

	assert_eq!(page.dom().html(CONTENT), "");
}
