#![doc(html_root_url = "https://docs.rs/modal-forms/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Server-rendered forms in modal dialogs.
//!
//! A trigger click loads a form into a modal. Submitting it sends the data out of band for validation:
//! responses carrying the configured error marker replace the form in place, anything else counts as accepted
//! and is either submitted natively or saved asynchronously, optionally patching a region of the page.
//!
//! The page is reached only through the [`host`] traits. [`web::WebHost`] implements them with [`web_sys`] and Bootstrap.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod bind;
mod controller;
pub mod error;
pub mod host;
mod load;
pub mod settings;
mod submit;
mod trigger;
mod validate;
pub mod web;

pub use controller::{Generation, ModalForm};
pub use settings::{AsyncSettings, AsyncUpdate, PartialAsyncSettings, PartialSettings, ReArm, Settings};
pub use trigger::{modal_form, Trigger};
pub use validate::Verdict;
