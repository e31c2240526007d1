//! Boundaries to the collaborators the core drives but does not implement.

mod capture;
mod encoder;
mod injector;
mod presenter;
mod transcriber;

pub use {
    capture::{AudioSource, CaptureHandle, CaptureRequest},
    encoder::AudioEncoder,
    injector::TextInjector,
    presenter::{IndicatorState, NoopPresenter, StatePresenter},
    transcriber::Transcriber,
};
