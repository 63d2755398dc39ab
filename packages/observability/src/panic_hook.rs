//! Capture of uncaught errors.
//!
//! A panic is the closest thing a Rust process has to an uncaught runtime
//! error. The hook records it as an `uncaught-error` entry carrying the panic
//! message and source location, then hands off to whatever hook was installed
//! before so the usual report still reaches stderr.

use std::any::Any;

use crate::sink::{LogKind, LogPayload, LogSink};

/// Chain a recording hook in front of the current panic hook.
pub(crate) fn install(sink: LogSink) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info.location();
        // try_record: the panic may have happened while the buffer was locked.
        let _ = sink.try_record(
            LogKind::UncaughtError,
            LogPayload::Uncaught {
                message: panic_message(info.payload()),
                url: location.map(|l| l.file().to_string()),
                line: location.map(|l| l.line()),
            },
        );
        previous(info);
    }));
}

/// Extract the human-readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
