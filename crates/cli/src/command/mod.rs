pub mod domain;
mod services;

pub use domain::{
    classify_error, CommandAction, CommandRequest, CommandResponse, CommandStatus, Hint, HintKind,
    ResponseMeta,
};

use crate::data::LoadedEngine;
use domain::CommandOutcome;
use policy_protocol::{ErrorEnvelope, SourceStatus};
use services::Services;
use std::time::Instant;

/// Executes JSON Command API requests against a loaded engine.
pub struct CommandHandler {
    services: Services,
    status: SourceStatus,
    degraded: Vec<String>,
}

impl CommandHandler {
    pub fn new(loaded: LoadedEngine) -> Self {
        let degraded = loaded.degraded_notes();
        Self {
            status: loaded.status,
            services: Services::new(loaded.engine, loaded.status),
            degraded,
        }
    }

    pub fn execute(&self, request: CommandRequest) -> CommandResponse {
        let started = Instant::now();
        let CommandRequest { action, payload } = request;
        log::debug!("command action={}", action.as_str());

        let outcome: anyhow::Result<CommandOutcome> = self.services.route(action, payload);
        let duration_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(mut outcome) => {
                outcome.hints.extend(
                    self.degraded
                        .iter()
                        .map(|note| Hint::new(HintKind::Warn, note.clone())),
                );
                outcome.meta.duration_ms = Some(duration_ms);
                outcome.meta.sources = Some(self.status);
                CommandResponse {
                    status: CommandStatus::Ok,
                    message: None,
                    error: None,
                    hints: outcome.hints,
                    next_actions: outcome.next_actions,
                    data: outcome.data,
                    meta: outcome.meta,
                }
            }
            Err(err) => {
                let mut response = error_response(&err, Some(action), duration_ms);
                response.meta.sources = Some(self.status);
                response
            }
        }
    }
}

/// Envelope for failures, including ones that happen before a handler exists.
pub fn error_response(
    err: &anyhow::Error,
    action: Option<CommandAction>,
    duration_ms: u64,
) -> CommandResponse {
    let message = format!("{err:#}");
    let classification = classify_error(err, action);
    log::debug!("command failed ({}): {message}", classification.code.as_str());
    let hints = classification.hints;
    let hint = classification
        .hint
        .or_else(|| hints.first().map(|h| h.text.clone()));
    let mut error = ErrorEnvelope::new(classification.code, message.clone());
    error.hint = hint;
    error.next_actions = classification.next_actions.clone();
    CommandResponse {
        status: CommandStatus::Error,
        message: Some(message),
        error: Some(error),
        hints,
        next_actions: classification.next_actions,
        data: serde_json::Value::Null,
        meta: ResponseMeta {
            duration_ms: Some(duration_ms),
            ..Default::default()
        },
    }
}
