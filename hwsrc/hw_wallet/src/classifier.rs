//! Maps raw daemon answers onto [`OperationResultKind`].
//!
//! The daemon reports device failures as free text. The text is matched against [`CLASSIFIER_RULES`]
//! in order and the first matching rule wins, so more specific phrases must stay above the phrases
//! they contain.

use crate::daemon::DaemonChecker;
use crate::result::{OperationResult, OperationResultKind};
use serde_json::Value as Json;
use std::sync::Arc;

/// Raw response substituted for a request that couldn't reach the daemon at all.
pub const DAEMON_UNREACHABLE_ERROR: &str = "Error connecting with the hw wallet service";
/// Raw response substituted for a request the daemon dropped after waiting for the user too long.
pub const DAEMON_TIMEOUT_ERROR: &str = "The operation was cancelled due to inactivity";

#[derive(Clone, Copy, Debug)]
pub enum Matcher {
    Contains(&'static str),
    ContainsIgnoreCase(&'static str),
}

impl Matcher {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Matcher::Contains(phrase) => text.contains(phrase),
            Matcher::ContainsIgnoreCase(phrase) => text.to_lowercase().contains(&phrase.to_lowercase()),
        }
    }
}

pub const CLASSIFIER_RULES: &[(Matcher, OperationResultKind)] = &[
    (Matcher::Contains("failed or refused"), OperationResultKind::FailedOrRefused),
    (Matcher::Contains("PIN invalid"), OperationResultKind::WrongPin),
    (Matcher::Contains("canceled by user"), OperationResultKind::FailedOrRefused),
    (Matcher::Contains("cancelled by user"), OperationResultKind::FailedOrRefused),
    (Matcher::Contains("Expected WordAck after Button"), OperationResultKind::FailedOrRefused),
    (Matcher::Contains("Wrong word retyped"), OperationResultKind::WrongWord),
    (Matcher::Contains("PIN mismatch"), OperationResultKind::PinMismatch),
    (Matcher::Contains("Mnemonic not set"), OperationResultKind::WithoutSeed),
    (Matcher::Contains("Mnemonic required"), OperationResultKind::WithoutSeed),
    (Matcher::Contains("Invalid seed, are words in correct order?"), OperationResultKind::InvalidSeed),
    (Matcher::Contains("does not match the one in the device"), OperationResultKind::WrongSeed),
    (Matcher::Contains("Invalid base58 character"), OperationResultKind::InvalidAddress),
    (Matcher::Contains("Invalid address length"), OperationResultKind::InvalidAddress),
    (Matcher::ContainsIgnoreCase("libusb"), OperationResultKind::DaemonError),
    (Matcher::ContainsIgnoreCase("hidapi"), OperationResultKind::Disconnected),
    (Matcher::ContainsIgnoreCase("device disconnected"), OperationResultKind::Disconnected),
    (Matcher::ContainsIgnoreCase("no device connected"), OperationResultKind::Disconnected),
    (Matcher::Contains(DAEMON_UNREACHABLE_ERROR), OperationResultKind::DaemonError),
    (Matcher::Contains(DAEMON_TIMEOUT_ERROR), OperationResultKind::Timeout),
    (Matcher::Contains("MessageType_Success"), OperationResultKind::Success),
];

/// Classifies the raw daemon response. Never fails: every input ends up in exactly one kind.
///
/// * An object with a non-null `error` field is matched by its error text, falling back to `UndefinedError`.
/// * Any other non-string payload is a completed request: it's `Success` if no phrases are required
///   or its text contains one of them, otherwise it's matched by the rules, falling back to `FailedOrRefused`.
/// * A bare string is the daemon's error message unless it contains one of the `success_phrases`.
pub fn classify_response(raw_response: Json, success_phrases: &[&str]) -> OperationResult {
    let kind = match error_text(&raw_response) {
        Some(error) => match_rules(&error).unwrap_or(OperationResultKind::UndefinedError),
        None => classify_payload(&raw_response, success_phrases),
    };
    OperationResult::new(kind, raw_response)
}

fn classify_payload(raw_response: &Json, success_phrases: &[&str]) -> OperationResultKind {
    let text = payload_text(raw_response);
    let contains_phrase = success_phrases.iter().any(|phrase| text.contains(phrase));
    match raw_response {
        Json::String(_) if contains_phrase => OperationResultKind::Success,
        Json::String(_) => match_rules(&text).unwrap_or(OperationResultKind::UndefinedError),
        _ if success_phrases.is_empty() || contains_phrase => OperationResultKind::Success,
        _ => match_rules(&text).unwrap_or(OperationResultKind::FailedOrRefused),
    }
}

fn match_rules(text: &str) -> Option<OperationResultKind> {
    CLASSIFIER_RULES
        .iter()
        .find(|(matcher, _)| matcher.matches(text))
        .map(|(_, kind)| *kind)
}

fn error_text(raw_response: &Json) -> Option<String> {
    let error = raw_response.get("error")?;
    match error {
        Json::Null => None,
        Json::String(error) => Some(error.clone()),
        other => match other.get("message").and_then(Json::as_str) {
            Some(message) => Some(message.to_owned()),
            None => Some(other.to_string()),
        },
    }
}

fn payload_text(raw_response: &Json) -> String {
    let payload = raw_response.get("data").unwrap_or(raw_response);
    match payload {
        Json::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// [`classify_response`] plus the daemon re-check scheduled on every `Disconnected` outcome.
#[derive(Clone)]
pub struct HwErrorClassifier {
    checker: Arc<dyn DaemonChecker>,
}

impl HwErrorClassifier {
    pub fn new(checker: Arc<dyn DaemonChecker>) -> HwErrorClassifier { HwErrorClassifier { checker } }

    pub fn classify(&self, raw_response: Json, success_phrases: &[&str]) -> OperationResult {
        let result = classify_response(raw_response, success_phrases);
        if result.kind == OperationResultKind::Disconnected {
            self.checker.schedule_check();
        }
        result
    }
}
