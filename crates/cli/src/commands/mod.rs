pub mod cart;
pub mod migrate;

use serde::Serialize;

/// Process exit code plus the text printed to stdout.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct StatusPayload<'a> {
    command: &'a str,
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_class: Option<&'a str>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::status(command, None, message.into(), 0)
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::status(command, Some(error_class), message.into(), exit_code)
    }

    fn status(command: &str, error_class: Option<&str>, message: String, exit_code: u8) -> Self {
        let payload = StatusPayload {
            command,
            status: if error_class.is_some() { "error" } else { "ok" },
            error_class,
            message,
        };
        Self { exit_code, output: serialize_payload(&payload) }
    }
}

pub(crate) fn serialize_payload<T: Serialize>(payload: &T) -> String {
    serde_json::to_string(payload).unwrap_or_else(|error| {
        serde_json::json!({
            "command": "unknown",
            "status": "error",
            "error_class": "serialization",
            "message": error.to_string(),
        })
        .to_string()
    })
}
