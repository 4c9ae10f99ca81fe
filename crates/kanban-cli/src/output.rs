use kanban_core::KanbanError;
use serde::Serialize;

#[derive(Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn render<T: Serialize>(response: &CliResponse<T>) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        format!(
            r#"{{"success":false,"api_version":"{}","error":"failed to encode response: {}"}}"#,
            env!("CARGO_PKG_VERSION"),
            e
        )
    })
}

pub fn output_success<T: Serialize>(data: T) {
    let response = CliResponse {
        success: true,
        api_version: env!("CARGO_PKG_VERSION"),
        data: Some(data),
        error: None,
    };
    println!("{}", render(&response));
}

/// Text shown for a failed command. Store errors use their user-facing
/// message; anything else is already readable as-is.
pub fn error_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<KanbanError>() {
        Some(kanban_error) => kanban_error.user_message(),
        None => error.to_string(),
    }
}

/// Print an error response to stderr and exit with status 1.
pub fn output_error(message: &str) -> ! {
    let response: CliResponse<()> = CliResponse {
        success: false,
        api_version: env!("CARGO_PKG_VERSION"),
        data: None,
        error: Some(message.to_string()),
    };
    eprintln!("{}", render(&response));
    std::process::exit(1);
}
