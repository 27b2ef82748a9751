//! Interactive mode for the server.
//!
//! Prompts for the bind address, port, backend URL and survey store
//! directory, starting from the values read from the environment.

use dialoguer::{Confirm, Input};

use crate::ServerConfig;

fn ask(prompt: &str, default: String) -> String {
    Input::new()
        .with_prompt(prompt)
        .default(default.clone())
        .interact_text()
        .unwrap_or(default)
}

/// Asks the user to confirm or change each setting in `config`.
///
/// Returns `None` if the user declines to start the server.
#[must_use]
pub fn prompt(config: ServerConfig) -> Option<ServerConfig> {
    println!("Sinkhole Map Server");
    println!();

    let bind_addr = ask("Bind address", config.bind_addr);

    let port = ask("Port", config.port.to_string())
        .parse()
        .unwrap_or_else(|_| {
            log::warn!("Invalid port, using {}", config.port);
            config.port
        });

    let backend_url = ask("Prediction backend URL", config.backend_url);
    let survey_store_dir = ask("Survey store directory", config.survey_store_dir);

    let confirmed = Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true);

    confirmed.then_some(ServerConfig {
        bind_addr,
        port,
        backend_url,
        survey_store_dir,
    })
}
