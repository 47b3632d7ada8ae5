use crate::cli::OutputFormatter;
use crate::config::Settings;
use crate::error::Result;

/// Handler for `ticket-desk serve`
pub fn handle_serve(
    mut settings: Settings,
    host: Option<String>,
    port: Option<u16>,
    output: &OutputFormatter,
) -> Result<()> {
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }
    if settings.auth.jwt_secret.is_none() {
        output.warning("auth.jwt_secret is not set; issued tokens stop working on restart");
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(crate::api::serve(settings))
}
