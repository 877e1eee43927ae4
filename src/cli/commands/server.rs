//! server command - Run the scaffolding HTTP server

use std::sync::Arc;

use crate::cli::args::{Command, ServerArgs};
use crate::cli::Context;
use crate::core::config::Config;
use crate::core::logging;
use crate::core::versions::{self, CommandProbe};
use crate::openapi::OpenApi;
use crate::scaffold::TemplateBackend;
use crate::server::{self, AppState, ServerOverrides, Settings};
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Resolve settings, build the router state and serve until Ctrl-C.
pub fn server(command: Command, ctx: &Context) -> Result<()> {
    let Command::Server(args) = command else {
        return Err(super::mismatch("server", &command));
    };

    let config = Config::load()?;
    if let Some(path) = config.path() {
        output::debug(format!("config: {}", path.display()), ctx.verbosity());
    }
    let settings = Settings::init(&config, &overrides(&args, ctx))?;
    logging::init(settings.debug);

    let openapi = OpenApi::bundled().context("bundled OpenAPI document is invalid")?;
    let versions = versions::as_map(&versions::collect(&CommandProbe));
    let state = AppState::new(
        openapi,
        Arc::new(TemplateBackend::new()),
        settings,
        versions,
    );

    // Run async server
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(server::serve(state))
        .context("server stopped with an error")?;
    Ok(())
}

fn overrides(args: &ServerArgs, ctx: &Context) -> ServerOverrides {
    ServerOverrides {
        port: args.port,
        bind: args.bind.clone(),
        debug: ctx.debug,
        timeout_secs: args.timeout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_become_overrides() {
        let args = ServerArgs {
            port: Some(9000),
            bind: Some("127.0.0.1".to_string()),
            timeout: Some(5),
        };
        let ctx = Context {
            debug: true,
            quiet: false,
        };
        let o = overrides(&args, &ctx);
        assert_eq!(o.port, Some(9000));
        assert_eq!(o.bind.as_deref(), Some("127.0.0.1"));
        assert!(o.debug);
        assert_eq!(o.timeout_secs, Some(5));
    }
}
