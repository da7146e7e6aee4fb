use std::process::ExitCode;

use configs::AppConfig;
use dotenvy::dotenv;
use server::startup::{load_config, LoadedConfig};
use tokio::runtime::Runtime;
use tracing::{error, info, warn};
use uuid::Uuid;

const SERVICE: &str = "titles";

fn build_runtime(worker_threads: Option<usize>) -> std::io::Result<Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads {
        builder.worker_threads(w);
    }
    builder.build()
}

fn install_panic_hook(instance: Uuid) {
    std::panic::set_hook(Box::new(move |info| {
        error!(service = SERVICE, event = "panic", %instance, message = %info, "unhandled panic occurred");
    }));
}

/// Serve until the server stops on its own or Ctrl+C arrives.
async fn serve(cfg: AppConfig, instance: Uuid) -> ExitCode {
    let server_task = tokio::spawn(server::run(cfg));
    tokio::select! {
        res = server_task => match res {
            Ok(Ok(())) => {
                info!(service = SERVICE, event = "stop", %instance, "server stopped");
                ExitCode::SUCCESS
            }
            Ok(Err(e)) => {
                error!(service = SERVICE, event = "run_failed", error = %e, "server exited with error");
                ExitCode::FAILURE
            }
            Err(e) => {
                error!(service = SERVICE, event = "task_join_error", error = %e, "server task join error");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            info!(service = SERVICE, event = "shutdown_signal", %instance, "received Ctrl+C, shutting down");
            ExitCode::SUCCESS
        }
    }
}

fn main() -> ExitCode {
    // .env must be loaded before the config and RUST_LOG are read
    dotenv().ok();

    let LoadedConfig { config, file_error } = match load_config() {
        Ok(loaded) => loaded,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = SERVICE, event = "config_invalid", error = %e, "no usable configuration");
            return ExitCode::FAILURE;
        }
    };
    common::utils::logging::init_logging(config.logging.json);
    if let Some(reason) = file_error {
        warn!(service = SERVICE, event = "config_fallback", %reason, "config file unusable, using environment configuration");
    }

    let instance = Uuid::new_v4();
    install_panic_hook(instance);

    let worker_threads = config.server.worker_threads;
    let rt = match build_runtime(worker_threads) {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = SERVICE, event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = SERVICE,
        event = "start",
        %instance,
        pid = std::process::id(),
        version = env!("CARGO_PKG_VERSION"),
        threads = worker_threads.unwrap_or_default(),
        "titles service starting"
    );
    rt.block_on(serve(config, instance))
}
