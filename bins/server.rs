use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn main() -> ExitCode {
    // .env 先于日志加载，RUST_LOG 才能生效
    dotenv().ok();
    common::utils::logging::init_logging_default();

    let instance = Uuid::new_v4();
    let pid = std::process::id();

    std::panic::set_hook(Box::new(move |info| {
        error!(service = "cras-api", event = "panic", %instance, pid, message = %info, "unhandled panic");
    }));

    let cfg = match configs::AppConfig::load_or_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "cras-api", event = "config_invalid", error = %e, "cannot load configuration");
            return ExitCode::FAILURE;
        }
    };

    // 工作线程数来自 server.worker_threads（归一化后总有值）
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "cras-api", event = "runtime_build_failed", error = %e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "cras-api",
        event = "start",
        %instance,
        pid,
        version = env!("CARGO_PKG_VERSION"),
        threads = cfg.server.worker_threads.unwrap_or_default(),
        "cras digital api starting"
    );

    match rt.block_on(server::serve(cfg)) {
        Ok(()) => {
            info!(service = "cras-api", event = "stop", %instance, "stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "cras-api", event = "run_failed", error = %e);
            ExitCode::FAILURE
        }
    }
}
