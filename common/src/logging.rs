use crate::config::{CONFIG, Loki};
use std::fs::File;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};
use url::Url;

/// Crates whose events are kept next to the binary's own.
const LIBRARY_TARGETS: [&str; 2] = ["console", "requester"];

/// Installs the global subscriber for the binary `module_name`: stdout,
/// `{module_name}/log.txt` and, when `loki.url` is configured, a loki push
/// layer. Must run inside a tokio runtime, the loki background task is
/// spawned on it.
pub fn setup_logging(module_name: &str) {
    let directives = filter_directives(module_name);

    let stdout = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_filter(EnvFilter::new(&directives));

    let log_file = tracing_subscriber::fmt::layer()
        .with_writer(open_log_file(module_name))
        .with_ansi(false)
        .with_target(true)
        .with_filter(EnvFilter::new(&directives));

    let loki = CONFIG
        .loki
        .as_ref()
        .map(|loki| loki_layer(loki, module_name).with_filter(EnvFilter::new(&directives)));

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(stdout)
            .with(log_file)
            .with(loki),
    )
    .expect("failed to set global default");
}

fn filter_directives(module_name: &str) -> String {
    std::iter::once(module_name)
        .chain(LIBRARY_TARGETS)
        .map(|target| format!("{target}=debug"))
        .collect::<Vec<_>>()
        .join(",")
}

fn open_log_file(module_name: &str) -> File {
    std::fs::create_dir_all(module_name).expect("failed to create log directory");
    File::create(format!("{module_name}/log.txt")).expect("failed to create log file")
}

fn loki_layer(loki: &Loki, module_name: &str) -> tracing_loki::Layer {
    let url = Url::parse(&loki.url).expect("invalid loki url");
    let (layer, task) = tracing_loki::builder()
        .label("application", module_name)
        .expect("invalid loki label")
        .extra_field("pid", std::process::id().to_string())
        .expect("invalid loki field")
        .build_url(url)
        .expect("could not build loki");
    tokio::spawn(task);
    layer
}
