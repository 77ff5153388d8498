use common::config::CONFIG;
use common::logging::setup_logging;
use panel::command::{Command, HELP};
use panel::render;
use panel::session::{Outcome, Session};
use requester::catalog::CatalogRequester;
use requester::inventory::InventoryRequester;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    setup_logging("panel");
    let cancellation_token = CancellationToken::new();

    info!(api = %CONFIG.api.base_url, catalog = %CONFIG.catalog.url, "starting panel");
    let session = Arc::new(Session::new(
        Arc::new(CatalogRequester::new(&CONFIG.catalog.url)),
        Arc::new(InventoryRequester::new(&CONFIG.api.base_url)),
        &CONFIG.search,
    ));

    let printer_done = render::run(
        session.listing(),
        session.suggestions(),
        session.form_suggestions(),
        session.max_suggestions(),
        cancellation_token.clone(),
    );
    let input_done = read_commands(Arc::clone(&session), cancellation_token.clone());

    println!("{HELP}");
    session.start();

    tokio::select! {
        ctrl_c = tokio::signal::ctrl_c() => {
            if let Err(e) = ctrl_c {
                error!("failed to listen for ctrl c event: {e}");
            }
        }
        _ = cancellation_token.cancelled() => {}
    }
    info!("exiting");
    cancellation_token.cancel();
    tokio::join!(printer_done.notified(), input_done.notified());
    info!("exited");
}

fn read_commands(
    session: Arc<Session<CatalogRequester, InventoryRequester>>,
    cancellation_token: CancellationToken,
) -> Arc<Notify> {
    let done = Arc::new(Notify::new());
    tokio::spawn({
        let done = Arc::clone(&done);
        async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                let line = tokio::select! {
                    line = lines.next_line() => line,
                    _ = cancellation_token.cancelled() => break,
                };
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        error!("failed to read from stdin: {e}");
                        break;
                    }
                };
                match line.parse::<Command>() {
                    Ok(command) => {
                        if session.execute(command).await == Outcome::Quit {
                            break;
                        }
                    }
                    Err(e) => println!("{e}"),
                }
            }
            info!("input closed");
            cancellation_token.cancel();
            done.notify_one();
        }
    });
    done
}
