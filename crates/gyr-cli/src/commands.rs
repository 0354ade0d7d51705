use std::io;
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use gyr_docker::DockerBackend;
use gyr_engine::{Backend, ResolutionEngine};
use gyr_github::GithubBackend;
use gyr_tree::Document;
use gyr_yaml::{documents_from_file, YamlCodec};

use crate::cli::{Cli, Input};

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let cancel = shutdown_token();

    let engine = ResolutionEngine::with_backends(vec![
        Arc::new(GithubBackend::new()) as Arc<dyn Backend>,
        Arc::new(DockerBackend::new()),
    ]);

    let mut forest = load_forest(&cli.inputs()).context("load input documents")?;
    debug!(documents = forest.len(), "loaded input");

    engine
        .resolve(cancel, &mut forest)
        .await
        .context("resolve references")?;

    // Nothing is printed until every reference resolved, so a failure
    // never leaves a partial stream on stdout.
    let stdout = io::stdout();
    YamlCodec::encode_writer(stdout.lock(), &forest).context("write resolved documents")?;
    Ok(())
}

fn load_forest(inputs: &[Input]) -> anyhow::Result<Vec<Document>> {
    let mut forest = Vec::new();
    for input in inputs {
        match input {
            Input::Stdin => {
                let docs = YamlCodec::decode_reader(io::stdin().lock()).context("decode stdin")?;
                forest.extend(docs);
            }
            Input::File(path) => forest.extend(documents_from_file(path)?),
        }
    }
    Ok(forest)
}

/// Token cancelled by the first SIGINT/SIGTERM. In-flight resolutions then
/// fail and the run exits through the normal error path with the input
/// untouched. A second signal exits immediately with status 1.
fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        debug!("shutdown signal received, cancelling resolution");
        cancel.cancel();

        shutdown_signal().await;
        std::process::exit(1);
    });
    token
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(_) => {
            tokio::signal::ctrl_c().await.ok();
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
}
