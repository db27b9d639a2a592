use blob_quickstart::{Config, Quickstart, QuickstartError};
use blobsas_azure_blob::DefaultCredentialProvider;
use blobsas_command_execute_tokio::TokioCommandExecute;
use blobsas_core::{Context, Error, OsEnv};
use blobsas_file_read_tokio::TokioFileRead;
use blobsas_http_send_reqwest::ReqwestHttpSend;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let _ = dotenv::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run().await {
        println!("Exception:");
        println!("{}", err.report());
    }
}

async fn run() -> Result<String, QuickstartError> {
    // IMDS only exists inside Azure, don't hang on it elsewhere.
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| {
            QuickstartError::Config(Error::unexpected("failed to build http client").with_source(e))
        })?;

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::new(client))
        .with_command_execute(TokioCommandExecute::new().with_timeout(Duration::from_secs(30)))
        .with_env(OsEnv);

    let config = Config::default().from_env(&ctx)?;
    Quickstart::new(ctx, config, DefaultCredentialProvider::new())
        .run(&mut std::io::stdout())
        .await
}
