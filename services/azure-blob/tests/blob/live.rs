use blobsas_azure_blob::*;
use blobsas_command_execute_tokio::TokioCommandExecute;
use blobsas_core::time::now;
use blobsas_core::{Context, OsEnv, ProvideCredential};
use blobsas_file_read_tokio::TokioFileRead;
use blobsas_http_send_reqwest::ReqwestHttpSend;
use bytes::Bytes;
use http::StatusCode;
use log::warn;
use std::env;

/// Build a service client against a real account.
///
/// Only runs with `BLOBSAS_AZURE_BLOB_TEST=on`, the account url and the
/// container come from `BLOBSAS_AZURE_BLOB_ACCOUNT_URL` and
/// `BLOBSAS_AZURE_BLOB_CONTAINER`.
async fn init_service() -> Option<(Context, BlobServiceClient, String)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("BLOBSAS_AZURE_BLOB_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_command_execute(TokioCommandExecute::new())
        .with_env(OsEnv);

    let credential = DefaultCredentialProvider::new()
        .provide_credential(&ctx)
        .await
        .expect("credential provider must not fail")
        .expect("a credential must be available");

    let account_url = env::var("BLOBSAS_AZURE_BLOB_ACCOUNT_URL")
        .expect("env BLOBSAS_AZURE_BLOB_ACCOUNT_URL must set");
    let container = env::var("BLOBSAS_AZURE_BLOB_CONTAINER")
        .expect("env BLOBSAS_AZURE_BLOB_CONTAINER must set");

    let service = BlobServiceClient::new(ctx.clone(), &account_url, credential)
        .expect("account url must be valid");
    Some((ctx, service, container))
}

#[tokio::test]
async fn test_live_upload_and_read_with_sas() {
    let Some((ctx, service, container)) = init_service().await else {
        warn!("BLOBSAS_AZURE_BLOB_TEST is not set, skipped");
        return;
    };

    let blob = service.blob_client(&container, &uuid::Uuid::new_v4().to_string());
    blob.upload(&b"hello from blobsas"[..], &UploadOptions::default())
        .await
        .expect("upload must succeed");

    let start = now();
    let expiry = start + chrono::TimeDelta::hours(1);
    let key = service
        .get_user_delegation_key(start, expiry)
        .await
        .expect("delegation key must be issued");
    let url = blob
        .generate_sas_url(
            &blob.sas_parameters(BlobSasPermissions::read_only(), start, expiry),
            SasKey::UserDelegation(&key),
        )
        .expect("sas must be generated");

    let resp = ctx
        .http_send(http::Request::get(url).body(Bytes::new()).unwrap())
        .await
        .expect("sas request must be sent");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.body().as_ref(), b"hello from blobsas");

    // A read only SAS must not allow writing.
    let url = blob
        .generate_sas_url(
            &blob.sas_parameters(BlobSasPermissions::read_only(), start, expiry),
            SasKey::UserDelegation(&key),
        )
        .unwrap();
    let resp = ctx
        .http_send(
            http::Request::put(url)
                .header("x-ms-blob-type", "BlockBlob")
                .body(Bytes::from_static(b"overwritten"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
