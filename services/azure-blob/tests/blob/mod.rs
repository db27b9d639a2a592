mod blob_client;
mod live;
mod mock;
