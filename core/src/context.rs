// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Context bundles the runtime pieces that credential providers and the
/// blob clients reach out to: files, HTTP, environment and processes.
///
/// Every slot starts as a no-op that fails (or reports nothing) when used, so
/// callers only wire in what their deployment needs.
///
/// ```
/// use blobsas_core::{Context, OsEnv};
///
/// let ctx = Context::new().with_env(OsEnv);
/// assert!(ctx.env_var("SURELY_NOT_SET_BY_ANYONE").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Context {
    fs: Arc<dyn FileRead>,
    http: Arc<dyn HttpSend>,
    env: Arc<dyn Env>,
    cmd: Arc<dyn CommandExecute>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a context where every component is a no-op.
    pub fn new() -> Self {
        Self {
            fs: Arc::new(NoopFileRead),
            http: Arc::new(NoopHttpSend),
            env: Arc::new(NoopEnv),
            cmd: Arc::new(NoopCommandExecute),
        }
    }

    /// Use `fs` to read local files.
    pub fn with_file_read(mut self, fs: impl FileRead) -> Self {
        self.fs = Arc::new(fs);
        self
    }

    /// Use `http` to send requests.
    pub fn with_http_send(mut self, http: impl HttpSend) -> Self {
        self.http = Arc::new(http);
        self
    }

    /// Use `env` to look up environment variables.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Use `cmd` to run external programs.
    pub fn with_command_execute(mut self, cmd: impl CommandExecute) -> Self {
        self.cmd = Arc::new(cmd);
        self
    }

    /// Read a whole file.
    #[inline]
    pub async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        self.fs.file_read(path).await
    }

    /// Read a whole file as text, replacing invalid utf-8.
    pub async fn file_read_as_string(&self, path: &str) -> Result<String> {
        let bytes = self.file_read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request with a fully buffered body.
    pub async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        debug!(
            "sending request: {} {} ({} bytes)",
            req.method(),
            req.uri(),
            req.body().len()
        );
        let resp = self.http.http_send(req).await?;
        debug!("got response: {}", resp.status());
        Ok(resp)
    }

    /// Look up an environment variable.
    ///
    /// Missing variables and values that are not valid utf-8 both yield `None`.
    #[inline]
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }

    /// Look up an environment variable, treating an empty value as unset.
    pub fn env_var_non_empty(&self, key: &str) -> Option<String> {
        self.env.var(key).filter(|v| !v.is_empty())
    }

    /// Run `program` with `args` and collect its output.
    pub async fn command_execute(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        self.cmd.command_execute(program, args).await
    }
}

/// Reads local files, such as a federated token mounted into a pod.
#[async_trait]
pub trait FileRead: Debug + Send + Sync + 'static {
    /// Read the whole file at `path`.
    async fn file_read(&self, path: &str) -> Result<Vec<u8>>;
}

/// Sends HTTP requests to identity endpoints and the storage service.
#[async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send `req` and return the buffered response.
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>>;
}

/// Environment variable lookup.
pub trait Env: Debug + Send + Sync + 'static {
    /// Get the value of `key`, if set.
    fn var(&self, key: &str) -> Option<String>;
}

/// The environment of the current process.
#[derive(Debug, Copy, Clone)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }
}

/// A fixed set of variables, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    vars: HashMap<String, String>,
}

impl StaticEnv {
    /// Build from `(key, value)` pairs.
    pub fn from_pairs<K: Into<String>, V: Into<String>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        let vars = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { vars }
    }
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Exit status and captured output of an external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, `0` on success.
    pub status: i32,
    /// Captured stdout.
    pub stdout: Vec<u8>,
    /// Captured stderr.
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Whether the command exited with `0`.
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Runs external programs, for example `az account get-access-token`.
#[async_trait]
pub trait CommandExecute: Debug + Send + Sync + 'static {
    /// Run `program` with `args`.
    async fn command_execute(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;
}

/// File reader used when none is configured. Always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFileRead;

#[async_trait]
impl FileRead for NoopFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        Err(Error::unexpected("no file reader configured").with_context(format!("path: {path}")))
    }
}

/// HTTP sender used when none is configured. Always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpSend;

#[async_trait]
impl HttpSend for NoopHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        Err(Error::unexpected("no http client configured")
            .with_context(format!("request: {} {}", req.method(), req.uri())))
    }
}

/// Environment used when none is configured. Every variable is unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnv;

impl Env for NoopEnv {
    fn var(&self, _: &str) -> Option<String> {
        None
    }
}

/// Command executor used when none is configured. Always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCommandExecute;

#[async_trait]
impl CommandExecute for NoopCommandExecute {
    async fn command_execute(&self, program: &str, _: &[&str]) -> Result<CommandOutput> {
        Err(Error::unexpected("no command executor configured")
            .with_context(format!("program: {program}")))
    }
}
