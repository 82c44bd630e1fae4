//! SSH access to the remote host.
//!
//! Every remote operation opens its own session; sessions are not pooled
//! across the phases of a backup cycle.

pub mod archive;
pub mod transfer;

use crate::config::Settings;
use crate::error::BackupError;
use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

const SSH_PORT: u16 = 22;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// Timeout applied to every blocking libssh2 call. Generous because a
/// full-filesystem `zip` run can go minutes between output chunks.
const SESSION_TIMEOUT_MS: u32 = 60 * 60 * 1000;

/// Connection parameters for the target host, read-only for the lifetime
/// of a backup cycle.
#[derive(Debug, Clone)]
pub struct ConnectParams {
    pub host: String,
    pub username: String,
    pub password: String,
}

impl From<&Settings> for ConnectParams {
    fn from(settings: &Settings) -> Self {
        Self {
            host: settings.ip_address.clone(),
            username: settings.username.clone(),
            password: settings.password.clone(),
        }
    }
}

/// Open an authenticated session to the target host.
///
/// Host keys are accepted without verification; the tool runs unattended
/// against a host the operator already controls.
pub fn connect(params: &ConnectParams) -> Result<ssh2::Session, BackupError> {
    let addr = (params.host.as_str(), SSH_PORT)
        .to_socket_addrs()
        .map_err(|e| BackupError::Connection(format!("cannot resolve {}: {e}", params.host)))?
        .next()
        .ok_or_else(|| BackupError::Connection(format!("no address found for {}", params.host)))?;

    let tcp = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
        .map_err(|e| BackupError::Connection(format!("cannot reach {addr}: {e}")))?;

    let mut sess = ssh2::Session::new()
        .map_err(|e| BackupError::Connection(format!("session init failed: {e}")))?;
    sess.set_tcp_stream(tcp);
    sess.set_timeout(SESSION_TIMEOUT_MS);
    sess.handshake()
        .map_err(|e| BackupError::Connection(format!("handshake with {} failed: {e}", params.host)))?;

    sess.userauth_password(&params.username, &params.password)
        .map_err(|e| {
            BackupError::Connection(format!("authentication failed for {}: {e}", params.username))
        })?;
    if !sess.authenticated() {
        return Err(BackupError::Connection(format!(
            "authentication rejected for {}",
            params.username
        )));
    }

    Ok(sess)
}

pub(crate) struct ExecOutput {
    pub exit_status: i32,
    pub stderr: String,
}

/// Run `cmd` on an open session, draining stdout and capturing stderr.
pub(crate) fn exec(sess: &ssh2::Session, cmd: &str) -> Result<ExecOutput, BackupError> {
    let mut channel = sess
        .channel_session()
        .map_err(|e| BackupError::Connection(format!("cannot open channel: {e}")))?;
    channel
        .exec(cmd)
        .map_err(|e| BackupError::Connection(format!("cannot execute remote command: {e}")))?;

    // zip lists every stored file on stdout; drain it without buffering.
    std::io::copy(&mut channel, &mut std::io::sink())
        .map_err(|e| BackupError::Connection(format!("reading remote output failed: {e}")))?;

    let mut stderr = String::new();
    channel
        .stderr()
        .read_to_string(&mut stderr)
        .map_err(|e| BackupError::Connection(format!("reading remote stderr failed: {e}")))?;

    channel
        .wait_close()
        .map_err(|e| BackupError::Connection(format!("closing channel failed: {e}")))?;
    let exit_status = channel
        .exit_status()
        .map_err(|e| BackupError::Connection(format!("cannot read remote exit status: {e}")))?;

    Ok(ExecOutput { exit_status, stderr })
}
