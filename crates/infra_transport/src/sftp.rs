//! SFTP sender
//!
//! Uploads the rendered batch as `lote_{batch_number}.xml` into the configured
//! remote directory. The ssh2 session is synchronous, so the whole exchange
//! runs on the blocking pool under the endpoint's deadline.

use std::io::Write;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{EndpointConfig, TransportMethod};
use crate::sender::{BatchDispatch, DeliveryOutcome, TransportSender};

pub struct SftpSender;

#[async_trait]
impl TransportSender for SftpSender {
    fn method(&self) -> TransportMethod {
        TransportMethod::Sftp
    }

    async fn send(&self, dispatch: &BatchDispatch, config: &EndpointConfig) -> DeliveryOutcome {
        let deadline = Duration::from_secs(config.timeout_secs);
        let config = config.clone();
        let batch_number = dispatch.batch_number.clone();
        let xml = dispatch.xml.clone();

        let upload = tokio::task::spawn_blocking(move || upload(&config, &batch_number, &xml));
        match tokio::time::timeout(deadline, upload).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => DeliveryOutcome::failed(format!("SFTP upload task failed: {e}")),
            Err(_) => {
                tracing::warn!(batch = %dispatch.batch_number, "SFTP upload timed out");
                DeliveryOutcome::failed(format!(
                    "SFTP upload exceeded {}s deadline",
                    deadline.as_secs()
                ))
            }
        }
    }
}

fn upload(config: &EndpointConfig, batch_number: &str, xml: &str) -> DeliveryOutcome {
    match try_upload(config, batch_number, xml) {
        Ok(file_name) => {
            tracing::info!(batch = %batch_number, file = %file_name, "batch uploaded over SFTP");
            DeliveryOutcome::ok(Some(file_name))
        }
        Err(e) => {
            tracing::warn!(batch = %batch_number, error = %e, "SFTP upload failed");
            DeliveryOutcome::failed(e)
        }
    }
}

fn try_upload(config: &EndpointConfig, batch_number: &str, xml: &str) -> Result<String, String> {
    let username = config
        .sftp_username
        .as_deref()
        .ok_or("SFTP username not configured")?;

    let timeout = Duration::from_secs(config.timeout_secs);
    let address = format!("{}:{}", config.url, config.sftp_port);
    let addr = address
        .to_socket_addrs()
        .map_err(|e| format!("resolve {address}: {e}"))?
        .next()
        .ok_or_else(|| format!("resolve {address}: no address"))?;
    let stream = TcpStream::connect_timeout(&addr, timeout)
        .map_err(|e| format!("connect {address}: {e}"))?;
    stream
        .set_read_timeout(Some(timeout))
        .map_err(|e| format!("socket timeout: {e}"))?;
    stream
        .set_write_timeout(Some(timeout))
        .map_err(|e| format!("socket timeout: {e}"))?;

    let mut session = ssh2::Session::new().map_err(|e| format!("ssh session: {e}"))?;
    // Caps every ssh2 call, handshake included; the outer tokio deadline
    // abandons the task but cannot interrupt a blocked session.
    session.set_timeout(timeout.as_millis().min(u32::MAX as u128) as u32);
    session.set_tcp_stream(stream);
    session
        .handshake()
        .map_err(|e| format!("ssh handshake: {e}"))?;

    if let Some(key) = &config.sftp_private_key {
        session
            .userauth_pubkey_memory(username, None, key, None)
            .map_err(|e| format!("key auth: {e}"))?;
    } else if let Some(password) = &config.sftp_password {
        session
            .userauth_password(username, password)
            .map_err(|e| format!("password auth: {e}"))?;
    } else {
        return Err("SFTP credentials not configured".to_string());
    }

    let sftp = session.sftp().map_err(|e| format!("sftp channel: {e}"))?;
    let file_name = format!("lote_{batch_number}.xml");
    let mut remote_path = PathBuf::from(config.sftp_remote_dir.as_deref().unwrap_or("."));
    remote_path.push(&file_name);

    let mut file = sftp
        .create(&remote_path)
        .map_err(|e| format!("create {}: {e}", remote_path.display()))?;
    file.write_all(xml.as_bytes())
        .map_err(|e| format!("write {}: {e}", remote_path.display()))?;

    Ok(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_host_fails_within_deadline() {
        let mut config = EndpointConfig::for_method(TransportMethod::Sftp);
        config.url = "127.0.0.1".to_string();
        config.sftp_port = 1;
        config.sftp_username = Some("prestador".to_string());
        config.sftp_password = Some("secret".to_string());
        config.timeout_secs = 2;

        let started = std::time::Instant::now();
        let result = try_upload(&config, "LOTE1", "<ans:mensagemTISS/>");
        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
