use std::{
    io,
    time::{Duration, Instant},
};

use futures::TryStreamExt;
use reqwest::{Client, Response};
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use tracing::{debug, info};

use crate::{
    error::{Result, SpeedTestError},
    models::ConnectionInfo,
    utils::host_of,
};

/// Builds the HTTP client. Only connecting is bounded; a whole-request
/// timeout would also cut off the body being measured.
pub fn build_client(user_agent: &str, connect_timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .connect_timeout(connect_timeout)
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// An open response whose body has not been read yet.
pub struct Connection {
    info: ConnectionInfo,
    response: Response,
}

impl Connection {
    pub fn info(&self) -> &ConnectionInfo {
        &self.info
    }

    /// Hands the body over as a byte stream. Dropping the reader releases the connection.
    pub fn into_reader(self) -> impl AsyncRead + Unpin {
        let body = self.response.bytes_stream().map_err(io::Error::other);
        StreamReader::new(Box::pin(body))
    }
}

pub async fn connect(client: &Client, url: &str) -> Result<Connection> {
    let parsed =
        url::Url::parse(url).map_err(|e| SpeedTestError::InvalidUrl(format!("{url}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SpeedTestError::InvalidUrl(format!(
            "{url}: unsupported scheme {}",
            parsed.scheme()
        )));
    }

    debug!("sending GET {}", parsed);
    let start = Instant::now();
    let response = client.get(parsed).send().await?;
    let connect_time = start.elapsed();

    let status = response.status();
    if !status.is_success() {
        return Err(SpeedTestError::BadStatus(status));
    }

    let info = ConnectionInfo {
        url: response.url().to_string(),
        host: host_of(response.url()).unwrap_or_default(),
        status,
        connect_time,
    };
    info!(
        host = %info.host,
        status = %info.status,
        content_length = ?response.content_length(),
        "connected in {:?}",
        info.connect_time
    );

    Ok(Connection { info, response })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CONNECTION_TIMEOUT, DEFAULT_USER_AGENT};

    #[tokio::test]
    async fn rejects_unparseable_url() {
        let client = build_client(DEFAULT_USER_AGENT, CONNECTION_TIMEOUT).unwrap();
        let err = connect(&client, "not a url").await.err().unwrap();
        assert!(matches!(err, SpeedTestError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn rejects_non_http_scheme() {
        let client = build_client(DEFAULT_USER_AGENT, CONNECTION_TIMEOUT).unwrap();
        let err = connect(&client, "ftp://example.com/file").await.err().unwrap();
        assert!(matches!(err, SpeedTestError::InvalidUrl(msg) if msg.contains("ftp")));
    }
}
