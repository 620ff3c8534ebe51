//! HTTP probe execution.
//!
//! One bounded probe per configured unit per cycle: TCP connect,
//! http1 handshake, single request, compare the status code against
//! the expected one from the unit's labels.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use tracing::debug;

use stackwatch_core::{HealthSpec, ProbeOutcome, UnitKey, UnitRecord};

/// Probe one endpoint, honoring a hard timeout.
///
/// `timed_out = true` on timeout; `code = None` when no response was
/// received at all (connect or protocol failure).
pub async fn probe(addr: &str, spec: &HealthSpec, timeout: Duration) -> ProbeOutcome {
    let started = Instant::now();

    let result = tokio::time::timeout(timeout, request(addr, spec)).await;
    let elapsed = started.elapsed();

    match result {
        Ok(code) => ProbeOutcome {
            ok: code == Some(spec.expect),
            code,
            elapsed,
            timed_out: false,
        },
        Err(_) => {
            debug!(%addr, path = %spec.path, "health probe timed out");
            ProbeOutcome {
                ok: false,
                code: None,
                elapsed,
                timed_out: true,
            }
        }
    }
}

/// Issue the request and return the response status code, if any.
async fn request(addr: &str, spec: &HealthSpec) -> Option<u16> {
    let uri = format!("http://{addr}{}", spec.path);

    let stream = match tokio::net::TcpStream::connect(addr).await {
        Ok(stream) => stream,
        Err(e) => {
            debug!(error = %e, %uri, "health probe connection failed");
            return None;
        }
    };

    let io = hyper_util::rt::TokioIo::new(stream);
    let (mut sender, conn) = match hyper::client::conn::http1::handshake(io).await {
        Ok(pair) => pair,
        Err(e) => {
            debug!(error = %e, %uri, "health probe handshake failed");
            return None;
        }
    };

    // Drive the connection in the background.
    tokio::spawn(async move {
        let _ = conn.await;
    });

    let method =
        http::Method::from_bytes(spec.method.as_bytes()).unwrap_or(http::Method::GET);
    let req = match http::Request::builder()
        .method(method)
        .uri(&uri)
        .header("host", addr)
        .header("user-agent", "stackwatch-health/0.1")
        .body(http_body_util::Empty::<bytes::Bytes>::new())
    {
        Ok(req) => req,
        Err(e) => {
            debug!(error = %e, %uri, "health probe request invalid");
            return None;
        }
    };

    match sender.send_request(req).await {
        Ok(resp) => Some(resp.status().as_u16()),
        Err(e) => {
            debug!(error = %e, %uri, "health probe request failed");
            None
        }
    }
}

/// Probe every up unit that declares a health check.
///
/// Runs sequentially within the pass; down units keep no health
/// annotation (their endpoint is known-absent, probing it would only
/// burn the timeout).
pub async fn probe_all(
    units: &BTreeMap<UnitKey, UnitRecord>,
    probe_host: &str,
    timeout: Duration,
) -> HashMap<UnitKey, ProbeOutcome> {
    let mut outcomes = HashMap::new();
    for (key, record) in units {
        if record.down {
            continue;
        }
        let Some(spec) = &record.health else {
            continue;
        };
        let addr = format!("{probe_host}:{}", spec.port);
        let outcome = probe(&addr, spec, timeout).await;
        debug!(
            unit = %key,
            ok = outcome.ok,
            code = ?outcome.code,
            timed_out = outcome.timed_out,
            "health probe finished"
        );
        outcomes.insert(key.clone(), outcome);
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn spec(expect: u16) -> HealthSpec {
        HealthSpec {
            port: 0,
            method: "GET".to_string(),
            path: "/healthz".to_string(),
            expect,
        }
    }

    /// Serve one canned HTTP response on a fresh listener, returning
    /// its address.
    async fn one_shot_server(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let response = format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\n\r\n");
            let _ = stream.write_all(response.as_bytes()).await;
        });
        addr
    }

    #[tokio::test]
    async fn probe_matching_code_is_ok() {
        let addr = one_shot_server("200 OK").await;
        let outcome = probe(&addr, &spec(200), Duration::from_secs(2)).await;
        assert!(outcome.ok);
        assert_eq!(outcome.code, Some(200));
        assert!(!outcome.timed_out);
    }

    #[tokio::test]
    async fn probe_unexpected_code_is_not_ok() {
        let addr = one_shot_server("500 Internal Server Error").await;
        let outcome = probe(&addr, &spec(200), Duration::from_secs(2)).await;
        assert!(!outcome.ok);
        assert_eq!(outcome.code, Some(500));
        assert!(!outcome.timed_out);
    }

    #[tokio::test]
    async fn probe_honors_custom_expected_code() {
        let addr = one_shot_server("204 No Content").await;
        let outcome = probe(&addr, &spec(204), Duration::from_secs(2)).await;
        assert!(outcome.ok);
        assert_eq!(outcome.code, Some(204));
    }

    #[tokio::test]
    async fn probe_times_out_against_silent_server() {
        // Accepts the connection, never responds.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let outcome = probe(&addr, &spec(200), Duration::from_millis(50)).await;
        assert!(outcome.timed_out);
        assert!(!outcome.ok);
        assert_eq!(outcome.code, None);
    }

    #[tokio::test]
    async fn probe_connection_refused_is_failure_not_timeout() {
        // Bind then drop to get a port nothing is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let outcome = probe(&addr, &spec(200), Duration::from_secs(2)).await;
        assert!(!outcome.ok);
        assert_eq!(outcome.code, None);
        assert!(!outcome.timed_out);
    }

    #[tokio::test]
    async fn probe_all_skips_unconfigured_and_down_units() {
        let addr = one_shot_server("200 OK").await;
        let (host, port) = addr.rsplit_once(':').unwrap();

        let mut units = BTreeMap::new();
        units.insert(
            UnitKey::new("media", "plex"),
            UnitRecord {
                status: "up".to_string(),
                link: None,
                group: None,
                health: Some(HealthSpec {
                    port: port.parse().unwrap(),
                    method: "GET".to_string(),
                    path: "/".to_string(),
                    expect: 200,
                }),
                last_seen: 100,
                down: false,
            },
        );
        units.insert(
            UnitKey::new("media", "no-check"),
            UnitRecord {
                status: "up".to_string(),
                link: None,
                group: None,
                health: None,
                last_seen: 100,
                down: false,
            },
        );
        units.insert(
            UnitKey::new("media", "down-unit"),
            UnitRecord {
                status: "up".to_string(),
                link: None,
                group: None,
                health: Some(HealthSpec {
                    port: 1,
                    method: "GET".to_string(),
                    path: "/".to_string(),
                    expect: 200,
                }),
                last_seen: 100,
                down: true,
            },
        );

        let outcomes = probe_all(&units, host, Duration::from_secs(2)).await;
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[&UnitKey::new("media", "plex")].ok);
    }
}
