//! Redis client tests
//!
//! Tests marked `#[ignore]` need a server at `REDIS_ADDRESS` (default
//! `localhost:6379`): `cargo test -p authsvc_infra -- --ignored`

use authsvc_core::domain::entities::token::TokenKind;
use authsvc_core::errors::DomainError;
use authsvc_core::services::{CacheStore, RevocationList, TokenServiceConfig};
use authsvc_shared::config::CacheConfig;
use chrono::Duration;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::cache::redis_client::RedisClient;
use crate::InfrastructureError;

fn config() -> CacheConfig {
    let address = std::env::var("REDIS_ADDRESS").unwrap_or_else(|_| "localhost:6379".to_string());
    CacheConfig::new(address).with_database(15)
}

/// Minimal RESP server that accepts connection setup and answers every data
/// command with a LOADING error, counting the data commands it receives.
async fn loading_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let commands = Arc::new(AtomicUsize::new(0));
    let counter = commands.clone();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let counter = counter.clone();
            tokio::spawn(async move {
                let (read, mut write) = socket.into_split();
                let mut lines = BufReader::new(read).lines();

                while let Ok(Some(header)) = lines.next_line().await {
                    let Some(count) = header.strip_prefix('*').and_then(|n| n.parse::<usize>().ok()) else {
                        continue;
                    };
                    let mut args = Vec::with_capacity(count);
                    for _ in 0..count {
                        let _length = lines.next_line().await;
                        if let Ok(Some(arg)) = lines.next_line().await {
                            args.push(arg.to_uppercase());
                        }
                    }

                    let reply: &[u8] = match args.first().map(String::as_str) {
                        Some("GET") | Some("SETEX") | Some("SET") | Some("PING") => {
                            counter.fetch_add(1, Ordering::SeqCst);
                            b"-LOADING Redis is loading the dataset in memory\r\n"
                        }
                        _ => b"+OK\r\n",
                    };
                    if write.write_all(reply).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    (address, commands)
}

#[tokio::test]
async fn test_unreachable_server_fails_after_attempts() {
    let mut config = CacheConfig::new("127.0.0.1:1");
    config.connect_attempts = 2;
    config.connection_timeout = 1;

    let result = RedisClient::new_with_retry_delay(config, 1).await;
    assert!(matches!(
        result,
        Err(InfrastructureError::Cache(_)) | Err(InfrastructureError::Config(_))
    ));
}

#[tokio::test]
async fn test_operations_are_issued_once() {
    let (address, commands) = loading_server().await;
    let client = RedisClient::new_with_retry_delay(CacheConfig::new(address), 1)
        .await
        .unwrap();

    let err = client.get("revoked:jti-1").await.unwrap_err();
    assert!(matches!(err, DomainError::Backend { .. }));
    assert_eq!(commands.load(Ordering::SeqCst), 1);

    assert!(client.set_with_expiry("revoked:jti-1", "1", 30).await.is_err());
    assert_eq!(commands.load(Ordering::SeqCst), 2);

    assert!(client.health_check().await.is_err());
    assert_eq!(commands.load(Ordering::SeqCst), 3);
}

#[tokio::test]
#[ignore]
async fn test_set_get_and_expiry() {
    let client = RedisClient::new(config()).await.unwrap();

    client.set_with_expiry("authsvc:test:key", "1", 30).await.unwrap();
    assert_eq!(client.get("authsvc:test:key").await.unwrap().as_deref(), Some("1"));

    client.set_with_expiry("authsvc:test:short", "1", 1).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
    assert_eq!(client.get("authsvc:test:short").await.unwrap(), None);

    assert_eq!(client.get("authsvc:test:missing").await.unwrap(), None);
    assert!(client.health_check().await.is_ok());
}

#[tokio::test]
#[ignore]
async fn test_revocation_marker_round_trip() {
    let client = Arc::new(RedisClient::new(config()).await.unwrap());
    let tokens = TokenServiceConfig {
        issuer: "auth-service-1".to_string(),
        access_secret: "a".to_string(),
        refresh_secret: "r".to_string(),
        access_token_expiry: Duration::seconds(300),
        refresh_token_expiry: Duration::seconds(604_800),
    };
    let revocations = RevocationList::new(client.clone(), &tokens);

    revocations
        .create("redis-jti", TokenKind::Access, Duration::seconds(300))
        .await
        .unwrap();
    assert!(revocations.find("redis-jti").await.unwrap());
    assert_eq!(client.get("revoked:redis-jti").await.unwrap().as_deref(), Some("1"));
}
