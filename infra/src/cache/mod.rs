//! Cache module for Redis-based caching
//!
//! Provides the Redis client the revocation list writes its markers through,
//! with connection retry and per-operation retry of transient failures.

pub mod redis_client;

#[cfg(test)]
mod tests;

pub use redis_client::RedisClient;
