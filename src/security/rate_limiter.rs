use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Idle client entries are pruned once the table grows past this size
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateLimitAlgorithm {
    FixedWindow,
    SlidingWindow,
}

impl FromStr for RateLimitAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "fixed-window" | "fixed" => Ok(Self::FixedWindow),
            "sliding-window" | "sliding" | "moving-window" => Ok(Self::SlidingWindow),
            other => Err(format!("unknown rate limit strategy '{}'", other)),
        }
    }
}

/// `requests` allowed per `window`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub requests: u32,
    pub window: Duration,
}

impl RateLimit {
    pub fn per_minute(requests: u32) -> Self {
        Self {
            requests,
            window: Duration::from_secs(60),
        }
    }
}

impl std::fmt::Display for RateLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} per {} seconds", self.requests, self.window.as_secs())
    }
}

/// Parses `"10"`, `"10 per minute"`, `"10/minute"` or `"100 per hour"`.
/// A bare number means per minute.
impl FromStr for RateLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('/', " per ");
        let mut parts = normalized.split_whitespace();
        let requests: u32 = parts
            .next()
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| format!("invalid rate limit '{}'", s))?;
        let window_secs = match (parts.next(), parts.next()) {
            (None, None) => 60,
            (Some("per"), Some(unit)) => match unit.trim_end_matches('s') {
                "second" => 1,
                "minute" => 60,
                "hour" => 3600,
                "day" => 86_400,
                _ => return Err(format!("invalid rate limit unit in '{}'", s)),
            },
            _ => return Err(format!("invalid rate limit '{}'", s)),
        };
        if requests == 0 {
            return Err("rate limit must allow at least one request".to_string());
        }
        Ok(Self {
            requests,
            window: Duration::from_secs(window_secs),
        })
    }
}

/// Result of one rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the client may retry; zero when allowed
    pub retry_after: Duration,
}

#[derive(Debug)]
struct ClientState {
    window_start: Instant,
    window_count: u32,
    request_times: Vec<Instant>,
    last_seen: Instant,
}

impl ClientState {
    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            window_count: 0,
            request_times: Vec::new(),
            last_seen: now,
        }
    }
}

/// Per-client request limiter for one route
#[derive(Debug)]
pub struct RateLimiter {
    limit: RateLimit,
    algorithm: RateLimitAlgorithm,
    clients: Mutex<HashMap<String, ClientState>>,
}

impl RateLimiter {
    pub fn new(limit: RateLimit, algorithm: RateLimitAlgorithm) -> Self {
        Self {
            limit,
            algorithm,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn limit(&self) -> RateLimit {
        self.limit
    }

    /// Record a request from `client_id` and decide whether it may proceed
    pub fn check(&self, client_id: &str) -> RateDecision {
        self.check_at(client_id, Instant::now())
    }

    pub fn is_allowed(&self, client_id: &str) -> bool {
        self.check(client_id).allowed
    }

    fn check_at(&self, client_id: &str, now: Instant) -> RateDecision {
        let mut clients = self.clients.lock();
        if clients.len() >= PRUNE_THRESHOLD {
            let window = self.limit.window;
            clients.retain(|_, s| now.duration_since(s.last_seen) < window);
        }

        let state = clients
            .entry(client_id.to_string())
            .or_insert_with(|| ClientState::new(now));
        state.last_seen = now;

        match self.algorithm {
            RateLimitAlgorithm::FixedWindow => self.check_fixed_window(state, now),
            RateLimitAlgorithm::SlidingWindow => self.check_sliding_window(state, now),
        }
    }

    fn check_fixed_window(&self, state: &mut ClientState, now: Instant) -> RateDecision {
        let window = self.limit.window;
        if now.duration_since(state.window_start) >= window {
            state.window_start = now;
            state.window_count = 0;
        }

        if state.window_count < self.limit.requests {
            state.window_count += 1;
            self.allow(self.limit.requests - state.window_count)
        } else {
            let elapsed = now.duration_since(state.window_start);
            self.deny(window.saturating_sub(elapsed))
        }
    }

    fn check_sliding_window(&self, state: &mut ClientState, now: Instant) -> RateDecision {
        let window = self.limit.window;
        state.request_times.retain(|t| now.duration_since(*t) < window);

        let used = state.request_times.len() as u32;
        if used < self.limit.requests {
            state.request_times.push(now);
            self.allow(self.limit.requests - used - 1)
        } else {
            let oldest = state.request_times.first().copied().unwrap_or(now);
            self.deny(window.saturating_sub(now.duration_since(oldest)))
        }
    }

    fn allow(&self, remaining: u32) -> RateDecision {
        RateDecision {
            allowed: true,
            limit: self.limit.requests,
            remaining,
            retry_after: Duration::ZERO,
        }
    }

    fn deny(&self, retry_after: Duration) -> RateDecision {
        RateDecision {
            allowed: false,
            limit: self.limit.requests,
            remaining: 0,
            retry_after,
        }
    }

    pub fn reset_client(&self, client_id: &str) {
        self.clients.lock().remove(client_id);
    }

    pub fn active_clients(&self) -> usize {
        self.clients.lock().len()
    }
}
