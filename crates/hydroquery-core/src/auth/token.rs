use chrono::{DateTime, Duration, Utc};

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Cached bearer token and the instant it stops being usable.
///
/// Starts empty. A token counts as valid while `now < expires_at`; once
/// expired it is simply overwritten by the next fetch.
#[derive(Debug, Clone)]
pub struct TokenRecord {
    token: Option<String>,
    expires_at: DateTime<Utc>,
}

impl Default for TokenRecord {
    fn default() -> Self {
        Self {
            token: None,
            expires_at: DateTime::<Utc>::default(),
        }
    }
}

impl TokenRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly issued token valid for `lifetime_secs` from now.
    pub fn update(&mut self, token: String, lifetime_secs: i64) {
        // Out-of-range lifetimes clamp: huge ones never expire, hugely negative ones already have
        let lifetime = Duration::try_seconds(lifetime_secs).unwrap_or(if lifetime_secs > 0 {
            Duration::MAX
        } else {
            Duration::zero()
        });
        self.token = Some(token);
        self.expires_at = Utc::now()
            .checked_add_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
    }

    /// The cached token, only if it has not expired
    pub fn token(&self) -> Option<&str> {
        if self.is_valid() {
            self.token.as_deref()
        } else {
            None
        }
    }

    pub fn is_valid(&self) -> bool {
        self.token.is_some() && Utc::now() < self.expires_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at - Utc::now()
    }

    /// Seconds remaining until expiry (for display)
    pub fn seconds_until_expiry(&self) -> i64 {
        self.time_until_expiry().num_seconds().max(0)
    }

    /// Shift the expiry into the past, as if `by` had elapsed.
    #[cfg(any(test, feature = "test-util"))]
    pub fn backdate(&mut self, by: Duration) {
        self.expires_at = self.expires_at - by;
    }
}
