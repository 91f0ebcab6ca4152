//! Robots.txt parser and evaluator
//!
//! Rules are evaluated as plain path prefixes. Within the groups that apply
//! to this crawler, any matching `Allow` wins over every `Disallow`.

/// Upper bound on a server-supplied `Crawl-delay`
pub const MAX_CRAWL_DELAY_MS: u64 = 60_000;

/// Policy for one origin, reduced to what applies to this crawler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsPolicy {
    /// `Allow` path prefixes, in declaration order
    pub allow: Vec<String>,

    /// `Disallow` path prefixes, in declaration order
    pub disallow: Vec<String>,

    /// Last applicable `Crawl-delay`, converted to milliseconds
    pub crawl_delay_ms: u64,
}

impl RobotsPolicy {
    /// Creates a permissive policy that allows everything
    ///
    /// This is used when robots.txt is missing or cannot be fetched.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parses robots.txt content for the given user agent
    ///
    /// A group applies if one of its `User-agent` lines is `*` or equals
    /// (ignoring ASCII case) either the full user agent or its product
    /// token, e.g. `RippleCrawl` for `RippleCrawl/1.0 (+https://...)`.
    /// Consecutive `User-agent` lines share one group. Empty `Allow` and
    /// `Disallow` values are ignored. `Crawl-delay` is read as (possibly
    /// fractional) seconds, capped at [`MAX_CRAWL_DELAY_MS`]; a
    /// non-numeric value resets it to 0.
    ///
    /// # Example
    ///
    /// ```
    /// use ripple_crawl::robots::RobotsPolicy;
    ///
    /// let policy = RobotsPolicy::parse("User-agent: *\nDisallow: /private", "TestBot/1.0");
    /// assert!(!policy.is_allowed_path("/private/page"));
    /// assert!(policy.is_allowed_path("/public"));
    /// ```
    pub fn parse(content: &str, user_agent: &str) -> Self {
        let token = product_token(user_agent);
        let mut policy = Self::default();

        let mut group_applies = false;
        let mut reading_agents = false;

        for line in content.lines() {
            // Strip comments
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            if key == "user-agent" {
                if !reading_agents {
                    // First agent line of a new group
                    group_applies = false;
                    reading_agents = true;
                }
                if value == "*"
                    || value.eq_ignore_ascii_case(user_agent)
                    || value.eq_ignore_ascii_case(token)
                {
                    group_applies = true;
                }
                continue;
            }

            reading_agents = false;
            if !group_applies {
                continue;
            }

            match key.as_str() {
                "allow" if !value.is_empty() => policy.allow.push(value.to_string()),
                "disallow" if !value.is_empty() => policy.disallow.push(value.to_string()),
                "crawl-delay" => policy.crawl_delay_ms = parse_crawl_delay(value),
                _ => {}
            }
        }

        policy
    }

    /// Evaluates a URL path (with optional `?query`) against the policy
    ///
    /// # Returns
    ///
    /// * `true` - If some `Allow` prefix matches, or no `Disallow` prefix matches
    /// * `false` - If a `Disallow` prefix matches and no `Allow` prefix does
    pub fn is_allowed_path(&self, path: &str) -> bool {
        if self.allow.iter().any(|prefix| path.starts_with(prefix.as_str())) {
            return true;
        }

        !self
            .disallow
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

}

/// `Name/1.0 (+contact)` -> `Name`
fn product_token(user_agent: &str) -> &str {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .unwrap_or(user_agent)
}

/// Seconds (fractions allowed) to milliseconds, capped at
/// [`MAX_CRAWL_DELAY_MS`]; garbage and negative values read as 0
fn parse_crawl_delay(value: &str) -> u64 {
    match value.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs > 0.0 => {
            ((secs * 1000.0).round() as u64).min(MAX_CRAWL_DELAY_MS)
        }
        _ => 0,
    }
}
