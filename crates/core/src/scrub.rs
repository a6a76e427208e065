// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential scrubbing for every outbound string.
//!
//! Anything that can carry a secret — git stderr, subprocess output
//! chunks, error messages and stacks — passes through [`scrub`] before
//! it is surfaced, logged, or published on a bus. The pattern set is
//! fixed; replacements are `[REDACTED]`. Scrubbing is idempotent and
//! order-independent across non-overlapping patterns.

use regex::Regex;
use std::sync::LazyLock;

const REDACTED: &str = "[REDACTED]";

/// `user:pass@` credentials embedded in URLs. Keeps the scheme and host,
/// drops the userinfo.
#[allow(clippy::expect_used)]
static URL_USERINFO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<scheme>[a-zA-Z][a-zA-Z0-9+.-]*://)[^/\s@:]+:[^/\s@]+@")
        .expect("constant regex pattern is valid")
});

/// Classic GitHub personal access tokens and the app/OAuth/refresh
/// variants (`ghp_`, `gho_`, `ghu_`, `ghs_`, `ghr_`).
#[allow(clippy::expect_used)]
static GITHUB_CLASSIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"gh[pousr]_[A-Za-z0-9]{36,255}").expect("constant regex pattern is valid")
});

/// Fine-grained GitHub personal access tokens.
#[allow(clippy::expect_used)]
static GITHUB_FINE_GRAINED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github_pat_[A-Za-z0-9_]{22,255}").expect("constant regex pattern is valid")
});

/// GitLab personal access tokens.
#[allow(clippy::expect_used)]
static GITLAB_PAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"glpat-[A-Za-z0-9_\-]{20,}").expect("constant regex pattern is valid")
});

/// `Bearer <token>` authorization values.
#[allow(clippy::expect_used)]
static BEARER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)bearer\s+[A-Za-z0-9._~+/=\-]{8,}").expect("constant regex pattern is valid")
});

/// AWS access key IDs.
#[allow(clippy::expect_used)]
static AWS_ACCESS_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:AKIA|ASIA)[0-9A-Z]{16}").expect("constant regex pattern is valid")
});

/// `aws_secret_access_key = ...` assignment lines.
#[allow(clippy::expect_used)]
static AWS_SECRET_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)aws_secret_access_key\s*[=:]\s*\S+").expect("constant regex pattern is valid")
});

/// Anthropic API keys. Must run before the OpenAI pattern so the longer
/// `sk-ant-` prefix wins the overlap.
#[allow(clippy::expect_used)]
static ANTHROPIC_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"sk-ant-[A-Za-z0-9_\-]{16,}").expect("constant regex pattern is valid")
});

/// OpenAI API keys.
#[allow(clippy::expect_used)]
static OPENAI_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"sk-[A-Za-z0-9]{20,}").expect("constant regex pattern is valid")
});

/// Slack bot and user tokens.
#[allow(clippy::expect_used)]
static SLACK_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"xox[bp]-[A-Za-z0-9\-]{10,}").expect("constant regex pattern is valid")
});

/// Replace every credential-shaped match in `s` with `[REDACTED]`.
pub fn scrub(s: &str) -> String {
    let mut out = URL_USERINFO.replace_all(s, format!("${{scheme}}{}@", REDACTED)).into_owned();
    for pattern in [
        &*GITHUB_FINE_GRAINED,
        &*GITHUB_CLASSIC,
        &*GITLAB_PAT,
        &*BEARER,
        &*AWS_ACCESS_KEY,
        &*AWS_SECRET_LINE,
        &*ANTHROPIC_KEY,
        &*OPENAI_KEY,
        &*SLACK_TOKEN,
    ] {
        out = pattern.replace_all(&out, REDACTED).into_owned();
    }
    out
}

/// True when `s` still contains something a scrub pattern would match.
/// Used by tests and debug assertions at surfacing boundaries.
pub fn contains_secret(s: &str) -> bool {
    URL_USERINFO.is_match(s)
        || GITHUB_FINE_GRAINED.is_match(s)
        || GITHUB_CLASSIC.is_match(s)
        || GITLAB_PAT.is_match(s)
        || BEARER.is_match(s)
        || AWS_ACCESS_KEY.is_match(s)
        || AWS_SECRET_LINE.is_match(s)
        || ANTHROPIC_KEY.is_match(s)
        || OPENAI_KEY.is_match(s)
        || SLACK_TOKEN.is_match(s)
}

#[cfg(test)]
#[path = "scrub_tests.rs"]
mod tests;
