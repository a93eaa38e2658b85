//! Endpoints and request deadlines for the Graph drive API.

use std::time::Duration;

pub const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
pub const LOGIN_BASE_URL: &str = "https://login.microsoftonline.com";
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Issued tokens last 60 minutes; treat cached ones as stale after 50.
pub const TOKEN_LIFETIME_MINUTES: i64 = 50;

/// Existence checks should answer fast or not at all.
pub const EXISTENCE_CHECK_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Content uploads get the longest deadline of any call.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);
