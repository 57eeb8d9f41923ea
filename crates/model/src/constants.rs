pub const DEFAULT_GATEWAY_NAME: &str = "campusgate";
pub const DEFAULT_PORT: u16 = 8072;
pub const DEFAULT_SESSION_COOKIE: &str = "CGSESSION";
pub const DEFAULT_MAX_PENDING_LOGINS: usize = 10_000;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;
pub const DEFAULT_AUTH_HTTP_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_POLICY_API: &str = "https://cloudresourcemanager.googleapis.com";
pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_STUDENT: &str = "STUDENT";
