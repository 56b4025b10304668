// =============================================================================
// Dashboard API — REST endpoints + WebSocket push feed
// =============================================================================

pub mod rest;
pub mod ws;
