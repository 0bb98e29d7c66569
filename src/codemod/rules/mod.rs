//! Built-in migrations, one module per rule.

pub mod agent_session;
pub mod comment_discussion;
pub mod grep_tool;
pub mod mcp_mode_type;
pub mod mcp_network;
pub mod network_firewall;
pub mod permissions_shorthand;
pub mod safe_inputs_mode;
pub mod sandbox_agent_false;
pub mod schedule_around;
pub mod slash_command;
pub mod timeout_minutes;
pub mod upload_asset;
pub mod write_permissions;
