pub mod claude_api;
pub mod completion;
pub mod database_health;
pub mod query_dispatcher;
pub mod room_search;
