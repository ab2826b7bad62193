// TabTrail services
// Services provide the plumbing around the recency lists: persistence, the server client, URL policy, automation, focus handling, settings.

pub mod automation;
pub mod focus_poller;
pub mod focus_queue;
pub mod history_store;
pub mod server_client;
pub mod settings_engine;
pub mod tab_resolver;
pub mod url_policy;
