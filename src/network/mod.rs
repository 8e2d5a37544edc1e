//! Network Module
//!
//! Transports that feed client connections into sessions.
//!
//! ## Architecture
//! - Single acceptor thread (`Server`)
//! - One session thread per connection
//! - Commands routed through `Engine`

mod server;
mod connection;
mod channel;

pub use server::Server;
pub use connection::{Connection, TcpConnection};
pub use channel::{ChannelClient, ChannelConnection};
