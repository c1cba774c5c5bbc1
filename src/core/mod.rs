// Room plumbing shared by every game: the trait, the per-room actor and the socket front end
pub mod connection;
pub mod context;
pub mod coordinator;
pub mod game;
pub mod registry;
pub mod websocket;
