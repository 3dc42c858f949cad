//! Domain services behind the websocket route.
//!
//! ARCHITECTURE
//! ============
//! Each service owns one slice of room state and knows nothing about
//! sockets. `gateway` composes them and decides who hears what; the route
//! layer only moves frames.

pub mod gateway;
pub mod history;
pub mod registry;
pub mod session;
pub mod stroke;
