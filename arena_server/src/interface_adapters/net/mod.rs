// Network adapter for client TCP sockets.

pub mod client;

pub use client::handle_connection;
