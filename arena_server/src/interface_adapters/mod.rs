// Interface adapters: wire protocol and TCP connection handling.

pub mod framing;
pub mod net;
pub mod protocol;
pub mod state;
pub mod utils;
