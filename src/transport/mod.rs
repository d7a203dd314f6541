pub mod traits;
pub mod websocket;

pub use traits::{TransportConnector, TransportLink};
pub use websocket::{WsConnector, WsLink};
