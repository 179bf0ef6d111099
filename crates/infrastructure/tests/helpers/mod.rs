pub mod mock_http_server;

pub use mock_http_server::{MockHttpServer, MockReply};
