pub mod catalog;
pub mod config;
pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod resource;
pub mod schema;
pub mod transport;

pub use catalog::{Catalog, HttpMethod, ResponseShape, Route, ToolDescriptor, TOOLS};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use errors::{ToolError, TransportError};
pub use pipeline::{ApiCallResult, Dispatcher, ToolOutput};
pub use resource::ResourceOutput;
pub use transport::{ApiRequest, CrmTransport, HttpTransport};
