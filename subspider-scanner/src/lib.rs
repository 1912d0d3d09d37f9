pub mod dns;
pub mod error;
pub mod http;
pub mod pool;
pub mod result;
pub mod title;

pub use dns::{DnsFailure, DnsOutcome, DnsProbe, HostResolver};
pub use error::ScanError;
pub use http::{DEFAULT_USER_AGENT, HttpProbe, TargetProber, build_client};
pub use pool::WorkerPool;
pub use result::{LiveResult, ProbeFailure, ProbeOutcome};
pub use title::{NO_TITLE, decode_body, extract_title};
