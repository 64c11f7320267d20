//! Source-address trust.
//!
//! - `range`: CIDR parsing and membership
//! - `meta`: the remote metadata document listing hook source ranges
//! - `store`: the shared, periodically refreshed range set

pub mod meta;
pub mod range;
pub mod store;

pub use meta::{GithubMeta, MetaDocument, MetadataSource};
pub use range::{parse_ranges, TrustedRange, TrustedSet};
pub use store::{TrustStore, REFRESH_INTERVAL};
