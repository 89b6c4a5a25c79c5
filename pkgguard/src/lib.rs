//! Checks npm packages against the GitHub Security Advisory database and
//! classifies each hit as fatal or a warning for the installer.

pub mod advisory;
pub mod fetcher;
pub mod ghsa;
pub mod github;
pub mod output;
pub mod package;
pub mod paginate;
pub mod scanner;

pub use advisory::{Advisory, AdvisoryLevel};
pub use github::GitHubClient;
pub use package::Package;
pub use scanner::{GhsaScanner, ScanRequest, SecurityScanner, PROTOCOL_VERSION};
