pub mod url;

pub use url::{AuthKey, LiveUrls, UrlKind, DELAY_SUFFIX};
