pub mod doi;
pub mod url;

pub use doi::DoiDisplay;
pub use url::UrlDisplay;
