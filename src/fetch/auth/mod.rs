//! Auth decorators for workbook hosts that gate their CSV exports.

mod api_key;
mod url_param;

pub use api_key::ApiKey;
pub use url_param::UrlParam;
