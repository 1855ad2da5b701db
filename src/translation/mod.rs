// Translation module - circuit request <-> Gemini translation
// Author: kelexine (https://github.com/kelexine)

pub mod request;
pub mod response;

pub use request::{build_request, PreparedRequest};
pub use response::translate_response;
