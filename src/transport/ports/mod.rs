//! Transport contracts.

mod command;
mod http;

pub use command::{CommandError, CommandExecutor, CommandOutput};
pub use http::{
    HttpBody, HttpError, HttpMethod, HttpRequest, HttpResponse, HttpTransport, MultipartFile,
    MultipartForm,
};

#[cfg(test)]
pub use command::MockCommandExecutor;
#[cfg(test)]
pub use http::MockHttpTransport;
