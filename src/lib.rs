pub mod api_doc;
pub mod cli_args;
pub mod error;
mod extractor;
mod middleware;
pub mod repository;
mod route;
pub mod schema;
pub mod server;
pub mod state;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test;
