mod auth;
mod backoff;
mod requests;
mod route;
