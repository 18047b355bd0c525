mod client_message;
mod server_frame;
