mod connection;
mod handshake;
mod helpers;
mod password;
mod routing;
