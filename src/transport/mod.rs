// MIT License - Copyright (c) the tenmicronsync authors
// Rust translation of tenmicronsync.py

pub mod direct;

pub use direct::DirectTcpTransport;
