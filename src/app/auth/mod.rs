//! 会话：身份由外部登录提供方签发，这里只负责校验与续签

pub mod handler;
pub mod model;
pub mod service;
