//! 核心模块：错误、提取器、响应、中间件、时钟与请求身份

pub mod clock;
pub mod error;
pub mod extract;
pub mod identity;
pub mod middleware;
pub mod response;
