// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod auth;
pub mod client;
pub mod manager;
pub mod template;
#[cfg(test)]
pub(crate) mod testing;
pub mod util;
