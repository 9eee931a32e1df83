pub mod directory;
pub mod export;
pub mod notify;
pub mod services;
pub mod traits;
pub mod views;
