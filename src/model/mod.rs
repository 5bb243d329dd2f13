pub mod backends;
pub mod model_manager;
pub mod model_utils;
